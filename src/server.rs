use crate::{cron, settings::Settings, Error, Result};
use tokio_graceful_shutdown::{SubsystemBuilder, Toplevel};

/// Runs the sync scheduler until a shutdown signal arrives, allowing an
/// in-flight sync pass `settings.shutdown_grace` seconds to finish.
pub async fn run(settings: Settings) -> Result {
    let grace = tokio::time::Duration::from_secs(settings.shutdown_grace);
    tracing::info!(schedule = %settings.schedule, "scheduling course sync");
    Toplevel::new(move |top_level| async move {
        top_level.start(SubsystemBuilder::new("sync-scheduler", {
            move |handle| cron::subsystem(settings, handle)
        }));
    })
    .catch_signals()
    .handle_shutdown_requests(grace)
    .await
    .map_err(Error::from)
}
