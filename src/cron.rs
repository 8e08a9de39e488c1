use crate::{settings::Settings, sync, Result};
use tokio_cron_scheduler::{Job, JobScheduler};
use tokio_graceful_shutdown::SubsystemHandle;

pub async fn subsystem(settings: Settings, handle: SubsystemHandle) -> Result<()> {
    let mut scheduler = JobScheduler::new().await?;
    tracing::info!("started scheduler");
    schedule(settings, &mut scheduler).await?;
    scheduler.start().await?;
    handle.on_shutdown_requested().await;

    tracing::info!("stopped scheduler");
    scheduler.shutdown().await?;
    Ok(())
}

pub async fn schedule(settings: Settings, scheduler: &mut JobScheduler) -> Result {
    let job = Job::new_async(settings.schedule.as_str(), {
        let inner_settings = settings.clone();
        move |_uuid, _lock| {
            Box::pin({
                let settings = inner_settings.clone();
                async move {
                    match sync::run(&settings).await {
                        Ok((status, _stats)) => {
                            tracing::info!(status = status.code(), "sync finished")
                        }
                        Err(err) => tracing::error!(?err, "failed to sync courses"),
                    }
                }
            })
        }
    })?;
    scheduler.add(job).await?;
    Ok(())
}
