use clap::Parser;
use course_sync::{server, settings::Settings, sync, Result};
use std::{path::PathBuf, process};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(name = env!("CARGO_BIN_NAME"))]
pub struct Cli {
    #[clap(subcommand)]
    cmd: Option<Cmd>,

    /// Configuration file to use
    #[arg(short = 'c', default_value = "settings.toml")]
    config: PathBuf,
}

impl Cli {
    async fn run(&self) -> Result {
        let settings = Settings::new(&self.config)?;

        tracing_subscriber::registry()
            .with(tracing_subscriber::EnvFilter::new(&settings.log))
            .with(tracing_subscriber::fmt::layer())
            .init();

        if let Some(cmd) = self.cmd.as_ref() {
            cmd.run(settings).await?;
        } else {
            server::run(settings).await?;
        }

        Ok(())
    }
}

#[derive(Debug, clap::Subcommand)]
pub enum Cmd {
    Sync(Sync),
}

impl Cmd {
    async fn run(&self, settings: Settings) -> Result {
        match self {
            Self::Sync(cmd) => cmd.run(settings).await,
        }
    }
}

/// Run a single sync pass now instead of waiting for the schedule
#[derive(Debug, clap::Args)]
pub struct Sync {}

impl Sync {
    async fn run(&self, settings: Settings) -> Result {
        let (status, stats) = sync::run(&settings).await?;
        print_json(&serde_json::json!({
            "status": status,
            "code": status.code(),
            "stats": stats,
        }))
    }
}

pub fn print_json<T: ?Sized + serde::Serialize>(value: &T) -> Result {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    if let Err(e) = cli.run().await {
        eprintln!("error: {:?}", e);
        process::exit(1);
    }

    Ok(())
}
