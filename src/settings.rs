use crate::{Context, Result};
use config::{Config, Environment, File};
use extdb::ExtDbSettings;
use serde::Deserialize;
use sqlx::PgPool;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    #[serde(default = "default_log")]
    pub log: String,
    /// Cron expression for the scheduled sync
    #[serde(default = "default_schedule")]
    pub schedule: String,
    /// Seconds an in-flight sync gets to finish on shutdown
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace: u64,
    #[serde(default)]
    pub extdb: ExtDbSettings,
    #[serde(default)]
    pub lms: LmsSettings,
}

impl Settings {
    /// Settings are loaded from the file in the given path, then overridden
    /// by environment variables with prefix SYNC__.
    pub fn new(path: &Path) -> Result<Self> {
        Ok(Config::builder()
            .add_source(File::with_name(path.to_str().expect("file name")).required(false))
            .add_source(Environment::with_prefix("SYNC").separator("__"))
            .build()
            .and_then(|config| config.try_deserialize())?)
    }
}

fn default_log() -> String {
    "course_sync=info,sqlx=warn".to_string()
}

fn default_schedule() -> String {
    "@daily".to_string()
}

fn default_shutdown_grace() -> u64 {
    5
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct LmsSettings {
    #[serde(default)]
    pub url: String,
}

impl LmsSettings {
    pub async fn connect(&self) -> Result<PgPool> {
        let pool = PgPool::connect(&self.url)
            .await
            .context("opening lms database")?;
        Ok(pool)
    }
}
