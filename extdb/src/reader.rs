use crate::{
    row::{Row, Value},
    settings::ExtDbSettings,
    Error, Result,
};
use sqlx::{
    any::{AnyConnectOptions, AnyRow},
    AnyPool, Column, ConnectOptions, Row as _,
};
use std::str::FromStr;

/// A live connection to the external records database.
///
/// The driver is selected at runtime from the configured `dbtype`, so the
/// same binary can pull from whichever engine the institution runs.
#[derive(Debug)]
pub struct ExtDb {
    pool: AnyPool,
}

impl ExtDb {
    /// Connects with the configured driver and runs the setup statement,
    /// if any, against the fresh session.
    pub async fn connect(settings: &ExtDbSettings) -> Result<Self> {
        sqlx::any::install_default_drivers();
        let mut options =
            AnyConnectOptions::from_str(&settings.url()).map_err(Error::Connect)?;
        if settings.debugdb {
            options = options.log_statements(log::LevelFilter::Info);
        }
        let pool = AnyPool::connect_with(options)
            .await
            .map_err(Error::Connect)?;
        if !settings.dbsetupsql.is_empty() {
            sqlx::query(&settings.dbsetupsql)
                .execute(&pool)
                .await
                .map_err(Error::Connect)?;
        }
        Ok(Self { pool })
    }

    /// Runs a read query and returns every row as a loose column/value
    /// mapping with lower-cased column names.
    pub async fn fetch_rows(&self, sql: &str) -> Result<Vec<Row>> {
        let rows = sqlx::query(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Query)?;
        Ok(rows.iter().map(decode_any_row).collect())
    }

    /// Releases the connection. Called exactly once per successful connect,
    /// on every exit path of the sync.
    pub async fn close(self) {
        self.pool.close().await;
    }
}

fn decode_any_row(row: &AnyRow) -> Row {
    let pairs = row.columns().iter().map(|column| {
        let index = column.ordinal();
        let value = if let Ok(value) = row.try_get::<Option<i64>, _>(index) {
            value.map(Value::Int).unwrap_or(Value::Null)
        } else if let Ok(value) = row.try_get::<Option<f64>, _>(index) {
            value.map(Value::Float).unwrap_or(Value::Null)
        } else if let Ok(value) = row.try_get::<Option<bool>, _>(index) {
            value.map(Value::Bool).unwrap_or(Value::Null)
        } else if let Ok(value) = row.try_get::<Option<Vec<u8>>, _>(index) {
            value.map(Value::Bytes).unwrap_or(Value::Null)
        } else if let Ok(value) = row.try_get::<Option<String>, _>(index) {
            // Text goes through as bytes so the configured charset applies
            value
                .map(|text| Value::Bytes(text.into_bytes()))
                .unwrap_or(Value::Null)
        } else {
            unsupported_column(column.name(), &column.type_info().to_string())
        };
        (column.name().to_string(), value)
    });
    Row::from_pairs(pairs)
}

/// Column types the loose model cannot represent surface as null; warn so a
/// schema mismatch (e.g. a native DATETIME start date) shows up in the cron
/// stream instead of silently skipping every diff.
fn unsupported_column(name: &str, type_info: &str) -> Value {
    tracing::warn!(column = name, column_type = type_info, "unsupported column type, treating as null");
    Value::Null
}
