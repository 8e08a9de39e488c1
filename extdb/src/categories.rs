use crate::{
    codec,
    reader::ExtDb,
    row::Row,
    settings::ExtDbSettings,
    sql::{MatchMode, StatementBuilder},
    Result,
};

/// One category row from the external records system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCategory {
    pub idnumber: String,
    pub name: String,
}

impl ExternalCategory {
    pub fn from_row(row: &Row) -> Self {
        Self {
            idnumber: row.text("category_idnumber").unwrap_or_default().to_string(),
            name: row.text("category_name").unwrap_or_default().to_string(),
        }
    }
}

/// Every row of the configured external category table, decoded to UTF-8.
pub async fn all(db: &ExtDb, settings: &ExtDbSettings) -> Result<Vec<ExternalCategory>> {
    let sql = StatementBuilder::from_settings(settings).select(
        &settings.remotetablecat,
        &[],
        &[],
        true,
        "",
        MatchMode::Equals,
    );
    let rows = db.fetch_rows(&sql).await?;
    Ok(rows
        .into_iter()
        .map(|row| ExternalCategory::from_row(&codec::decode_row(row, &settings.dbencoding)))
        .collect())
}
