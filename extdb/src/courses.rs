use crate::{
    codec,
    reader::ExtDb,
    row::Row,
    settings::ExtDbSettings,
    sql::{MatchMode, StatementBuilder},
    Result,
};

/// One course row from the external records system. Start dates are epoch
/// seconds in the external schema; a row without one carries `None` and the
/// sync leaves the local start date alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCourse {
    pub idnumber: String,
    pub fullname: String,
    pub shortname: String,
    pub startdate: Option<i64>,
    pub category_idnumber: String,
}

impl ExternalCourse {
    pub fn from_row(row: &Row) -> Self {
        Self {
            idnumber: row.text("course_idnumber").unwrap_or_default().to_string(),
            fullname: row.text("course_fullname").unwrap_or_default().to_string(),
            shortname: row.text("course_shortname").unwrap_or_default().to_string(),
            startdate: row.int("course_startdate"),
            category_idnumber: row.text("category_idnumber").unwrap_or_default().to_string(),
        }
    }
}

/// Every row of the configured external course table, decoded to UTF-8.
pub async fn all(db: &ExtDb, settings: &ExtDbSettings) -> Result<Vec<ExternalCourse>> {
    let sql = StatementBuilder::from_settings(settings).select(
        &settings.remotetablecrs,
        &[],
        &[],
        true,
        "",
        MatchMode::Equals,
    );
    let rows = db.fetch_rows(&sql).await?;
    Ok(rows
        .into_iter()
        .map(|row| ExternalCourse::from_row(&codec::decode_row(row, &settings.dbencoding)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::Value;

    #[test]
    fn from_row_reads_course_fields() {
        let row = codec::decode_row(
            Row::from_pairs([
                ("COURSE_IDNUMBER", Value::Bytes(b"C9".to_vec())),
                ("COURSE_FULLNAME", Value::Bytes(b"Intro".to_vec())),
                ("COURSE_SHORTNAME", Value::Bytes(b"C9".to_vec())),
                ("COURSE_STARTDATE", Value::Int(1_704_067_200)),
                ("CATEGORY_IDNUMBER", Value::Bytes(b"101".to_vec())),
            ]),
            "utf-8",
        );
        let course = ExternalCourse::from_row(&row);
        assert_eq!(course.idnumber, "C9");
        assert_eq!(course.fullname, "Intro");
        assert_eq!(course.shortname, "C9");
        assert_eq!(course.startdate, Some(1_704_067_200));
        assert_eq!(course.category_idnumber, "101");
    }

    #[test]
    fn startdate_parses_numeric_text() {
        let row = codec::decode_row(
            Row::from_pairs([("course_startdate", Value::Bytes(b"1704067200".to_vec()))]),
            "utf-8",
        );
        assert_eq!(ExternalCourse::from_row(&row).startdate, Some(1_704_067_200));
    }

    #[test]
    fn missing_startdate_is_none() {
        assert_eq!(ExternalCourse::from_row(&Row::default()).startdate, None);
    }
}
