use crate::{settings::Settings, Result};
use extdb::{
    categories::{self, ExternalCategory},
    courses::{self, ExternalCourse},
    ExtDb, ExtDbSettings,
};
use lms::{category, course, Category, Course};
use serde::Serialize;
use sqlx::PgPool;
use std::time::Instant;

/// Tag prefixed to a category idnumber to derive the idnumber of the course
/// shell that fronts that category.
pub const CATEGORY_COURSE_TAG: &str = "CRS-";

/// Coarse outcome reported to the invoking scheduler. The original conflated
/// success with not-configured; completed runs get their own code here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    NotConfigured,
    ConnectionFailed,
    Completed,
    ReadFailed,
}

impl SyncStatus {
    pub fn code(&self) -> i32 {
        match self {
            Self::NotConfigured => 0,
            Self::ConnectionFailed => 1,
            Self::Completed => 2,
            Self::ReadFailed => 4,
        }
    }
}

#[derive(Debug, Default, Serialize)]
pub struct SyncStats {
    /// Rows whose local course record was written
    pub updated: u64,
    /// Rows with an empty idnumber or no matching local course
    pub skipped: u64,
    pub duration: u64,
}

pub type SyncStatsMap = std::collections::HashMap<String, SyncStats>;

/// A pass either fails reading the external table (reported as a status
/// code) or fails against the local store (a hard error for the run).
enum PassError {
    Read(extdb::Error),
    Store(lms::Error),
}

pub fn course_shell_idnumber(category_idnumber: &str) -> String {
    format!("{CATEGORY_COURSE_TAG}{category_idnumber}")
}

/// Folds one external category row into the matching course shell record.
/// Returns the number of fields that changed; zero means no write is due.
pub fn reconcile_category(
    course: &mut Course,
    external: &ExternalCategory,
    category: Option<&Category>,
) -> usize {
    let mut updated = 0;
    if course.fullname != external.name {
        course.fullname = external.name.clone();
        updated += 1;
    }
    let shell_idnumber = course_shell_idnumber(&external.idnumber);
    if course.shortname != shell_idnumber {
        course.shortname = shell_idnumber;
        updated += 1;
    }
    // No category match just skips this field, not the row
    if let Some(category) = category {
        if course.category != category.id {
            course.category = category.id;
            updated += 1;
        }
    }
    updated
}

/// Folds one external course row into the matching course record. The start
/// date only ever moves earlier; staff may pull a course forward locally but
/// the sync never pushes one back.
pub fn reconcile_course(
    course: &mut Course,
    external: &ExternalCourse,
    category: Option<&Category>,
) -> usize {
    let mut updated = 0;
    if course.fullname != external.fullname {
        course.fullname = external.fullname.clone();
        updated += 1;
    }
    if course.shortname != external.shortname {
        course.shortname = external.shortname.clone();
        updated += 1;
    }
    if let Some(startdate) = external.startdate {
        if startdate < course.startdate {
            course.startdate = startdate;
            updated += 1;
        }
    }
    if let Some(category) = category {
        if course.category != category.id {
            course.category = category.id;
            updated += 1;
        }
    }
    updated
}

async fn sync_categories(
    extdb: &ExtDb,
    db: &PgPool,
    settings: &ExtDbSettings,
) -> std::result::Result<SyncStats, PassError> {
    let start = Instant::now();
    let externals = categories::all(extdb, settings)
        .await
        .map_err(PassError::Read)?;
    let mut stats = SyncStats::default();
    for external in externals {
        if external.idnumber.is_empty() {
            stats.skipped += 1;
            continue;
        }
        let shell_idnumber = course_shell_idnumber(&external.idnumber);
        let Some(mut local) = course::by_idnumber(db, &shell_idnumber)
            .await
            .map_err(PassError::Store)?
        else {
            stats.skipped += 1;
            continue;
        };
        let local_category = category::by_idnumber(db, &external.idnumber)
            .await
            .map_err(PassError::Store)?;
        if reconcile_category(&mut local, &external, local_category.as_ref()) > 0 {
            course::update(db, &local).await.map_err(PassError::Store)?;
            stats.updated += 1;
        }
    }
    stats.duration = start.elapsed().as_secs();
    tracing::info!(
        updated = stats.updated,
        skipped = stats.skipped,
        duration = stats.duration,
        "synced categories"
    );
    Ok(stats)
}

async fn sync_courses(
    extdb: &ExtDb,
    db: &PgPool,
    settings: &ExtDbSettings,
) -> std::result::Result<SyncStats, PassError> {
    let start = Instant::now();
    let externals = courses::all(extdb, settings)
        .await
        .map_err(PassError::Read)?;
    let mut stats = SyncStats::default();
    for external in externals {
        if external.idnumber.is_empty() {
            stats.skipped += 1;
            continue;
        }
        let Some(mut local) = course::by_idnumber(db, &external.idnumber)
            .await
            .map_err(PassError::Store)?
        else {
            stats.skipped += 1;
            continue;
        };
        let local_category = category::by_idnumber(db, &external.category_idnumber)
            .await
            .map_err(PassError::Store)?;
        if reconcile_course(&mut local, &external, local_category.as_ref()) > 0 {
            course::update(db, &local).await.map_err(PassError::Store)?;
            stats.updated += 1;
        }
    }
    stats.duration = start.elapsed().as_secs();
    tracing::info!(
        updated = stats.updated,
        skipped = stats.skipped,
        duration = stats.duration,
        "synced courses"
    );
    Ok(stats)
}

/// One full sync: validate settings, connect, reconcile the category table
/// then the course table, close. Category updates already applied stay
/// applied when the course pass fails; there is no cross-pass transaction.
#[tracing::instrument(skip_all, name = "sync")]
pub async fn run(settings: &Settings) -> Result<(SyncStatus, SyncStatsMap)> {
    let ext_settings = &settings.extdb;
    if let Some(name) = ext_settings.missing_setting() {
        tracing::info!(setting = name, "external database sync is not configured");
        return Ok((SyncStatus::NotConfigured, SyncStatsMap::new()));
    }
    tracing::info!(
        dbtype = %ext_settings.dbtype,
        categories = %ext_settings.remotetablecat,
        courses = %ext_settings.remotetablecrs,
        "starting connection"
    );

    let extdb = match ExtDb::connect(ext_settings).await {
        Ok(extdb) => extdb,
        Err(err) => {
            tracing::error!(?err, "error while communicating with external database");
            return Ok((SyncStatus::ConnectionFailed, SyncStatsMap::new()));
        }
    };
    let db = match settings.lms.connect().await {
        Ok(db) => db,
        Err(err) => {
            extdb.close().await;
            tracing::error!(?err, "error connecting to the lms database");
            return Ok((SyncStatus::ConnectionFailed, SyncStatsMap::new()));
        }
    };

    let mut stats = SyncStatsMap::new();
    match sync_categories(&extdb, &db, ext_settings).await {
        Ok(pass) => {
            stats.insert("categories".to_string(), pass);
        }
        Err(PassError::Read(err)) => {
            extdb.close().await;
            tracing::error!(?err, "error reading data from the external category table");
            return Ok((SyncStatus::ReadFailed, stats));
        }
        Err(PassError::Store(err)) => {
            extdb.close().await;
            return Err(err.into());
        }
    }
    match sync_courses(&extdb, &db, ext_settings).await {
        Ok(pass) => {
            stats.insert("courses".to_string(), pass);
        }
        Err(PassError::Read(err)) => {
            extdb.close().await;
            tracing::error!(?err, "error reading data from the external course table");
            return Ok((SyncStatus::ReadFailed, stats));
        }
        Err(PassError::Store(err)) => {
            extdb.close().await;
            return Err(err.into());
        }
    }
    extdb.close().await;

    Ok((SyncStatus::Completed, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn epoch(year: i32, month: u32, day: u32) -> i64 {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc()
            .timestamp()
    }

    fn local_course(idnumber: &str) -> Course {
        Course {
            id: 42,
            idnumber: idnumber.to_string(),
            fullname: "Bio".to_string(),
            shortname: idnumber.to_string(),
            startdate: epoch(2024, 3, 1),
            category: 5,
        }
    }

    fn biology_category() -> ExternalCategory {
        ExternalCategory {
            idnumber: "101".to_string(),
            name: "Biology".to_string(),
        }
    }

    fn intro_course(startdate: i64) -> ExternalCourse {
        ExternalCourse {
            idnumber: "C9".to_string(),
            fullname: "Intro".to_string(),
            shortname: "C9".to_string(),
            startdate: Some(startdate),
            category_idnumber: "101".to_string(),
        }
    }

    #[test]
    fn category_row_updates_fullname_and_fk() {
        let mut course = local_course("CRS-101");
        let category = Category {
            id: 7,
            idnumber: "101".to_string(),
        };
        let updated = reconcile_category(&mut course, &biology_category(), Some(&category));
        // shortname already matches CRS-101, so only two fields change
        assert_eq!(updated, 2);
        assert_eq!(course.fullname, "Biology");
        assert_eq!(course.shortname, "CRS-101");
        assert_eq!(course.category, 7);
    }

    #[test]
    fn category_row_rewrites_stale_shortname() {
        let mut course = local_course("old-name");
        let updated = reconcile_category(&mut course, &biology_category(), None);
        assert_eq!(updated, 2);
        assert_eq!(course.shortname, "CRS-101");
    }

    #[test]
    fn missing_category_match_skips_only_the_fk() {
        let mut course = local_course("CRS-101");
        let updated = reconcile_category(&mut course, &biology_category(), None);
        assert_eq!(updated, 1);
        assert_eq!(course.fullname, "Biology");
        assert_eq!(course.category, 5);
    }

    #[test]
    fn category_reconcile_is_idempotent() {
        let mut course = local_course("CRS-101");
        let category = Category {
            id: 7,
            idnumber: "101".to_string(),
        };
        assert!(reconcile_category(&mut course, &biology_category(), Some(&category)) > 0);
        assert_eq!(
            reconcile_category(&mut course, &biology_category(), Some(&category)),
            0
        );
    }

    #[test]
    fn course_startdate_moves_earlier() {
        let mut course = local_course("C9");
        let external = intro_course(epoch(2024, 1, 1));
        let category = Category {
            id: 7,
            idnumber: "101".to_string(),
        };
        let updated = reconcile_course(&mut course, &external, Some(&category));
        assert_eq!(updated, 3);
        assert_eq!(course.fullname, "Intro");
        assert_eq!(course.startdate, epoch(2024, 1, 1));
        assert_eq!(course.category, 7);
    }

    #[test]
    fn course_startdate_never_moves_later() {
        let mut course = local_course("C9");
        course.startdate = epoch(2023, 12, 1);
        let external = intro_course(epoch(2024, 1, 1));
        reconcile_course(&mut course, &external, None);
        assert_eq!(course.startdate, epoch(2023, 12, 1));
    }

    #[test]
    fn course_without_startdate_leaves_local_date() {
        let mut course = local_course("C9");
        let mut external = intro_course(0);
        external.startdate = None;
        reconcile_course(&mut course, &external, None);
        assert_eq!(course.startdate, epoch(2024, 3, 1));
    }

    #[test]
    fn matching_course_row_is_a_no_op() {
        let mut course = local_course("C9");
        course.fullname = "Intro".to_string();
        course.category = 7;
        let external = intro_course(epoch(2024, 3, 1));
        let category = Category {
            id: 7,
            idnumber: "101".to_string(),
        };
        assert_eq!(reconcile_course(&mut course, &external, Some(&category)), 0);
    }

    #[test]
    fn course_reconcile_is_idempotent() {
        let mut course = local_course("C9");
        let external = intro_course(epoch(2024, 1, 1));
        let category = Category {
            id: 7,
            idnumber: "101".to_string(),
        };
        assert!(reconcile_course(&mut course, &external, Some(&category)) > 0);
        assert_eq!(reconcile_course(&mut course, &external, Some(&category)), 0);
    }

    #[test]
    fn shell_idnumber_is_tagged() {
        assert_eq!(course_shell_idnumber("101"), "CRS-101");
    }

    #[test]
    fn status_codes_match_the_reporting_contract() {
        assert_eq!(SyncStatus::NotConfigured.code(), 0);
        assert_eq!(SyncStatus::ConnectionFailed.code(), 1);
        assert_eq!(SyncStatus::Completed.code(), 2);
        assert_eq!(SyncStatus::ReadFailed.code(), 4);
    }
}
