use crate::{Error, Result};
use futures::TryFutureExt;
use sqlx::{PgExecutor, Postgres};

/// Looks up a course by its unique idnumber. Courses are only ever updated
/// by the sync, never created or deleted.
pub async fn by_idnumber<'c, E>(exec: E, idnumber: &str) -> Result<Option<Course>>
where
    E: PgExecutor<'c>,
{
    let course = fetch_courses_query()
        .push("where idnumber = ")
        .push_bind(idnumber)
        .build_query_as::<Course>()
        .fetch_optional(exec)
        .await?;

    Ok(course)
}

/// Writes the monitored fields back by primary key. Callers only invoke
/// this when at least one field changed.
pub async fn update<'c, E>(exec: E, course: &Course) -> Result<()>
where
    E: PgExecutor<'c>,
{
    sqlx::query(
        r#"
        update course set
            fullname = $2,
            shortname = $3,
            startdate = $4,
            category = $5
        where id = $1
        "#,
    )
    .bind(course.id)
    .bind(&course.fullname)
    .bind(&course.shortname)
    .bind(course.startdate)
    .bind(course.category)
    .execute(exec)
    .map_ok(|_| ())
    .map_err(Error::from)
    .await
}

const FETCH_COURSES_QUERY: &str = r#"
        select
            id,
            idnumber,
            fullname,
            shortname,
            startdate,
            category
        from course
    "#;

fn fetch_courses_query<'builder>() -> sqlx::QueryBuilder<'builder, Postgres> {
    sqlx::QueryBuilder::new(FETCH_COURSES_QUERY)
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow, serde::Serialize)]
pub struct Course {
    pub id: i64,
    pub idnumber: String,
    pub fullname: String,
    pub shortname: String,
    /// Epoch seconds
    pub startdate: i64,
    /// Foreign key to the category's numeric id
    pub category: i64,
}
