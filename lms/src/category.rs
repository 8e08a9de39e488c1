use crate::Result;
use sqlx::{PgExecutor, Postgres};

/// Looks up a category by its unique idnumber. Read-only from the sync's
/// perspective; only the numeric id is ever used, as the course FK target.
pub async fn by_idnumber<'c, E>(exec: E, idnumber: &str) -> Result<Option<Category>>
where
    E: PgExecutor<'c>,
{
    let category = fetch_categories_query()
        .push("where idnumber = ")
        .push_bind(idnumber)
        .build_query_as::<Category>()
        .fetch_optional(exec)
        .await?;

    Ok(category)
}

const FETCH_CATEGORIES_QUERY: &str = r#"
        select
            id,
            idnumber
        from course_categories
    "#;

fn fetch_categories_query<'builder>() -> sqlx::QueryBuilder<'builder, Postgres> {
    sqlx::QueryBuilder::new(FETCH_CATEGORIES_QUERY)
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow, serde::Serialize)]
pub struct Category {
    pub id: i64,
    pub idnumber: String,
}
