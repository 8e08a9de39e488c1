use crate::{
    codec::{self, Quoting},
    settings::ExtDbSettings,
};

/// How condition values are matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    Equals,
    Like,
}

/// Builds parameter-free SELECT statements for the external database.
///
/// The external driver model is text-protocol, so values are encoded to the
/// external charset and escaped, then interpolated. Callers supply condition
/// slices in the order the WHERE clause should AND them.
#[derive(Debug, Clone)]
pub struct StatementBuilder {
    encoding: String,
    quoting: Quoting,
}

impl StatementBuilder {
    pub fn new(encoding: &str, quoting: Quoting) -> Self {
        Self {
            encoding: encoding.to_string(),
            quoting,
        }
    }

    pub fn from_settings(settings: &ExtDbSettings) -> Self {
        Self::new(&settings.dbencoding, settings.quoting())
    }

    pub fn select(
        &self,
        table: &str,
        conditions: &[(&str, &str)],
        fields: &[&str],
        distinct: bool,
        sort: &str,
        mode: MatchMode,
    ) -> String {
        let fields = if fields.is_empty() {
            "*".to_string()
        } else {
            fields.join(",")
        };
        let mut sql = String::from("SELECT ");
        if distinct {
            sql.push_str("DISTINCT ");
        }
        sql.push_str(&fields);
        sql.push_str(" FROM ");
        sql.push_str(table);
        if !conditions.is_empty() {
            let clauses: Vec<String> = conditions
                .iter()
                .map(|(field, value)| {
                    let value = codec::escape(&codec::encode(value, &self.encoding), self.quoting);
                    match mode {
                        MatchMode::Equals => format!("{field} = '{value}'"),
                        MatchMode::Like => format!("{field} LIKE '%{value}%'"),
                    }
                })
                .collect();
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        if !sort.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(sort);
        }
        sql
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> StatementBuilder {
        StatementBuilder::new("utf-8", Quoting::Standard)
    }

    #[test]
    fn full_table_select_uses_star() {
        assert_eq!(
            builder().select("ext_courses", &[], &[], true, "", MatchMode::Equals),
            "SELECT DISTINCT * FROM ext_courses"
        );
    }

    #[test]
    fn conditions_are_anded_in_order() {
        let sql = builder().select(
            "ext_courses",
            &[("course_idnumber", "C9"), ("category_idnumber", "101")],
            &["course_idnumber", "course_fullname"],
            false,
            "course_idnumber",
            MatchMode::Equals,
        );
        assert_eq!(
            sql,
            "SELECT course_idnumber,course_fullname FROM ext_courses \
             WHERE course_idnumber = 'C9' AND category_idnumber = '101' \
             ORDER BY course_idnumber"
        );
    }

    #[test]
    fn like_mode_wraps_the_value() {
        let sql = builder().select(
            "ext_categories",
            &[("category_name", "Bio")],
            &[],
            false,
            "",
            MatchMode::Like,
        );
        assert_eq!(
            sql,
            "SELECT * FROM ext_categories WHERE category_name LIKE '%Bio%'"
        );
    }

    #[test]
    fn condition_values_are_escaped() {
        let sql = builder().select(
            "ext_courses",
            &[("course_fullname", "O'Brien's course")],
            &[],
            false,
            "",
            MatchMode::Equals,
        );
        assert_eq!(
            sql,
            "SELECT * FROM ext_courses WHERE course_fullname = 'O''Brien''s course'"
        );
    }

    #[test]
    fn sybase_quoting_escapes_with_backslashes() {
        let builder = StatementBuilder::new("utf-8", Quoting::Sybase);
        let sql = builder.select(
            "ext_courses",
            &[("course_fullname", "O'Brien")],
            &[],
            false,
            "",
            MatchMode::Equals,
        );
        assert_eq!(
            sql,
            "SELECT * FROM ext_courses WHERE course_fullname = 'O\\'Brien'"
        );
    }
}
