//! Query helpers shared by repositories.

use finadmin_shared::types::{PageRequest, PageResponse};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, FromQueryResult, PaginatorTrait,
    QuerySelect, Select, SqlErr,
};

/// Current time as stored in `TIMESTAMPTZ` columns.
pub(crate) fn now() -> DateTimeWithTimeZone {
    chrono::Utc::now().into()
}

/// Escapes `LIKE` wildcards and wraps the term for a substring match.
pub(crate) fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.trim().to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Case-insensitive substring match: `lower(col) LIKE '%term%'`.
pub(crate) fn contains_ci<C: ColumnTrait>(column: C, term: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col((column.entity_name(), column)))).like(contains_pattern(term))
}

/// Active filter: absent means active rows only.
pub(crate) fn active_filter<C: ColumnTrait>(column: C, active: Option<bool>) -> SimpleExpr {
    column.eq(active.unwrap_or(true))
}

/// Returns true when the error is a unique constraint violation.
pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Counts the matching rows and fetches one page.
pub(crate) async fn fetch_page<E>(
    db: &DatabaseConnection,
    select: Select<E>,
    page: PageRequest,
) -> Result<PageResponse<E::Model>, DbErr>
where
    E: EntityTrait,
    E::Model: FromQueryResult + Send + Sync,
{
    let total = select.clone().count(db).await?;
    let rows = select
        .offset(page.offset())
        .limit(page.limit())
        .all(db)
        .await?;
    Ok(PageResponse::new(rows, page, total))
}

/// Mock row answering a `count()` query.
#[cfg(test)]
pub(crate) fn count_row(n: i64) -> std::collections::BTreeMap<String, sea_orm::Value> {
    std::collections::BTreeMap::from([("num_items".to_string(), sea_orm::Value::from(n))])
}

#[cfg(test)]
mod tests {
    use sea_orm::{DbBackend, EntityTrait, QueryFilter, QueryTrait};

    use super::*;
    use crate::entities::suppliers;

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("Agro"), "%agro%");
        assert_eq!(contains_pattern(" 100% _x "), "%100\\% \\_x%");
        assert_eq!(contains_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn test_contains_ci_sql() {
        let sql = suppliers::Entity::find()
            .filter(contains_ci(suppliers::Column::CompanyName, "Agro"))
            .build(DbBackend::Postgres)
            .to_string();
        assert!(sql.contains(r#"LOWER("suppliers"."company_name") LIKE '%agro%'"#), "{sql}");
    }

    #[test]
    fn test_active_filter_defaults_to_active() {
        let sql = suppliers::Entity::find()
            .filter(active_filter(suppliers::Column::Active, None))
            .build(DbBackend::Postgres)
            .to_string();
        assert!(sql.contains(r#""suppliers"."active" = TRUE"#), "{sql}");
    }
}
