//! Filtered, sorted, paginated listing.
//!
//! Caller-supplied values only ever reach the statement through bind
//! parameters. The ORDER BY column and direction come from the closed
//! `SortField`/`SortOrder` enums.

use patient_storage::{PatientPage, PatientQuery};
use sqlx_core::query_builder::QueryBuilder;
use sqlx_postgres::{PgPool, Postgres};
use tracing::debug;

use super::{PATIENT_COLUMNS, decode_patient};
use crate::error::Result;

/// Escapes LIKE metacharacters so the term matches literally.
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Appends the WHERE clause shared by the page and count statements.
fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, q: &PatientQuery) {
    qb.push(" WHERE is_active");

    if let Some(search) = &q.search {
        let pattern = format!("%{}%", escape_like(search));
        qb.push(" AND (first_name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR last_name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR national_id ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR medical_record_no ILIKE ")
            .push_bind(pattern)
            .push(")");
    }

    if let Some(city) = &q.city {
        qb.push(" AND city = ").push_bind(city.clone());
    }

    if let Some(province) = &q.province {
        qb.push(" AND province = ").push_bind(province.clone());
    }
}

/// Builds the statement selecting one page of matching rows.
pub fn page_statement(q: &PatientQuery) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT {PATIENT_COLUMNS} FROM patients"));
    push_filters(&mut qb, q);
    qb.push(format!(
        " ORDER BY {} {}, id ASC",
        q.sort.column(),
        q.order.keyword()
    ));
    qb.push(" LIMIT ")
        .push_bind(i64::from(q.limit))
        .push(" OFFSET ")
        .push_bind(i64::try_from(q.offset).unwrap_or(i64::MAX));
    qb
}

/// Builds the statement counting all matching rows.
pub fn count_statement(q: &PatientQuery) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM patients");
    push_filters(&mut qb, q);
    qb
}

/// Returns one page of active records plus the total count of matches.
pub async fn list(pool: &PgPool, q: &PatientQuery) -> Result<PatientPage> {
    let mut count = count_statement(q);
    let total: i64 = count.build_query_scalar::<i64>().fetch_one(pool).await?;

    let mut page = page_statement(q);
    debug!(sql = page.sql(), "Listing patients");
    let rows = page.build().fetch_all(pool).await?;

    let records = rows
        .iter()
        .map(decode_patient)
        .collect::<Result<Vec<_>>>()?;

    Ok(PatientPage::new(records, u64::try_from(total).unwrap_or(0)))
}
