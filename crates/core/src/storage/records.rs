use crate::domain::records::{EpsRecord, FinancialRatioRecord, Page, PeRecord, RoaRoeRecord};
use crate::storage::page_bounds;
use anyhow::Context;
use sqlx::postgres::PgRow;

/// A record family stored one row per `(symbol, report_date)`.
pub trait RecordTable: for<'r> sqlx::FromRow<'r, PgRow> + Send + Unpin {
    const TABLE: &'static str;
    const METRIC_COLUMNS: &'static str;
}

impl RecordTable for EpsRecord {
    const TABLE: &'static str = "eps_records";
    const METRIC_COLUMNS: &'static str = "eps, industry_eps, eps_growth, industry_eps_growth";
}

impl RecordTable for PeRecord {
    const TABLE: &'static str = "pe_records";
    const METRIC_COLUMNS: &'static str = "pe, industry_pe";
}

impl RecordTable for RoaRoeRecord {
    const TABLE: &'static str = "roa_roe_records";
    const METRIC_COLUMNS: &'static str = "roa, industry_roa, roe, industry_roe";
}

impl RecordTable for FinancialRatioRecord {
    const TABLE: &'static str = "financial_ratio_records";
    const METRIC_COLUMNS: &'static str =
        "debt_to_equity, industry_debt_to_equity, debt_to_assets, industry_debt_to_assets";
}

fn select_sql<T: RecordTable>() -> String {
    format!(
        "SELECT id, symbol, report_date, {} FROM {} \
         WHERE upper(symbol) = upper($1) \
         ORDER BY report_date DESC, id DESC \
         LIMIT $2 OFFSET $3",
        T::METRIC_COLUMNS,
        T::TABLE
    )
}

/// Newest reports first, paginated.
pub async fn find_by_symbol<T: RecordTable>(
    pool: &sqlx::PgPool,
    symbol: &str,
    page: i64,
    page_size: i64,
) -> anyhow::Result<Page<T>> {
    let (page, page_size, offset) = page_bounds(page, page_size);
    let symbol = symbol.trim();

    let total: i64 = sqlx::query_scalar(&format!(
        "SELECT count(*) FROM {} WHERE upper(symbol) = upper($1)",
        T::TABLE
    ))
    .bind(symbol)
    .fetch_one(pool)
    .await
    .with_context(|| format!("count {} failed (symbol={symbol})", T::TABLE))?;

    let sql = select_sql::<T>();
    let data = sqlx::query_as::<_, T>(&sql)
        .bind(symbol)
        .bind(page_size)
        .bind(offset)
        .fetch_all(pool)
        .await
        .with_context(|| format!("select {} failed (symbol={symbol})", T::TABLE))?;

    Ok(Page::new(data, page, page_size, total))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selects_family_columns() {
        let sql = select_sql::<PeRecord>();
        assert!(sql.starts_with("SELECT id, symbol, report_date, pe, industry_pe FROM pe_records"));
        let sql = select_sql::<FinancialRatioRecord>();
        assert!(sql.contains("FROM financial_ratio_records"));
    }
}
