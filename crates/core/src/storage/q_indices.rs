use crate::domain::stock::{QIndexSortField, SortDir, StockQIndex};
use anyhow::Context;
use chrono::NaiveDate;

fn select_sql(sort_field: QIndexSortField, sort_dir: SortDir) -> String {
    format!(
        "SELECT id, stock_id, date, open, low, high, close, trend_q, fq, qv1, band_down, band_up \
         FROM stock_q_indices \
         WHERE stock_id = $1 \
           AND ($2::date IS NULL OR date >= $2) \
           AND ($3::date IS NULL OR date <= $3) \
         ORDER BY {} {} NULLS LAST, id ASC",
        sort_field.column(),
        sort_dir.sql()
    )
}

/// Q-index rows for one stock inside an inclusive, optionally open-ended date range.
pub async fn find_by_stock_id(
    pool: &sqlx::PgPool,
    stock_id: i32,
    sort_field: QIndexSortField,
    sort_dir: SortDir,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> anyhow::Result<Vec<StockQIndex>> {
    let t0 = std::time::Instant::now();
    let sql = select_sql(sort_field, sort_dir);
    let rows = sqlx::query_as::<_, StockQIndex>(&sql)
        .bind(stock_id)
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await
        .with_context(|| format!("select stock_q_indices failed (stock_id={stock_id})"))?;

    tracing::debug!(
        stock_id,
        ?start,
        ?end,
        rows = rows.len(),
        elapsed_ms = t0.elapsed().as_millis(),
        "stock_q_indices query"
    );
    Ok(rows)
}
