use crate::domain::stock::Stock;
use anyhow::Context;

pub async fn find_stock_by_symbol(pool: &sqlx::PgPool, symbol: &str) -> anyhow::Result<Option<Stock>> {
    sqlx::query_as::<_, Stock>(
        "SELECT id, symbol, name, exchange, industry, created_at, updated_at \
         FROM stocks \
         WHERE upper(symbol) = upper($1) \
         LIMIT 1",
    )
    .bind(symbol.trim())
    .fetch_optional(pool)
    .await
    .with_context(|| format!("select stock by symbol failed (symbol={symbol})"))
}
