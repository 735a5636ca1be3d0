use crate::domain::content::PostSummary;
use crate::domain::records::Page;
use crate::storage::{page_bounds, stocks};
use anyhow::Context;

/// News for a stock, newest first. `None` when the symbol is unknown.
pub async fn list_for_symbol(
    pool: &sqlx::PgPool,
    symbol: &str,
    page: i64,
    page_size: i64,
) -> anyhow::Result<Option<Page<PostSummary>>> {
    let Some(stock) = stocks::find_stock_by_symbol(pool, symbol).await? else {
        return Ok(None);
    };
    let (page, page_size, offset) = page_bounds(page, page_size);

    let total: i64 = sqlx::query_scalar("SELECT count(*) FROM posts WHERE stock_id = $1")
        .bind(stock.id)
        .fetch_one(pool)
        .await
        .context("count posts failed")?;

    let data = sqlx::query_as::<_, PostSummary>(
        "SELECT p.id, p.title, p.slug, c.name AS category_name, u.name AS author_name, \
                u.role AS author_role, p.created_at \
         FROM posts p \
         JOIN categories c ON c.id = p.category_id \
         JOIN users u ON u.id = p.author_id \
         WHERE p.stock_id = $1 \
         ORDER BY p.created_at DESC, p.id DESC \
         LIMIT $2 OFFSET $3",
    )
    .bind(stock.id)
    .bind(page_size)
    .bind(offset)
    .fetch_all(pool)
    .await
    .with_context(|| format!("select posts failed (stock_id={})", stock.id))?;

    Ok(Some(Page::new(data, page, page_size, total)))
}
