pub mod categories;
pub mod posts;
pub mod q_indices;
pub mod records;
pub mod settings;
pub mod stocks;

use anyhow::Context;

pub const MAX_PAGE_SIZE: i64 = 500;

pub async fn migrate(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("sqlx migrations failed")?;
    Ok(())
}

/// Clamps a 1-based page request and returns `(page, page_size, offset)`.
pub fn page_bounds(page: i64, page_size: i64) -> (i64, i64, i64) {
    let page = page.max(1);
    let page_size = page_size.clamp(1, MAX_PAGE_SIZE);
    (page, page_size, (page - 1) * page_size)
}
