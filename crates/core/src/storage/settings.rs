use crate::domain::setting::Setting;
use anyhow::Context;

pub async fn find_by_key(pool: &sqlx::PgPool, key: &str) -> anyhow::Result<Option<Setting>> {
    sqlx::query_as::<_, Setting>(
        "SELECT id, key, value, description, type, created_at, updated_at \
         FROM settings \
         WHERE key = $1",
    )
    .bind(key)
    .fetch_optional(pool)
    .await
    .with_context(|| format!("select setting failed (key={key})"))
}
