use crate::domain::category::{Category, CategoryError, CategoryTree, NewCategory};
use anyhow::Context;

// Serializes category writers so the parent check and the write see the same tree.
async fn lock_and_load_tree(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
) -> anyhow::Result<CategoryTree> {
    sqlx::query("LOCK TABLE categories IN SHARE ROW EXCLUSIVE MODE")
        .execute(&mut **tx)
        .await
        .context("lock categories failed")?;

    let links: Vec<(i32, Option<i32>)> = sqlx::query_as("SELECT id, parent_id FROM categories")
        .fetch_all(&mut **tx)
        .await
        .context("select category links failed")?;

    Ok(CategoryTree::from_links(links))
}

/// Inserts a category after validating its parent. Integrity violations surface as
/// `CategoryError` inside the returned `anyhow::Error`.
pub async fn create(pool: &sqlx::PgPool, new: &NewCategory) -> anyhow::Result<Category> {
    let mut tx = pool.begin().await.context("begin transaction failed")?;
    let tree = lock_and_load_tree(&mut tx).await?;
    tree.check_parent(None, new.parent_id)?;

    let created = sqlx::query_as::<_, Category>(
        "INSERT INTO categories (name, slug, parent_id) \
         VALUES ($1, $2, $3) \
         RETURNING id, name, slug, parent_id",
    )
    .bind(new.name.trim())
    .bind(new.slug.trim())
    .bind(new.parent_id)
    .fetch_one(&mut *tx)
    .await
    .map_err(|err| match err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            anyhow::Error::new(CategoryError::DuplicateSlug {
                slug: new.slug.trim().to_string(),
            })
        }
        other => anyhow::Error::new(other).context("insert categories failed"),
    })?;

    tx.commit().await.context("commit transaction failed")?;
    tracing::info!(id = created.id, parent_id = ?created.parent_id, "category created");
    Ok(created)
}

/// Moves a category under `parent_id` (or to the root). `None` when the category is unknown.
pub async fn set_parent(
    pool: &sqlx::PgPool,
    id: i32,
    parent_id: Option<i32>,
) -> anyhow::Result<Option<Category>> {
    let mut tx = pool.begin().await.context("begin transaction failed")?;
    let tree = lock_and_load_tree(&mut tx).await?;
    if !tree.contains(id) {
        return Ok(None);
    }
    tree.check_parent(Some(id), parent_id)?;

    let updated = sqlx::query_as::<_, Category>(
        "UPDATE categories SET parent_id = $2, updated_at = now() \
         WHERE id = $1 \
         RETURNING id, name, slug, parent_id",
    )
    .bind(id)
    .bind(parent_id)
    .fetch_one(&mut *tx)
    .await
    .context("update categories failed")?;

    tx.commit().await.context("commit transaction failed")?;
    tracing::info!(id, parent_id = ?parent_id, "category re-parented");
    Ok(Some(updated))
}
