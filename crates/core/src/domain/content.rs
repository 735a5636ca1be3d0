use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum Role {
    Admin,
    Editor,
    User,
}

/// News-tab listing row: a post joined with its category and author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub category_name: String,
    pub author_name: String,
    pub author_role: Role,
    pub created_at: DateTime<Utc>,
}
