use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored article as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating an article.
#[derive(Debug, Clone, Deserialize)]
pub struct NewArticle {
    pub title: String,
    pub content: String,
    pub author_id: i64,
}

/// Partial update payload. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticleUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
}
