use std::str::FromStr;

use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::QueryBuilder;
use tracing::info;

use crate::article::error::StoreError;
use crate::article::types::{Article, ArticleUpdate, NewArticle};

const SCHEMA: &str = "\
CREATE TABLE IF NOT EXISTS articles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    content TEXT NOT NULL,
    author_id INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)";

const COLUMNS: &str = "id, title, content, author_id, created_at, updated_at";

/// SQLite-backed article repository.
#[derive(Clone)]
pub struct ArticleStore {
    pool: SqlitePool,
}

impl ArticleStore {
    /// Open (creating if missing) the database at `url` and ensure the
    /// articles table exists.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        sqlx::query(SCHEMA).execute(&pool).await?;
        info!("article store ready at {}", url);

        Ok(Self { pool })
    }

    pub async fn create(&self, new: NewArticle) -> Result<Article, StoreError> {
        let now = Utc::now();
        let article = sqlx::query_as::<_, Article>(&format!(
            "INSERT INTO articles (title, content, author_id, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?4) RETURNING {COLUMNS}"
        ))
        .bind(&new.title)
        .bind(&new.content)
        .bind(new.author_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(article)
    }

    pub async fn fetch(&self, id: i64) -> Result<Option<Article>, StoreError> {
        let article = sqlx::query_as::<_, Article>(&format!(
            "SELECT {COLUMNS} FROM articles WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(article)
    }

    pub async fn list(&self, skip: i64, limit: i64) -> Result<Vec<Article>, StoreError> {
        let articles = sqlx::query_as::<_, Article>(&format!(
            "SELECT {COLUMNS} FROM articles ORDER BY id LIMIT ?1 OFFSET ?2"
        ))
        .bind(limit)
        .bind(skip)
        .fetch_all(&self.pool)
        .await?;

        Ok(articles)
    }

    /// Apply a partial update. Returns `None` when no article has `id`.
    pub async fn update(
        &self,
        id: i64,
        update: ArticleUpdate,
    ) -> Result<Option<Article>, StoreError> {
        let Some(mut article) = self.fetch(id).await? else {
            return Ok(None);
        };

        if let Some(title) = update.title {
            article.title = title;
        }
        if let Some(content) = update.content {
            article.content = content;
        }
        article.updated_at = Utc::now();

        sqlx::query("UPDATE articles SET title = ?1, content = ?2, updated_at = ?3 WHERE id = ?4")
            .bind(&article.title)
            .bind(&article.content)
            .bind(article.updated_at)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(Some(article))
    }

    /// Delete an article. Returns whether a row was removed.
    pub async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM articles WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Fetch every article whose id is in `ids`. Row order is whatever the
    /// database returns; callers needing a particular order re-sort. Ids
    /// with no matching row are silently absent from the result.
    pub async fn fetch_many(&self, ids: &[i64]) -> Result<Vec<Article>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query =
            QueryBuilder::new(format!("SELECT {COLUMNS} FROM articles WHERE id IN ("));
        let mut separated = query.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let articles = query
            .build_query_as::<Article>()
            .fetch_all(&self.pool)
            .await?;

        Ok(articles)
    }
}
