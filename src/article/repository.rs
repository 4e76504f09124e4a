use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::BTreeMap;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::{ArticleModel, NewArticle};
use crate::shared::AppError;

/// Trait for article repository operations
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    async fn create_article(&self, article: &NewArticle) -> Result<ArticleModel, AppError>;
    async fn get_article(&self, article_id: i64) -> Result<Option<ArticleModel>, AppError>;
    async fn list_articles(&self) -> Result<Vec<ArticleModel>, AppError>;
    async fn update_text(&self, article_id: i64, text: &str) -> Result<ArticleModel, AppError>;
    async fn delete_article(&self, article_id: i64) -> Result<(), AppError>;
}

#[derive(Default)]
struct ArticleTable {
    next_id: i64,
    articles: BTreeMap<i64, ArticleModel>,
}

/// In-memory implementation of ArticleRepository for development and testing
#[derive(Default)]
pub struct InMemoryArticleRepository {
    table: Mutex<ArticleTable>,
}

impl InMemoryArticleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn article_count(&self) -> usize {
        self.lock().articles.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ArticleTable> {
        self.table
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ArticleRepository for InMemoryArticleRepository {
    #[instrument(skip(self, article), fields(author = %article.author_name))]
    async fn create_article(&self, article: &NewArticle) -> Result<ArticleModel, AppError> {
        let mut table = self.lock();
        table.next_id += 1;
        let stored = article.clone().into_model(table.next_id);
        table.articles.insert(stored.id, stored.clone());

        debug!(article_id = stored.id, "Article created in memory");
        Ok(stored)
    }

    #[instrument(skip(self))]
    async fn get_article(&self, article_id: i64) -> Result<Option<ArticleModel>, AppError> {
        Ok(self.lock().articles.get(&article_id).cloned())
    }

    #[instrument(skip(self))]
    async fn list_articles(&self) -> Result<Vec<ArticleModel>, AppError> {
        Ok(self.lock().articles.values().cloned().collect())
    }

    #[instrument(skip(self, text))]
    async fn update_text(&self, article_id: i64, text: &str) -> Result<ArticleModel, AppError> {
        let mut table = self.lock();
        let article = table
            .articles
            .get_mut(&article_id)
            .ok_or_else(|| AppError::NotFound("Article not found".to_string()))?;

        article.text = text.to_string();
        Ok(article.clone())
    }

    #[instrument(skip(self))]
    async fn delete_article(&self, article_id: i64) -> Result<(), AppError> {
        if self.lock().articles.remove(&article_id).is_none() {
            warn!(article_id = article_id, "Article not found for deletion");
            return Err(AppError::NotFound("Article not found".to_string()));
        }
        Ok(())
    }
}

const ARTICLE_COLUMNS: &str = "id, text, author_id, author_name, created_at";

/// PostgreSQL implementation of article repository
pub struct PostgresArticleRepository {
    pool: PgPool,
}

impl PostgresArticleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ArticleRepository for PostgresArticleRepository {
    #[instrument(skip(self, article), fields(author = %article.author_name))]
    async fn create_article(&self, article: &NewArticle) -> Result<ArticleModel, AppError> {
        sqlx::query_as::<_, ArticleModel>(&format!(
            "INSERT INTO articles (text, author_id, author_name, created_at) \
             VALUES ($1, $2, $3, NOW()) RETURNING {ARTICLE_COLUMNS}"
        ))
        .bind(&article.text)
        .bind(&article.author_id)
        .bind(&article.author_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to create article in database");
            AppError::DatabaseError(e.to_string())
        })
    }

    #[instrument(skip(self))]
    async fn get_article(&self, article_id: i64) -> Result<Option<ArticleModel>, AppError> {
        sqlx::query_as::<_, ArticleModel>(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles WHERE id = $1"
        ))
        .bind(article_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, article_id = article_id, "Failed to fetch article");
            AppError::DatabaseError(e.to_string())
        })
    }

    #[instrument(skip(self))]
    async fn list_articles(&self) -> Result<Vec<ArticleModel>, AppError> {
        sqlx::query_as::<_, ArticleModel>(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to list articles");
            AppError::DatabaseError(e.to_string())
        })
    }

    #[instrument(skip(self, text))]
    async fn update_text(&self, article_id: i64, text: &str) -> Result<ArticleModel, AppError> {
        sqlx::query_as::<_, ArticleModel>(&format!(
            "UPDATE articles SET text = $2 WHERE id = $1 RETURNING {ARTICLE_COLUMNS}"
        ))
        .bind(article_id)
        .bind(text)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, article_id = article_id, "Failed to update article");
            AppError::DatabaseError(e.to_string())
        })?
        .ok_or_else(|| AppError::NotFound("Article not found".to_string()))
    }

    #[instrument(skip(self))]
    async fn delete_article(&self, article_id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM articles WHERE id = $1")
            .bind(article_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, article_id = article_id, "Failed to delete article");
                AppError::DatabaseError(e.to_string())
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Article not found".to_string()));
        }
        Ok(())
    }
}
