use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;

use crate::shared::AppError;
use crate::validation::{required_string, ValidationErrors};

/// Database model for the articles table
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct ArticleModel {
    pub id: i64,
    pub text: String,
    pub author_id: String, // Session id of the author
    pub author_name: String,
    pub created_at: DateTime<Utc>,
}

impl ArticleModel {
    pub fn is_authored_by(&self, session_id: &str) -> bool {
        self.author_id == session_id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewArticle {
    pub text: String,
    pub author_id: String,
    pub author_name: String,
}

impl NewArticle {
    pub fn into_model(self, id: i64) -> ArticleModel {
        ArticleModel {
            id,
            text: self.text,
            author_id: self.author_id,
            author_name: self.author_name,
            created_at: Utc::now(),
        }
    }
}

/// Reads the article body text. Blank text is allowed, a missing one is not.
pub fn article_text_from_payload(data: &Map<String, Value>) -> Result<String, AppError> {
    let mut errors = ValidationErrors::new();
    let text = required_string(data, "text", true, &mut errors);

    match text {
        Some(text) if errors.is_empty() => Ok(text),
        _ => Err(AppError::Validation(errors)),
    }
}
