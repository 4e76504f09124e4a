use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::Value;
use tracing::{info, instrument, warn};

use super::models::{article_text_from_payload, ArticleModel, NewArticle};
use crate::session::SessionClaims;
use crate::shared::{AppError, AppState};
use crate::validation::json_object;

/// Loads an article and checks the caller wrote it
async fn owned_article(
    state: &AppState,
    article_id: i64,
    claims: &SessionClaims,
) -> Result<ArticleModel, AppError> {
    let article = state
        .article_repository
        .get_article(article_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Article not found".to_string()))?;

    if !article.is_authored_by(&claims.session_id) {
        warn!(article_id = article_id, session_id = %claims.session_id, "Not the article author");
        return Err(AppError::Forbidden(
            "Only the author may change this article".to_string(),
        ));
    }
    Ok(article)
}

/// GET /blog
#[instrument(name = "list_articles", skip(state))]
pub async fn list_articles(
    State(state): State<AppState>,
) -> Result<Json<Vec<ArticleModel>>, AppError> {
    Ok(Json(state.article_repository.list_articles().await?))
}

/// GET /blog/:id
#[instrument(name = "get_article", skip(state))]
pub async fn get_article(
    State(state): State<AppState>,
    Path(article_id): Path<i64>,
) -> Result<Json<ArticleModel>, AppError> {
    state
        .article_repository
        .get_article(article_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Article not found".to_string()))
}

/// POST /blog/create
/// Requires `jwt_auth`; the caller's session becomes the author.
#[instrument(name = "create_article", skip(state, claims, payload))]
pub async fn create_article(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<ArticleModel>), AppError> {
    let text = article_text_from_payload(&json_object(payload)?)?;

    let article = state
        .article_repository
        .create_article(&NewArticle {
            text,
            author_id: claims.session_id,
            author_name: claims.username,
        })
        .await?;

    info!(article_id = article.id, author = %article.author_name, "Article created");
    Ok((StatusCode::CREATED, Json(article)))
}

/// POST /blog/:id/update
#[instrument(name = "update_article", skip(state, claims, payload))]
pub async fn update_article(
    State(state): State<AppState>,
    Path(article_id): Path<i64>,
    Extension(claims): Extension<SessionClaims>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ArticleModel>, AppError> {
    owned_article(&state, article_id, &claims).await?;
    let text = article_text_from_payload(&json_object(payload)?)?;

    let article = state.article_repository.update_text(article_id, &text).await?;
    info!(article_id = article_id, "Article updated");

    Ok(Json(article))
}

/// DELETE /blog/:id/delete
#[instrument(name = "delete_article", skip(state, claims))]
pub async fn delete_article(
    State(state): State<AppState>,
    Path(article_id): Path<i64>,
    Extension(claims): Extension<SessionClaims>,
) -> Result<StatusCode, AppError> {
    owned_article(&state, article_id, &claims).await?;

    state.article_repository.delete_article(article_id).await?;
    info!(article_id = article_id, "Article deleted");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article::repository::InMemoryArticleRepository;
    use crate::session::jwt_auth;
    use crate::shared::test_utils::AppStateBuilder;
    use axum::{
        body::Body,
        http::Request,
        middleware,
        routing::{delete, get, post},
        Router,
    };
    use serde_json::json;
    use std::sync::Arc;
    use tower::ServiceExt; // for `oneshot`

    fn blog_router(state: AppState) -> Router {
        let protected = Router::new()
            .route("/blog/create", post(create_article))
            .route("/blog/:id/update", post(update_article))
            .route("/blog/:id/delete", delete(delete_article))
            .route_layer(middleware::from_fn_with_state(state.clone(), jwt_auth));

        Router::new()
            .route("/blog", get(list_articles))
            .route("/blog/:id", get(get_article))
            .merge(protected)
            .with_state(state)
    }

    fn authed(method: &str, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("authorization", format!("Bearer {}", token))
            .header("content-type", "application/json");
        match body {
            Some(body) => builder.body(Body::from(body.to_string())).unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_create_article_uses_session_as_author() {
        let repo = Arc::new(InMemoryArticleRepository::new());
        let state = AppStateBuilder::new().with_article_repository(repo.clone()).build();
        let session = state.session_service.create_session().await.unwrap();
        let app = blog_router(state);

        let response = app
            .oneshot(authed("POST", "/blog/create", &session.token, Some(json!({"text": "First post"}))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["text"], "First post");
        assert_eq!(body["author_id"], session.session_id.as_str());
        assert_eq!(body["author_name"], session.username.as_str());
        assert_eq!(repo.article_count(), 1);
    }

    #[tokio::test]
    async fn test_create_article_requires_session() {
        let repo = Arc::new(InMemoryArticleRepository::new());
        let app = blog_router(AppStateBuilder::new().with_article_repository(repo.clone()).build());

        let request = Request::builder()
            .method("POST")
            .uri("/blog/create")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"text": "anonymous"}"#))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .oneshot(authed("POST", "/blog/create", "forged.token.value", Some(json!({"text": "x"}))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(repo.article_count(), 0);
    }

    #[tokio::test]
    async fn test_only_author_can_update_or_delete() {
        let state = AppStateBuilder::new().build();
        let author = state.session_service.create_session().await.unwrap();
        let other = state.session_service.create_session().await.unwrap();
        let app = blog_router(state);

        let created = app
            .clone()
            .oneshot(authed("POST", "/blog/create", &author.token, Some(json!({"text": "mine"}))))
            .await
            .unwrap();
        let id = body_json(created).await["id"].as_i64().unwrap();

        let response = app
            .clone()
            .oneshot(authed("POST", &format!("/blog/{}/update", id), &other.token, Some(json!({"text": "hijacked"}))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app
            .clone()
            .oneshot(authed("DELETE", &format!("/blog/{}/delete", id), &other.token, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app
            .clone()
            .oneshot(authed("POST", &format!("/blog/{}/update", id), &author.token, Some(json!({"text": "edited"}))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["text"], "edited");

        let response = app
            .clone()
            .oneshot(authed("DELETE", &format!("/blog/{}/delete", id), &author.token, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .oneshot(Request::get(format!("/blog/{}", id)).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_non_author_is_forbidden_before_body_checks() {
        let state = AppStateBuilder::new().build();
        let author = state.session_service.create_session().await.unwrap();
        let other = state.session_service.create_session().await.unwrap();
        let app = blog_router(state);

        let created = app
            .clone()
            .oneshot(authed("POST", "/blog/create", &author.token, Some(json!({"text": "mine"}))))
            .await
            .unwrap();
        let id = body_json(created).await["id"].as_i64().unwrap();

        let response = app
            .clone()
            .oneshot(authed("POST", &format!("/blog/{}/update", id), &other.token, Some(json!({}))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app
            .oneshot(authed("POST", &format!("/blog/{}/update", id), &author.token, Some(json!({}))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({"text": ["This field is required."]})
        );
    }

    #[tokio::test]
    async fn test_update_missing_article() {
        let state = AppStateBuilder::new().build();
        let author = state.session_service.create_session().await.unwrap();
        let app = blog_router(state);

        let response = app
            .oneshot(authed("POST", "/blog/99/update", &author.token, Some(json!({"text": "x"}))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_articles_handler() {
        let app = blog_router(AppStateBuilder::new().build());

        let response = app
            .oneshot(Request::get("/blog").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!([]));
    }
}
