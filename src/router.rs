use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::shared::AppState;
use crate::{article, pages, product, room, session};

/// Builds the full route table over `state`
pub fn build_router(state: AppState) -> Router {
    let require_session = middleware::from_fn_with_state(state.clone(), session::jwt_auth);

    let api = Router::new()
        .route("/hello", get(room::hello))
        .route("/rooms", get(room::list_rooms))
        .route("/create-room", post(room::create_room))
        .route("/get-room", get(room::get_room))
        .route("/user-in-room", get(room::user_in_room));

    let products = Router::new()
        .route("/list", get(product::list_products))
        .route("/create", post(product::create_product))
        .route(
            "/:id",
            get(product::get_product).delete(product::delete_product),
        );

    let blog = Router::new()
        .route("/", get(article::list_articles))
        .route("/:id", get(article::get_article))
        .merge(
            Router::new()
                .route("/create", post(article::create_article))
                .route("/:id/update", post(article::update_article))
                .route("/:id/delete", delete(article::delete_article))
                .route_layer(require_session.clone()),
        );

    Router::new()
        .route("/", get(pages::home))
        .route("/contact", get(pages::contact))
        .route("/about", get(pages::about))
        .route("/social", get(pages::social))
        .route(
            "/session",
            post(session::create_session)
                .merge(delete(session::revoke_session).route_layer(require_session)),
        )
        .nest("/api", api)
        .nest("/product", products)
        .nest("/blog", blog)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
