use super::handlers;
use super::state::AppState;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;

pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::public::index))
        .route(
            "/post/:slug",
            get(handlers::public::post).post(handlers::public::submit_comment),
        )
        .route("/category/:slug", get(handlers::public::category_posts))
        .route("/tag/:slug", get(handlers::public::tag_posts))
}
