use axum::{
    Router, middleware,
    routing::{IntoMakeService, get},
};
use tower_http::cors::{Any, CorsLayer};

use crate::{AppState, middleware as app_middleware};

pub mod conversation;
pub mod health;
pub mod sessions;
pub mod tasks;
pub mod walkers;

/// Every route under `/api`, with request ids and permissive CORS for the
/// browser front end. Walkers are also served at the root, where the chat
/// front end posts them (`{BACKEND_URL}/walker/...`).
pub fn api_router(assistant: AppState) -> Router {
    let root_walkers = walkers::router().with_state(assistant.clone());

    let base_routes = Router::new()
        .route("/health", get(health::health_check))
        .merge(conversation::router())
        .merge(walkers::router())
        .merge(tasks::router())
        .merge(sessions::router())
        .with_state(assistant);

    Router::new()
        .nest("/api", base_routes)
        .merge(root_walkers)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(middleware::from_fn(app_middleware::request_id_middleware))
}

pub fn router(assistant: AppState) -> IntoMakeService<Router> {
    api_router(assistant).into_make_service()
}
