use std::sync::Arc;

use axum::{
    middleware,
    routing::get,
    Router,
};
use tower_http::trace::TraceLayer;

use super::activity::list_activity;
use super::games::search_games;
use super::handlers::{get_config, health, metrics};
use super::middleware::metrics_middleware;
use super::watched::{add_watched, get_watched, list_watched, remove_watched, update_watched};
use crate::state::AppState;

/// Create the application router.
///
/// The acting user is the `{user_id}` path segment; authentication is left
/// to whatever fronts this service.
pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health))
        .route("/config", get(get_config))
        .route("/metrics", get(metrics))
        // Watched list
        .route(
            "/users/{user_id}/watched",
            get(list_watched).post(add_watched),
        )
        .route(
            "/users/{user_id}/watched/{id}",
            get(get_watched)
                .patch(update_watched)
                .put(update_watched)
                .delete(remove_watched),
        )
        // Activity feed
        .route("/users/{user_id}/activity", get(list_activity))
        // Game search
        .route("/games/search", get(search_games));

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
