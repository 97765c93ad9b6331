pub mod routes;
pub mod ws;

use crate::state::AppState;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;

/// HTTP + WS surface of the dashboard. Anything not under /api or /ws is
/// served from the static dashboard build.
pub fn router(state: Arc<AppState>) -> Router {
    let dashboard = &state.config.dashboard_dir;
    let static_files = tower_http::services::ServeDir::new(dashboard)
        .fallback(tower_http::services::ServeFile::new(dashboard.join("index.html")));

    Router::new()
        .route("/api/price", get(routes::get_price))
        .route("/api/surface", get(routes::get_surface))
        .route("/api/state", get(routes::get_state))
        .route("/api/counters", get(routes::get_counters))
        .route("/ws", get(ws::ws_handler))
        .fallback_service(static_files)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        .with_state(state)
}
