pub mod gate;
pub mod pages;
pub mod relay;
pub mod rest;
pub mod state;

pub use gate::require_setup;
pub use relay::relay_handler;
pub use rest::check_config_handler;

use axum::{middleware, routing::{get, post}, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use state::AppState;

/// Builds the application router: relay, config check and pages, all behind
/// the access gate.
pub fn app_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(pages::index_page))
        .route("/login", get(pages::login_page))
        .route("/article/{id}", get(pages::article_page))
        .route("/api/proxy", post(relay_handler))
        .route("/api/check-config", get(check_config_handler))
        .layer(middleware::from_fn(require_setup))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
