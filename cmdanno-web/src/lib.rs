//! cmdanno-web library - annotation collection service
//!
//! Serves the annotator-facing pages (login, utility panel, URL panel,
//! collection page) and the JSON API for all mutating actions.

use axum::Router;
use cmdanno_common::config::AppConfig;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod grouping;
pub mod import;
pub mod navigation;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Service configuration (exclusion lists, viewer prefix, bind address)
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, config: AppConfig) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }
}

/// Build application router
///
/// Every route except the login page, register/login, and the health
/// endpoint requires the access-code cookie; the `Annotator` extractor in
/// protected handlers falls back to rendering the login page when the
/// cookie is missing.
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        // Public: login view, registration, health
        .route("/", get(api::pages::login_page))
        .route("/register", get(api::identity::register_user))
        .route("/login", get(api::identity::user_login))
        .merge(api::health::health_routes())
        // Protected: pages
        .route("/utility_panel", get(api::pages::utility_panel))
        .route("/url_panel", get(api::pages::url_panel))
        .route("/collect_page", get(api::pages::collect_page))
        // Protected: JSON actions
        .route("/logout", get(api::identity::user_logout))
        .route("/submit_annotation", get(api::annotations::submit_annotation))
        .route("/submit_edit", get(api::annotations::submit_edit))
        .route("/delete_annotation", get(api::annotations::delete_annotation))
        .route("/update_progress", get(api::progress::update_progress))
        .route("/previous_url", get(api::navigation::previous_url))
        .route("/next_url", get(api::navigation::next_url))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
