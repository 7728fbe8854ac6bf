use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod config;
pub mod db;
pub mod email;
pub mod error;
pub mod handlers;
pub mod models;
pub mod notify;
pub mod store;

use config::Config;
use notify::dispatcher::Dispatcher;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
    pub dispatcher: Arc<Dispatcher>,
}

pub fn build_router(state: AppState) -> Router {
    // Trigger adapters authenticate via cron secret / payload shape, never via
    // user bearer tokens, so they sit outside the auth middleware.
    let hook_routes = Router::new()
        .route("/hooks/check-mood", post(handlers::cron::check_mood))
        .route(
            "/hooks/mood-entry-insert",
            post(handlers::mood_webhook::mood_entry_insert),
        );

    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/readyz", get(handlers::health::readyz))
        .merge(hook_routes);

    let protected_routes = Router::new()
        // Mood entries
        .route(
            "/api/mood-entries",
            post(handlers::mood_entries::upsert_mood_entry),
        )
        .route(
            "/api/mood-entries",
            get(handlers::mood_entries::list_mood_entries),
        )
        // Family members (support contacts)
        .route(
            "/api/family-members",
            get(handlers::family_members::list_family_members),
        )
        .route(
            "/api/family-members",
            post(handlers::family_members::create_family_member),
        )
        .route(
            "/api/family-members/:id",
            delete(handlers::family_members::delete_family_member),
        )
        // Journal
        .route(
            "/api/journal-entries",
            post(handlers::journal_entries::create_journal_entry),
        )
        .route(
            "/api/journal-entries",
            get(handlers::journal_entries::list_journal_entries),
        )
        .route(
            "/api/journal-entries/:id",
            delete(handlers::journal_entries::delete_journal_entry),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::middleware::require_auth,
        ));

    let allowed_origins: Vec<axum::http::HeaderValue> = state
        .config
        .cors_origins()
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
        ])
        .allow_credentials(true);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
