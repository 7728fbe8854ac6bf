use std::sync::Arc;
use std::time::Duration;

use equilibrius_notify::config::Config;
use equilibrius_notify::db;
use equilibrius_notify::email::resend::ResendMailer;
use equilibrius_notify::email::throttle::EmailThrottle;
use equilibrius_notify::email::Mailer;
use equilibrius_notify::notify::dispatcher::{DispatchOptions, Dispatcher};
use equilibrius_notify::store::pg::PgStore;
use equilibrius_notify::store::Store;
use equilibrius_notify::{build_router, AppState};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "equilibrius_notify=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    let config = Arc::new(Config::from_env());

    // Database
    let db = db::create_pool(&config.database_url).await;

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations applied");

    if !config.email_configured() {
        tracing::warn!("RESEND_API_KEY not configured — notification runs will be rejected");
    }
    if config.cron_secret.is_empty() {
        tracing::warn!("CRON_SECRET not configured — the mood sweep endpoint is unauthenticated");
    }

    let store: Arc<dyn Store> = Arc::new(PgStore::new(db.clone()));
    let mailer: Arc<dyn Mailer> = Arc::new(ResendMailer::new(
        config.resend_api_key.clone(),
        EmailThrottle::new(config.email_max_per_minute),
    ));
    let dispatcher = Arc::new(Dispatcher::new(
        store,
        mailer,
        DispatchOptions {
            from_email: config.email_from.clone(),
            concurrency: config.sweep_concurrency,
            run_timeout: Duration::from_secs(config.sweep_timeout_secs),
        },
    ));

    let state = AppState {
        db,
        config: config.clone(),
        dispatcher,
    };

    let app = build_router(state);

    let addr = config.listen_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
