use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Connect to the shared relational store. The pool is sized for one service
/// instance handling a request-scoped sweep plus the CRUD surface.
pub async fn create_pool(database_url: &str) -> PgPool {
    PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(database_url)
        .await
        .expect("Failed to create database pool")
}
