use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::journal_entry::{CreateJournalEntryRequest, JournalEntry, JournalEntryQuery};
use crate::AppState;

pub async fn create_journal_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateJournalEntryRequest>,
) -> AppResult<Json<JournalEntry>> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let entry_date = body.entry_date.unwrap_or_else(|| Utc::now().date_naive());

    let entry = sqlx::query_as::<_, JournalEntry>(
        r#"
        INSERT INTO journal_entries (id, user_id, title, content, entry_date)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.id)
    .bind(body.title.trim())
    .bind(&body.content)
    .bind(entry_date)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(entry))
}

pub async fn list_journal_entries(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<JournalEntryQuery>,
) -> AppResult<Json<Vec<JournalEntry>>> {
    let start = query
        .start_date
        .unwrap_or_else(|| Utc::now().date_naive() - chrono::Duration::days(30));
    let end = query.end_date.unwrap_or_else(|| Utc::now().date_naive());

    let entries = sqlx::query_as::<_, JournalEntry>(
        r#"
        SELECT * FROM journal_entries
        WHERE user_id = $1 AND entry_date BETWEEN $2 AND $3
        ORDER BY entry_date DESC, created_at DESC
        "#,
    )
    .bind(auth_user.id)
    .bind(start)
    .bind(end)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(entries))
}

pub async fn delete_journal_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(entry_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    // Idempotent delete — return 200 even if already gone
    let entry = sqlx::query_as::<_, JournalEntry>(
        "SELECT * FROM journal_entries WHERE id = $1 AND user_id = $2",
    )
    .bind(entry_id)
    .bind(auth_user.id)
    .fetch_optional(&state.db)
    .await?;

    if let Some(entry) = entry {
        sqlx::query("DELETE FROM journal_entries WHERE id = $1")
            .bind(entry.id)
            .execute(&state.db)
            .await?;
    }

    Ok(Json(serde_json::json!({ "deleted": true })))
}
