use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::mood_entry::{MoodEntry, MoodEntryQuery, UpsertMoodEntryRequest};
use crate::AppState;

/// One entry per (user, day): a second write for the same date updates the
/// existing row instead of inserting.
pub async fn upsert_mood_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<UpsertMoodEntryRequest>,
) -> AppResult<Json<MoodEntry>> {
    let entry_date = body.entry_date.unwrap_or_else(|| Utc::now().date_naive());

    if !(1..=5).contains(&body.mood_value) {
        return Err(AppError::Validation(
            "Mood value must be between 1 and 5".into(),
        ));
    }

    let entry = sqlx::query_as::<_, MoodEntry>(
        r#"
        INSERT INTO mood_entries (id, user_id, mood_value, entry_date, notes)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (user_id, entry_date) DO UPDATE SET
            mood_value = $3,
            notes = COALESCE($5, mood_entries.notes),
            updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.id)
    .bind(body.mood_value)
    .bind(entry_date)
    .bind(&body.notes)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(entry))
}

pub async fn list_mood_entries(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<MoodEntryQuery>,
) -> AppResult<Json<Vec<MoodEntry>>> {
    let start = query
        .start_date
        .unwrap_or_else(|| Utc::now().date_naive() - chrono::Duration::days(30));
    let end = query.end_date.unwrap_or_else(|| Utc::now().date_naive());

    let entries = sqlx::query_as::<_, MoodEntry>(
        r#"
        SELECT * FROM mood_entries
        WHERE user_id = $1 AND entry_date BETWEEN $2 AND $3
        ORDER BY entry_date DESC
        "#,
    )
    .bind(auth_user.id)
    .bind(start)
    .bind(end)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(entries))
}
