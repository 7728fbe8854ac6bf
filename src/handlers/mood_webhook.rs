use axum::{body::Bytes, extract::State, Json};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::mood_entry::is_low_mood;
use crate::AppState;

/// Change-capture payload posted by the data store when a row is written.
/// Anything that is not an insert into mood_entries is acknowledged and
/// ignored.
#[derive(Debug, Deserialize)]
pub struct ChangePayload {
    #[serde(rename = "type")]
    pub event_type: String,
    pub table: String,
    pub record: Option<MoodEntryRecord>,
}

#[derive(Debug, Deserialize)]
pub struct MoodEntryRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub mood_value: i32,
    pub entry_date: NaiveDate,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Event-triggered path: alerts contacts right after a low mood is written,
/// applying the exact same threshold as the daily sweep.
pub async fn mood_entry_insert(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<Value>> {
    let payload: ChangePayload = serde_json::from_slice(&body)
        .map_err(|e| AppError::Validation(format!("Invalid webhook payload: {}", e)))?;

    if payload.event_type != "INSERT" || payload.table != "mood_entries" {
        return Ok(Json(json!({ "handled": false, "reason": "event ignored" })));
    }

    let record = payload
        .record
        .ok_or_else(|| AppError::Validation("Missing record in webhook payload".into()))?;

    // Cheap pre-filter: a value above the threshold never alerts, so skip the
    // store entirely.
    if !is_low_mood(record.mood_value) {
        return Ok(Json(json!({ "handled": false, "reason": "mood not low" })));
    }

    if !state.config.email_configured() {
        return Err(AppError::Internal(anyhow::anyhow!(
            "RESEND_API_KEY not configured"
        )));
    }

    tracing::info!(
        user_id = %record.user_id,
        mood_value = record.mood_value,
        entry_date = %record.entry_date,
        "Low mood insert received"
    );

    let report = state
        .dispatcher
        .run_single(record.user_id, record.entry_date)
        .await;

    Ok(Json(json!({ "handled": true, "report": report })))
}
