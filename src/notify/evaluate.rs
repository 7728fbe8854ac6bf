use anyhow::Context;
use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::models::mood_entry::is_low_mood;
use crate::store::Store;

/// Why a well-being alert is warranted for a (user, date) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertReason {
    NoEntryRecorded,
    LowMoodRecorded,
}

impl AlertReason {
    /// Stable key persisted on the notification record.
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertReason::NoEntryRecorded => "no_entry",
            AlertReason::LowMoodRecorded => "low_mood",
        }
    }
}

/// Outcome of checking one user's mood for one reference date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoodCheck {
    /// Entry present with a value above the low threshold — nothing to do.
    Fine,
    Alert {
        reason: AlertReason,
        mood_value: Option<i32>,
    },
}

/// Decide whether (user, reference_date) warrants an alert. Pure read; first
/// match wins: missing entry, then low value, otherwise fine.
///
/// A store failure propagates as an error — it must never be interpreted as
/// "no entry recorded".
pub async fn evaluate(
    store: &dyn Store,
    user_id: Uuid,
    reference_date: NaiveDate,
) -> anyhow::Result<MoodCheck> {
    let entry = store
        .mood_entry_on(user_id, reference_date)
        .await
        .with_context(|| format!("mood evaluation failed for user {}", user_id))?;

    Ok(match entry {
        None => MoodCheck::Alert {
            reason: AlertReason::NoEntryRecorded,
            mood_value: None,
        },
        Some(entry) if is_low_mood(entry.mood_value) => MoodCheck::Alert {
            reason: AlertReason::LowMoodRecorded,
            mood_value: Some(entry.mood_value),
        },
        Some(_) => MoodCheck::Fine,
    })
}
