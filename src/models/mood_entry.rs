use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Highest recorded value that still counts as "low" for alerting purposes.
pub const LOW_MOOD_MAX: i32 = 2;

/// Whether a recorded value warrants a well-being alert. Shared by the daily
/// sweep and the insert webhook so the two trigger paths cannot diverge.
pub fn is_low_mood(value: i32) -> bool {
    (1..=LOW_MOOD_MAX).contains(&value)
}

/// One user's mood for one calendar day. The (user_id, entry_date) pair is
/// unique; writes go through an upsert.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MoodEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub mood_value: i32,
    pub entry_date: NaiveDate,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct UpsertMoodEntryRequest {
    pub entry_date: Option<NaiveDate>,
    pub mood_value: i32,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MoodEntryQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_mood_covers_one_and_two_only() {
        assert!(is_low_mood(1));
        assert!(is_low_mood(2));
        assert!(!is_low_mood(3));
        assert!(!is_low_mood(4));
        assert!(!is_low_mood(5));
    }

    #[test]
    fn out_of_scale_values_are_not_low() {
        assert!(!is_low_mood(0));
        assert!(!is_low_mood(-1));
        assert!(!is_low_mood(6));
    }
}
