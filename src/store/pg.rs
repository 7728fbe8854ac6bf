use anyhow::Context;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::family_member::FamilyMember;
use crate::models::mood_entry::MoodEntry;
use crate::models::user::UserIdentity;
use crate::notify::evaluate::AlertReason;

use super::Store;

pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn mood_entry_on(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> anyhow::Result<Option<MoodEntry>> {
        sqlx::query_as::<_, MoodEntry>(
            "SELECT * FROM mood_entries WHERE user_id = $1 AND entry_date = $2",
        )
        .bind(user_id)
        .bind(date)
        .fetch_optional(&self.db)
        .await
        .with_context(|| format!("mood lookup failed for user {} on {}", user_id, date))
    }

    async fn contacts_for(&self, user_id: Uuid) -> anyhow::Result<Vec<FamilyMember>> {
        sqlx::query_as::<_, FamilyMember>(
            "SELECT * FROM family_members WHERE user_id = $1 ORDER BY created_at ASC",
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .with_context(|| format!("contact lookup failed for user {}", user_id))
    }

    async fn users_with_contacts(&self) -> anyhow::Result<Vec<Uuid>> {
        sqlx::query_scalar::<_, Uuid>("SELECT DISTINCT user_id FROM family_members")
            .fetch_all(&self.db)
            .await
            .context("failed to enumerate users with contacts")
    }

    async fn user_identity(&self, user_id: Uuid) -> anyhow::Result<Option<UserIdentity>> {
        sqlx::query_as::<_, UserIdentity>(
            "SELECT id, email, full_name FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .with_context(|| format!("identity lookup failed for user {}", user_id))
    }

    async fn claim_notification(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        reason: AlertReason,
        mood_value: Option<i32>,
    ) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO mood_notifications (id, user_id, entry_date, reason, mood_value)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, entry_date) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(date)
        .bind(reason.as_str())
        .bind(mood_value)
        .execute(&self.db)
        .await
        .with_context(|| format!("failed to claim notification for user {} on {}", user_id, date))?;

        Ok(result.rows_affected() == 1)
    }

    async fn record_dispatch_outcome(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        sent: i32,
        failed: i32,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE mood_notifications
            SET emails_sent = $3,
                emails_failed = $4,
                status = CASE
                    WHEN $3 > 0 AND $4 = 0 THEN 'sent'
                    WHEN $3 > 0 THEN 'partial'
                    ELSE 'failed'
                END
            WHERE user_id = $1 AND entry_date = $2
            "#,
        )
        .bind(user_id)
        .bind(date)
        .bind(sent)
        .bind(failed)
        .execute(&self.db)
        .await
        .with_context(|| format!("failed to record dispatch outcome for user {} on {}", user_id, date))?;

        Ok(())
    }
}
