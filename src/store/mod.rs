use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::family_member::FamilyMember;
use crate::models::mood_entry::MoodEntry;
use crate::models::user::UserIdentity;
use crate::notify::evaluate::AlertReason;

pub mod pg;

/// Typed access to the shared relational store, narrowed to exactly the
/// queries the notification pipeline consumes. Implemented by [`pg::PgStore`]
/// in production and by in-memory fakes in tests.
///
/// `Ok(None)` / an empty `Vec` strictly mean "no such row"; infrastructure
/// failures surface as `Err`, so a store outage is never read as a missing
/// mood entry.
#[async_trait]
pub trait Store: Send + Sync {
    async fn mood_entry_on(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> anyhow::Result<Option<MoodEntry>>;

    /// Contacts owned by `user_id` and nobody else. The query is scoped by
    /// the owning user id directly; it never joins through another relation.
    async fn contacts_for(&self, user_id: Uuid) -> anyhow::Result<Vec<FamilyMember>>;

    /// Distinct owners of at least one registered contact — the candidate
    /// universe for a batch sweep.
    async fn users_with_contacts(&self) -> anyhow::Result<Vec<Uuid>>;

    async fn user_identity(&self, user_id: Uuid) -> anyhow::Result<Option<UserIdentity>>;

    /// Claim the (user, date) notification slot. Returns false when the slot
    /// was already claimed by an earlier run or the other trigger path.
    async fn claim_notification(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        reason: AlertReason,
        mood_value: Option<i32>,
    ) -> anyhow::Result<bool>;

    /// Record per-recipient dispatch counts on a previously claimed slot.
    async fn record_dispatch_outcome(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        sent: i32,
        failed: i32,
    ) -> anyhow::Result<()>;
}
