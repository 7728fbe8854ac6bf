use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::NaiveDate;
use futures_util::{stream, StreamExt};
use serde::Serialize;
use uuid::Uuid;

use crate::email::{Mailer, OutboundEmail};
use crate::store::Store;

use super::evaluate::{evaluate, MoodCheck};
use super::message::render_alert;

/// Tuning for a dispatch run.
#[derive(Debug, Clone)]
pub struct DispatchOptions {
    pub from_email: String,
    /// Bound on concurrent per-user tasks within a batch sweep.
    pub concurrency: usize,
    /// Overall deadline for a batch sweep. In-flight users past it are
    /// abandoned; they show up in the summary as not attempted.
    pub run_timeout: Duration,
}

/// Orchestrates one notification run: evaluate mood, resolve contacts, claim
/// the (user, date) slot, render and dispatch one email per contact.
///
/// Collaborators are injected so tests can substitute in-memory fakes.
pub struct Dispatcher {
    store: Arc<dyn Store>,
    mailer: Arc<dyn Mailer>,
    opts: DispatchOptions,
}

/// Terminal state of one (user, date) evaluation. Partial and failed
/// dispatches are logged for operators but never retried within the run; the
/// next scheduled sweep re-evaluates its own window only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UserOutcome {
    /// Mood was recorded and fine — no alert warranted.
    Quiet,
    /// Alert warranted but the user has no registered contacts.
    NoContacts,
    /// Another run or the other trigger path already claimed this pair.
    Duplicate,
    Sent { emails: usize },
    PartiallySent { sent: usize, failed: usize },
    AllFailed { failed: usize },
    Error { message: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct UserReport {
    pub user_id: Uuid,
    pub outcome: UserOutcome,
}

/// Aggregate result of a batch sweep, returned to the scheduler caller.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub reference_date: NaiveDate,
    pub candidates: usize,
    pub evaluated: usize,
    pub alerts: usize,
    pub users_notified: usize,
    pub emails_sent: usize,
    pub emails_failed: usize,
    pub duplicates: usize,
    pub user_errors: usize,
    /// Users skipped because the run deadline expired first.
    pub not_attempted: Vec<Uuid>,
}

impl RunSummary {
    fn new(reference_date: NaiveDate, candidates: usize) -> Self {
        Self {
            reference_date,
            candidates,
            evaluated: 0,
            alerts: 0,
            users_notified: 0,
            emails_sent: 0,
            emails_failed: 0,
            duplicates: 0,
            user_errors: 0,
            not_attempted: Vec::new(),
        }
    }

    fn absorb(&mut self, outcome: &UserOutcome) {
        match outcome {
            UserOutcome::Quiet => {
                self.evaluated += 1;
            }
            UserOutcome::NoContacts => {
                self.evaluated += 1;
                self.alerts += 1;
            }
            UserOutcome::Duplicate => {
                self.evaluated += 1;
                self.alerts += 1;
                self.duplicates += 1;
            }
            UserOutcome::Sent { emails } => {
                self.evaluated += 1;
                self.alerts += 1;
                self.users_notified += 1;
                self.emails_sent += emails;
            }
            UserOutcome::PartiallySent { sent, failed } => {
                self.evaluated += 1;
                self.alerts += 1;
                self.users_notified += 1;
                self.emails_sent += sent;
                self.emails_failed += failed;
            }
            UserOutcome::AllFailed { failed } => {
                self.evaluated += 1;
                self.alerts += 1;
                self.emails_failed += failed;
            }
            UserOutcome::Error { .. } => {
                self.user_errors += 1;
            }
        }
    }
}

impl Dispatcher {
    pub fn new(store: Arc<dyn Store>, mailer: Arc<dyn Mailer>, opts: DispatchOptions) -> Self {
        Self {
            store,
            mailer,
            opts,
        }
    }

    /// Evaluate every user that owns at least one contact, independently and
    /// with bounded concurrency. Individual failures never abort the run.
    pub async fn run_batch(&self, reference_date: NaiveDate) -> anyhow::Result<RunSummary> {
        let candidates = self
            .store
            .users_with_contacts()
            .await
            .context("failed to enumerate users with registered contacts")?;

        tracing::info!(
            %reference_date,
            candidates = candidates.len(),
            "Mood sweep started"
        );

        let mut summary = RunSummary::new(reference_date, candidates.len());
        let mut processed: HashSet<Uuid> = HashSet::with_capacity(candidates.len());

        {
            let mut tasks = stream::iter(candidates.iter().copied().map(|user_id| async move {
                (user_id, self.process_user(user_id, reference_date).await)
            }))
            .buffer_unordered(self.opts.concurrency.max(1));

            let deadline = tokio::time::sleep(self.opts.run_timeout);
            tokio::pin!(deadline);

            loop {
                tokio::select! {
                    _ = &mut deadline => {
                        tracing::warn!(%reference_date, "Sweep deadline reached — abandoning in-flight users");
                        break;
                    }
                    next = tasks.next() => match next {
                        Some((user_id, outcome)) => {
                            processed.insert(user_id);
                            summary.absorb(&outcome);
                        }
                        None => break,
                    },
                }
            }
        }

        summary.not_attempted = candidates
            .into_iter()
            .filter(|user_id| !processed.contains(user_id))
            .collect();

        if !summary.not_attempted.is_empty() {
            tracing::warn!(
                skipped = summary.not_attempted.len(),
                "Users not attempted before the deadline"
            );
        }

        tracing::info!(
            %reference_date,
            evaluated = summary.evaluated,
            users_notified = summary.users_notified,
            emails_sent = summary.emails_sent,
            emails_failed = summary.emails_failed,
            duplicates = summary.duplicates,
            user_errors = summary.user_errors,
            "Mood sweep finished"
        );

        Ok(summary)
    }

    /// Event-triggered path: same per-user routine as the batch sweep, scoped
    /// to the user and date of a just-written entry.
    pub async fn run_single(&self, user_id: Uuid, reference_date: NaiveDate) -> UserReport {
        let outcome = self.process_user(user_id, reference_date).await;
        UserReport { user_id, outcome }
    }

    async fn process_user(&self, user_id: Uuid, reference_date: NaiveDate) -> UserOutcome {
        match self.notify_user(user_id, reference_date).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(user_id = %user_id, error = %e, "User processing failed");
                UserOutcome::Error {
                    message: e.to_string(),
                }
            }
        }
    }

    async fn notify_user(
        &self,
        user_id: Uuid,
        reference_date: NaiveDate,
    ) -> anyhow::Result<UserOutcome> {
        let identity = self
            .store
            .user_identity(user_id)
            .await?
            .with_context(|| format!("user {} not found in identity store", user_id))?;

        let check = evaluate(self.store.as_ref(), user_id, reference_date).await?;
        let MoodCheck::Alert { reason, mood_value } = check else {
            tracing::debug!(user_id = %user_id, %reference_date, "No alert warranted");
            return Ok(UserOutcome::Quiet);
        };

        let contacts = self.store.contacts_for(user_id).await?;
        if contacts.is_empty() {
            tracing::debug!(user_id = %user_id, "Alert warranted but no contacts registered");
            return Ok(UserOutcome::NoContacts);
        }

        // Claim before dispatching: the (user, date) slot is the idempotency
        // key shared with the other trigger path.
        if !self
            .store
            .claim_notification(user_id, reference_date, reason, mood_value)
            .await?
        {
            tracing::debug!(user_id = %user_id, %reference_date, "Notification already claimed");
            return Ok(UserOutcome::Duplicate);
        }

        let user_name = identity.display_name();
        let mut sent = 0usize;
        let mut failed = 0usize;

        for contact in &contacts {
            let message = render_alert(&contact.name, &user_name, reason, mood_value, reference_date);
            let email = OutboundEmail {
                from: self.opts.from_email.clone(),
                to: contact.email.clone(),
                subject: message.subject,
                html: message.html,
            };

            match self.mailer.send(&email).await {
                Ok(()) => {
                    sent += 1;
                    tracing::info!(
                        user_id = %user_id,
                        contact = %contact.email,
                        reason = reason.as_str(),
                        "Alert email sent"
                    );
                }
                Err(e) => {
                    failed += 1;
                    tracing::error!(
                        user_id = %user_id,
                        contact = %contact.email,
                        error = %e,
                        "Alert email failed"
                    );
                }
            }
        }

        if let Err(e) = self
            .store
            .record_dispatch_outcome(user_id, reference_date, sent as i32, failed as i32)
            .await
        {
            tracing::warn!(user_id = %user_id, error = %e, "Failed to record dispatch outcome");
        }

        Ok(match (sent, failed) {
            (_, 0) => UserOutcome::Sent { emails: sent },
            (0, _) => UserOutcome::AllFailed { failed },
            _ => UserOutcome::PartiallySent { sent, failed },
        })
    }
}
