use axum::{extract::State, http::HeaderMap, Json};
use chrono::{Duration, Utc};

use crate::error::{AppError, AppResult};
use crate::notify::dispatcher::RunSummary;
use crate::AppState;

/// Scheduled sweep entry point. The external scheduler calls this once a day;
/// the reference date is always yesterday (UTC).
pub async fn check_mood(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<RunSummary>> {
    let configured = &state.config.cron_secret;
    if !configured.is_empty() {
        let presented = headers
            .get("x-cron-secret")
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::Unauthorized)?;

        if !constant_time_eq(presented, configured) {
            tracing::warn!("X-Cron-Secret header does not match the configured secret");
            return Err(AppError::Unauthorized);
        }
    } else {
        tracing::warn!("CRON_SECRET not configured — accepting unauthenticated sweep request");
    }

    if !state.config.email_configured() {
        return Err(AppError::Internal(anyhow::anyhow!(
            "RESEND_API_KEY not configured"
        )));
    }

    let reference_date = Utc::now().date_naive() - Duration::days(1);
    tracing::info!(%reference_date, "Daily mood sweep triggered");

    let summary = state.dispatcher.run_batch(reference_date).await?;
    Ok(Json(summary))
}

/// Constant-time comparison so the shared secret check leaks no timing signal.
fn constant_time_eq(a: &str, b: &str) -> bool {
    a.len() == b.len()
        && a.bytes()
            .zip(b.bytes())
            .fold(0u8, |acc, (x, y)| acc | (x ^ y))
            == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_time_eq_matches_equal_strings() {
        assert!(constant_time_eq("topsecret", "topsecret"));
        assert!(constant_time_eq("", ""));
    }

    #[test]
    fn constant_time_eq_rejects_differences() {
        assert!(!constant_time_eq("topsecret", "topsecreT"));
        assert!(!constant_time_eq("topsecret", "topsecret1"));
        assert!(!constant_time_eq("topsecret", ""));
    }
}
