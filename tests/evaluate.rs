mod common;

use chrono::NaiveDate;
use uuid::Uuid;

use common::FakeStore;
use equilibrius_notify::notify::evaluate::{evaluate, AlertReason, MoodCheck};

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 14).unwrap()
}

#[tokio::test]
async fn missing_entry_raises_a_no_entry_alert() {
    let user = Uuid::new_v4();
    let store = FakeStore::default().with_user(user, "ana@example.com", None);

    let check = evaluate(&store, user, date()).await.unwrap();
    assert_eq!(
        check,
        MoodCheck::Alert {
            reason: AlertReason::NoEntryRecorded,
            mood_value: None,
        }
    );
}

#[tokio::test]
async fn low_values_raise_a_low_mood_alert_with_the_value() {
    for value in [1, 2] {
        let user = Uuid::new_v4();
        let store = FakeStore::default()
            .with_user(user, "ana@example.com", None)
            .with_mood(user, date(), value);

        let check = evaluate(&store, user, date()).await.unwrap();
        assert_eq!(
            check,
            MoodCheck::Alert {
                reason: AlertReason::LowMoodRecorded,
                mood_value: Some(value),
            }
        );
    }
}

#[tokio::test]
async fn values_above_the_threshold_are_fine() {
    for value in [3, 4, 5] {
        let user = Uuid::new_v4();
        let store = FakeStore::default()
            .with_user(user, "ana@example.com", None)
            .with_mood(user, date(), value);

        let check = evaluate(&store, user, date()).await.unwrap();
        assert_eq!(check, MoodCheck::Fine, "value {} must not alert", value);
    }
}

#[tokio::test]
async fn entries_for_other_dates_do_not_count() {
    let user = Uuid::new_v4();
    let other_day = date().succ_opt().unwrap();
    let store = FakeStore::default()
        .with_user(user, "ana@example.com", None)
        .with_mood(user, other_day, 5);

    let check = evaluate(&store, user, date()).await.unwrap();
    assert!(matches!(
        check,
        MoodCheck::Alert {
            reason: AlertReason::NoEntryRecorded,
            ..
        }
    ));
}

#[tokio::test]
async fn store_failure_is_an_error_not_a_missing_entry() {
    let user = Uuid::new_v4();
    let mut store = FakeStore::default().with_user(user, "ana@example.com", None);
    store.fail_mood_lookup_for.insert(user);

    let result = evaluate(&store, user, date()).await;
    assert!(result.is_err());
}
