use chrono::{Duration, Utc};

use formgate_relay::domain::types::{EmailTimeout, TimeoutReason};
use formgate_relay::error::RelayError;
use formgate_relay::infra::memory::MemoryStorage;
use formgate_relay::usecase::timeouts;

const EMAIL: &str = "a@b.com";

fn timeout_in(secs: i64, reason: TimeoutReason) -> EmailTimeout {
    EmailTimeout {
        reason,
        expires: Utc::now() + Duration::seconds(secs),
    }
}

#[tokio::test]
async fn unknown_email_is_not_timed_out() {
    let storage = MemoryStorage::new();
    assert!(!timeouts::is_email_timed_out(&storage, EMAIL).await.unwrap());
}

#[tokio::test]
async fn should_reject_a_shorter_timeout_and_keep_the_longer() {
    let storage = MemoryStorage::new();
    let longer = timeout_in(600, TimeoutReason::Banned);
    let shorter = timeout_in(60, TimeoutReason::PendingVerification);

    timeouts::push_email_timeout(&storage, EMAIL, longer)
        .await
        .unwrap();
    let result = timeouts::push_email_timeout(&storage, EMAIL, shorter).await;

    assert!(
        matches!(result, Err(RelayError::TimeoutShorterThanCurrent(ref e)) if e == EMAIL),
        "expected TimeoutShorterThanCurrent, got {result:?}"
    );
    // The longer record is still in effect.
    assert!(timeouts::is_email_timed_out(&storage, EMAIL).await.unwrap());
}

#[tokio::test]
async fn should_accept_a_longer_timeout_over_a_shorter_one() {
    let storage = MemoryStorage::new();
    let shorter = timeout_in(60, TimeoutReason::PendingVerification);
    let longer = timeout_in(600, TimeoutReason::TooManyAttempts);

    timeouts::push_email_timeout(&storage, EMAIL, shorter)
        .await
        .unwrap();
    timeouts::push_email_timeout(&storage, EMAIL, longer)
        .await
        .unwrap();

    assert!(timeouts::is_email_timed_out(&storage, EMAIL).await.unwrap());
}

#[tokio::test]
async fn expired_record_reads_as_not_timed_out() {
    let storage = MemoryStorage::new();
    let expired = timeout_in(-10, TimeoutReason::PendingVerification);

    timeouts::push_email_timeout(&storage, EMAIL, expired)
        .await
        .unwrap();

    assert!(!timeouts::is_email_timed_out(&storage, EMAIL).await.unwrap());
}

#[tokio::test]
async fn an_expired_record_can_be_replaced() {
    let storage = MemoryStorage::new();
    let expired = timeout_in(-10, TimeoutReason::PendingVerification);
    timeouts::push_email_timeout(&storage, EMAIL, expired)
        .await
        .unwrap();

    // The fresh timeout expires later than the stored one, so it extends.
    timeouts::timeout_email(&storage, EMAIL, 300, TimeoutReason::PendingVerification)
        .await
        .unwrap();

    assert!(timeouts::is_email_timed_out(&storage, EMAIL).await.unwrap());
}

#[tokio::test]
async fn timeout_email_composes_duration_from_now() {
    let storage = MemoryStorage::new();

    timeouts::timeout_email(&storage, EMAIL, 120, TimeoutReason::TooManyAttempts)
        .await
        .unwrap();

    assert!(timeouts::is_email_timed_out(&storage, EMAIL).await.unwrap());
    // Pushing an even longer timeout still succeeds — extension is monotonic.
    timeouts::timeout_email(&storage, EMAIL, 240, TimeoutReason::Banned)
        .await
        .unwrap();
}
