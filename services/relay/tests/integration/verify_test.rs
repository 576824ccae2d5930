use formgate_relay::codec::{FieldValue, SmartFormPayload};
use formgate_relay::config::RedemptionMode;
use formgate_relay::domain::types::{Redirects, TimeoutReason};
use formgate_relay::error::RelayError;
use formgate_relay::infra::memory::MemoryStorage;
use formgate_relay::usecase::verify::{VerifyEmailInput, VerifyEmailUseCase};
use formgate_relay::usecase::{forms, links, signed, timeouts};

use crate::helpers::{
    MockMailer, TEST_SECRET, contact_payload, test_config, test_form_reference,
};

async fn storage_with_contact_form() -> MemoryStorage {
    let storage = MemoryStorage::new();
    forms::push_form(&storage, "contact", &test_form_reference())
        .await
        .unwrap();
    storage
}

#[tokio::test]
async fn should_provision_a_link_and_send_the_verification_email() {
    let storage = storage_with_contact_form().await;
    let mailer = MockMailer::new();
    let sent = mailer.sent_handle();

    let uc = VerifyEmailUseCase {
        storage: storage.clone(),
        mailer,
        config: test_config(RedemptionMode::Stateful),
    };
    let out = uc
        .execute(VerifyEmailInput {
            payload: contact_payload(),
        })
        .await
        .unwrap();

    assert!(out.redirect.is_none());

    let sent = sent.lock().unwrap();
    assert_eq!(sent.len(), 1, "expected exactly one email");
    let (creds, message) = &sent[0];
    assert_eq!(creds.api_key, "key-default");
    assert_eq!(message.to, "a@b.com");
    assert_eq!(message.subject, "Verify email to submit form");

    // The body carries the redemption link; the provisioned id validates.
    let link = message
        .text
        .split_whitespace()
        .find(|w| w.contains("/submit-form?link_id="))
        .expect("no redemption link in email body");
    let id = link.rsplit_once('=').unwrap().1;
    assert!(links::is_link_valid(&storage, id).await.unwrap());
    assert_eq!(
        links::get_link_form_data(&storage, id).await.unwrap().text("Message"),
        Some("hello there")
    );
}

#[tokio::test]
async fn should_record_a_pending_verification_timeout_after_sending() {
    let storage = storage_with_contact_form().await;

    let uc = VerifyEmailUseCase {
        storage: storage.clone(),
        mailer: MockMailer::new(),
        config: test_config(RedemptionMode::Stateful),
    };
    uc.execute(VerifyEmailInput {
        payload: contact_payload(),
    })
    .await
    .unwrap();

    assert!(
        timeouts::is_email_timed_out(&storage, "a@b.com")
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn should_reject_a_timed_out_email_before_sending() {
    let storage = storage_with_contact_form().await;
    timeouts::timeout_email(&storage, "a@b.com", 600, TimeoutReason::TooManyAttempts)
        .await
        .unwrap();
    let mailer = MockMailer::new();
    let sent = mailer.sent_handle();

    let uc = VerifyEmailUseCase {
        storage,
        mailer,
        config: test_config(RedemptionMode::Stateful),
    };
    let result = uc
        .execute(VerifyEmailInput {
            payload: contact_payload(),
        })
        .await;

    assert!(
        matches!(result, Err(RelayError::EmailTimedOut(ref e)) if e == "a@b.com"),
        "expected EmailTimedOut, got {result:?}"
    );
    assert!(sent.lock().unwrap().is_empty(), "no email should be sent");
}

#[tokio::test]
async fn should_fail_when_the_form_key_is_missing() {
    let storage = storage_with_contact_form().await;
    let mut payload = contact_payload();
    payload.remove("FormKey");

    let uc = VerifyEmailUseCase {
        storage,
        mailer: MockMailer::new(),
        config: test_config(RedemptionMode::Stateful),
    };
    let result = uc.execute(VerifyEmailInput { payload }).await;

    assert!(matches!(result, Err(RelayError::MissingField(ref f)) if f == "FormKey"));
}

#[tokio::test]
async fn should_fail_when_the_form_key_is_unknown() {
    let storage = MemoryStorage::new();

    let uc = VerifyEmailUseCase {
        storage,
        mailer: MockMailer::new(),
        config: test_config(RedemptionMode::Stateful),
    };
    let result = uc
        .execute(VerifyEmailInput {
            payload: contact_payload(),
        })
        .await;

    assert!(matches!(result, Err(RelayError::FormNotFound(ref k)) if k == "contact"));
}

#[tokio::test]
async fn should_fail_when_no_email_field_is_named() {
    let storage = storage_with_contact_form().await;
    let mut payload = contact_payload();
    payload.remove("EmailFieldName");

    let uc = VerifyEmailUseCase {
        storage,
        mailer: MockMailer::new(),
        config: test_config(RedemptionMode::Stateful),
    };
    let result = uc.execute(VerifyEmailInput { payload }).await;

    assert!(matches!(result, Err(RelayError::MissingField(ref f)) if f == "EmailFieldName"));
}

#[tokio::test]
async fn should_surface_a_mailer_failure_without_recording_a_timeout() {
    let storage = storage_with_contact_form().await;

    let uc = VerifyEmailUseCase {
        storage: storage.clone(),
        mailer: MockMailer::failing(500),
        config: test_config(RedemptionMode::Stateful),
    };
    let result = uc
        .execute(VerifyEmailInput {
            payload: contact_payload(),
        })
        .await;

    assert!(matches!(
        result,
        Err(RelayError::EmailSendFailed { status: 500 })
    ));
    // The email was never sent, so the address is not held.
    assert!(
        !timeouts::is_email_timed_out(&storage, "a@b.com")
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn should_apply_form_reference_overrides_to_the_email() {
    let storage = MemoryStorage::new();
    let mut form = test_form_reference();
    form.email_field_name = Some("Email".to_owned());
    form.subject = Some("Confirm your message".to_owned());
    form.msg_text = Some("Click $LINK$ to continue.".to_owned());
    form.redirects = Some(Redirects {
        verify: Some("https://example.com/check-your-email".to_owned()),
        submit: None,
    });
    forms::push_form(&storage, "contact", &form).await.unwrap();

    let mut payload = contact_payload();
    payload.remove("EmailFieldName"); // the reference names the field itself

    let mailer = MockMailer::new();
    let sent = mailer.sent_handle();
    let uc = VerifyEmailUseCase {
        storage,
        mailer,
        config: test_config(RedemptionMode::Stateful),
    };
    let out = uc.execute(VerifyEmailInput { payload }).await.unwrap();

    assert_eq!(
        out.redirect.as_deref(),
        Some("https://example.com/check-your-email")
    );
    let sent = sent.lock().unwrap();
    let (_, message) = &sent[0];
    assert_eq!(message.subject, "Confirm your message");
    assert!(message.text.starts_with("Click https://forms.example.com/submit-form?link_id="));
    assert!(message.text.ends_with(" to continue."));
}

#[tokio::test]
async fn should_strip_the_verify_redirect_from_the_stored_payload() {
    let storage = storage_with_contact_form().await;
    let mut payload = contact_payload();
    payload.insert_text("VerifyRedirectTo", "https://example.com/after-verify");

    let mailer = MockMailer::new();
    let sent = mailer.sent_handle();
    let uc = VerifyEmailUseCase {
        storage: storage.clone(),
        mailer,
        config: test_config(RedemptionMode::Stateful),
    };
    let out = uc.execute(VerifyEmailInput { payload }).await.unwrap();

    assert_eq!(out.redirect.as_deref(), Some("https://example.com/after-verify"));

    let sent = sent.lock().unwrap();
    let (_, message) = &sent[0];
    let link = message
        .text
        .split_whitespace()
        .find(|w| w.contains("link_id="))
        .unwrap();
    let id = link.rsplit_once('=').unwrap().1;
    let stored = links::get_link_form_data(&storage, id).await.unwrap();
    assert!(stored.text("VerifyRedirectTo").is_none());
    assert_eq!(stored.text("Message"), Some("hello there"));
}

#[tokio::test]
async fn signed_mode_embeds_a_verifiable_payload_in_the_link() {
    let storage = storage_with_contact_form().await;
    let mailer = MockMailer::new();
    let sent = mailer.sent_handle();

    let uc = VerifyEmailUseCase {
        storage,
        mailer,
        config: test_config(RedemptionMode::Signed),
    };
    uc.execute(VerifyEmailInput {
        payload: contact_payload(),
    })
    .await
    .unwrap();

    let sent = sent.lock().unwrap();
    let (_, message) = &sent[0];
    let link = message
        .text
        .split_whitespace()
        .find(|w| w.contains("/submit-form?"))
        .expect("no redemption link in email body");

    let url = url::Url::parse(link).unwrap();
    let mut data = None;
    let mut hash = None;
    for (name, value) in url.query_pairs() {
        match name.as_ref() {
            "data" => data = Some(value.into_owned()),
            "hash" => hash = Some(value.into_owned()),
            other => panic!("unexpected query param {other:?}"),
        }
    }
    let (data, hash) = (data.unwrap(), hash.unwrap());
    assert!(signed::verify(
        &data,
        "https://example.com/submit",
        TEST_SECRET,
        &hash
    ));
}

#[tokio::test]
async fn binary_fields_survive_the_link_round_trip() {
    let storage = storage_with_contact_form().await;
    let mut payload = contact_payload();
    payload.insert(
        "Attachment",
        FieldValue::Bytes {
            data: vec![0x00, 0x01, 0xfe, 0xff],
            content_type: "application/pdf".to_owned(),
        },
    );

    let mailer = MockMailer::new();
    let sent = mailer.sent_handle();
    let uc = VerifyEmailUseCase {
        storage: storage.clone(),
        mailer,
        config: test_config(RedemptionMode::Stateful),
    };
    uc.execute(VerifyEmailInput {
        payload: payload.clone(),
    })
    .await
    .unwrap();

    let sent = sent.lock().unwrap();
    let link = sent[0]
        .1
        .text
        .split_whitespace()
        .find(|w| w.contains("link_id="))
        .unwrap();
    let id = link.rsplit_once('=').unwrap().1;

    let mut expected: SmartFormPayload = payload;
    expected.remove("VerifyRedirectTo");
    assert_eq!(
        links::get_link_form_data(&storage, id).await.unwrap(),
        expected
    );
}
