use formgate_relay::error::RelayError;
use formgate_relay::infra::memory::MemoryStorage;
use formgate_relay::usecase::forms;

use crate::helpers::test_form_reference;

#[tokio::test]
async fn should_return_not_found_for_unknown_key() {
    let storage = MemoryStorage::new();

    let result = forms::get_form(&storage, "nope").await;

    assert!(
        matches!(result, Err(RelayError::FormNotFound(ref key)) if key == "nope"),
        "expected FormNotFound, got {result:?}"
    );
}

#[tokio::test]
async fn should_round_trip_a_pushed_form() {
    let storage = MemoryStorage::new();
    let mut form = test_form_reference();
    form.email_field_name = Some("Email".to_owned());
    form.subject = Some("Please verify".to_owned());

    forms::push_form(&storage, "contact", &form).await.unwrap();
    let loaded = forms::get_form(&storage, "contact").await.unwrap();

    assert_eq!(loaded, form);
}

#[tokio::test]
async fn should_overwrite_on_repeated_push() {
    let storage = MemoryStorage::new();
    let first = test_form_reference();
    let mut second = test_form_reference();
    second.form_url = "https://example.com/v2".to_owned();

    forms::push_form(&storage, "contact", &first).await.unwrap();
    forms::push_form(&storage, "contact", &second)
        .await
        .unwrap();

    let loaded = forms::get_form(&storage, "contact").await.unwrap();
    assert_eq!(loaded.form_url, "https://example.com/v2");
}
