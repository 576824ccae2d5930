use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Control fields a submitter includes alongside their real form data. They
// steer the relay and are stripped before the submission reaches the
// destination form.
pub const FORM_KEY_FIELD: &str = "FormKey";
pub const EMAIL_FIELD_NAME_FIELD: &str = "EmailFieldName";
pub const VERIFY_REDIRECT_FIELD: &str = "VerifyRedirectTo";
pub const SUBMIT_REDIRECT_FIELD: &str = "SubmitRedirectTo";

/// Placeholder in message templates substituted with the redemption URL.
pub const LINK_PLACEHOLDER: &str = "$LINK$";

/// Per-form configuration, keyed by an opaque form key. Created out-of-band
/// by the form-tool; read-only on the request path. Every field except
/// `form_url` is optional with a fallback chain of
/// reference → payload → environment → built-in default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormReference {
    /// Absolute URL of the real submission endpoint.
    pub form_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_field_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirects: Option<Redirects>,
    /// Overriding credentials here stores them in the forms partition, whose
    /// confidentiality is not guaranteed. Prefer a separate deployment with
    /// its own process-level credentials for a separate email domain.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mailgun_creds: Option<MailgunCredsOverride>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Plain-text body template; `$LINK$` is substituted at send time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg_text: Option<String>,
    /// HTML body template; `$LINK$` is substituted at send time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg_html: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redirects {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verify: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submit: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailgunCredsOverride {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,
}

/// Why an email address is currently denied new verification emails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeoutReason {
    PendingVerification,
    TooManyAttempts,
    Banned,
}

/// Rate-limit record for one email address. At most one active record per
/// address; `expires` only ever moves later (monotonic extension).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailTimeout {
    pub reason: TimeoutReason,
    pub expires: DateTime<Utc>,
}

/// Resolved Mailgun credentials handed to the mailer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailgunCreds {
    pub api_key: String,
    pub api_base_url: String,
}

/// One outbound verification email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}
