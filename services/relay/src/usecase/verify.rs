//! Verification-request flow: resolve the form reference, gate on the email
//! timeout guard, provision a redemption link (or sign the payload), send the
//! verification email, and record a pending-verification timeout.

use std::sync::Arc;

use anyhow::Context as _;
use chrono::{Duration, Utc};
use url::Url;

use crate::codec::{self, SmartFormPayload};
use crate::config::{RedemptionMode, RelayConfig};
use crate::domain::repository::{KeyValueStorage, Mailer};
use crate::domain::types::{
    EMAIL_FIELD_NAME_FIELD, EmailMessage, FORM_KEY_FIELD, FormReference, LINK_PLACEHOLDER,
    MailgunCreds, TimeoutReason, VERIFY_REDIRECT_FIELD,
};
use crate::error::RelayError;
use crate::usecase::{forms, links, signed, timeouts};

const DEFAULT_SUBJECT: &str = "Verify email to submit form";

const DEFAULT_TEXT: &str = "Hello! This email was entered into a form, which requires validation before submission.\n\
Please click the link below to validate your email address and submit the form.\n\
\n\
$LINK$\n\
\n\
If you did not enter your email into a form, please ignore this email. Thank you!";

const DEFAULT_HTML: &str = "<h1>Please verify your email</h1>\n\
<p>Hello! This email was entered into a form, which requires validation before submission.</p>\n\
<p>Please click the link below to validate your email address and submit the form.</p>\n\
<p><a href=\"$LINK$\">$LINK$</a></p>\n\
<p>If you did not enter your email into a form, please ignore this email. Thank you!</p>";

pub struct VerifyEmailInput {
    pub payload: SmartFormPayload,
}

#[derive(Debug)]
pub struct VerifyEmailOutput {
    /// Resolved post-verify redirect target, if any.
    pub redirect: Option<String>,
}

pub struct VerifyEmailUseCase<S, M>
where
    S: KeyValueStorage,
    M: Mailer,
{
    pub storage: S,
    pub mailer: M,
    pub config: Arc<RelayConfig>,
}

impl<S, M> VerifyEmailUseCase<S, M>
where
    S: KeyValueStorage,
    M: Mailer,
{
    pub async fn execute(&self, input: VerifyEmailInput) -> Result<VerifyEmailOutput, RelayError> {
        let mut payload = input.payload;

        // 1. Resolve the form reference from the submitted form key.
        let form_key = payload
            .text(FORM_KEY_FIELD)
            .ok_or_else(|| RelayError::MissingField(FORM_KEY_FIELD.to_owned()))?
            .to_owned();
        let form_ref = forms::get_form(&self.storage, &form_key).await?;

        // 2. Resolve the submitter's address (reference overrides payload).
        let email_field = form_ref
            .email_field_name
            .clone()
            .or_else(|| payload.text(EMAIL_FIELD_NAME_FIELD).map(str::to_owned))
            .ok_or_else(|| RelayError::MissingField(EMAIL_FIELD_NAME_FIELD.to_owned()))?;
        let to = payload
            .text(&email_field)
            .ok_or_else(|| RelayError::MissingField(email_field.clone()))?
            .to_owned();

        // 3. Gate on the timeout guard before doing any work for this address.
        if timeouts::is_email_timed_out(&self.storage, &to).await? {
            return Err(RelayError::EmailTimedOut(to));
        }

        // 4. Resolve the redirect and strip it from the relayed payload.
        let redirect = form_ref
            .redirects
            .as_ref()
            .and_then(|r| r.verify.clone())
            .or_else(|| payload.text(VERIFY_REDIRECT_FIELD).map(str::to_owned));
        payload.remove(VERIFY_REDIRECT_FIELD);

        // 5. Build the redemption URL for the configured protocol.
        let submit_url = match self.config.link_mode {
            RedemptionMode::Stateful => {
                let expires_at = self
                    .config
                    .link_ttl_secs
                    .map(|secs| Utc::now() + Duration::seconds(secs));
                let id = links::provision_link(&self.storage, &payload, expires_at).await?;
                token_submit_url(&self.config.public_base_url, &id)?
            }
            RedemptionMode::Signed => {
                let data = serde_json::to_string(&codec::encode(&payload))
                    .context("serialize signed payload")?;
                let hash = signed::sign(&data, &form_ref.form_url, &self.config.secret_signature);
                signed_submit_url(&self.config.public_base_url, &data, &hash)?
            }
        };

        // 6. Send the verification email with per-form overrides applied.
        let creds = resolve_creds(&form_ref, &self.config);
        let message = build_message(&form_ref, &self.config.from_address, &to, &submit_url);
        self.mailer.send(&creds, &message).await?;

        // 7. Hold the address until the pending verification resolves or
        //    lapses. A conflict here means a concurrent request already
        //    extended the timeout further — the guard did its job.
        if let Err(e) = timeouts::timeout_email(
            &self.storage,
            &to,
            self.config.email_timeout_secs,
            TimeoutReason::PendingVerification,
        )
        .await
        {
            tracing::warn!(error = %e, email = %to, "pending-verification timeout not recorded");
        }

        Ok(VerifyEmailOutput { redirect })
    }
}

fn token_submit_url(public_base_url: &str, link_id: &str) -> Result<String, RelayError> {
    let mut url = Url::parse(public_base_url).context("PUBLIC_BASE_URL is not a valid URL")?;
    url.set_path("/submit-form");
    url.query_pairs_mut().clear().append_pair("link_id", link_id);
    Ok(url.to_string())
}

fn signed_submit_url(public_base_url: &str, data: &str, hash: &str) -> Result<String, RelayError> {
    let mut url = Url::parse(public_base_url).context("PUBLIC_BASE_URL is not a valid URL")?;
    url.set_path("/submit-form");
    url.query_pairs_mut()
        .clear()
        .append_pair("data", data)
        .append_pair("hash", hash);
    Ok(url.to_string())
}

fn resolve_creds(form_ref: &FormReference, config: &RelayConfig) -> MailgunCreds {
    let overrides = form_ref.mailgun_creds.as_ref();
    MailgunCreds {
        api_key: overrides
            .and_then(|c| c.api_key.clone())
            .unwrap_or_else(|| config.mailgun_api_key.clone()),
        api_base_url: overrides
            .and_then(|c| c.api_base_url.clone())
            .unwrap_or_else(|| config.mailgun_api_base_url.clone()),
    }
}

fn build_message(
    form_ref: &FormReference,
    default_from: &str,
    to: &str,
    submit_url: &str,
) -> EmailMessage {
    let text = form_ref.msg_text.as_deref().unwrap_or(DEFAULT_TEXT);
    let html = form_ref.msg_html.as_deref().unwrap_or(DEFAULT_HTML);
    EmailMessage {
        from: form_ref
            .from_address
            .clone()
            .unwrap_or_else(|| default_from.to_owned()),
        to: to.to_owned(),
        subject: form_ref
            .subject
            .clone()
            .unwrap_or_else(|| DEFAULT_SUBJECT.to_owned()),
        text: text.replace(LINK_PLACEHOLDER, submit_url),
        html: html.replace(LINK_PLACEHOLDER, submit_url),
    }
}
