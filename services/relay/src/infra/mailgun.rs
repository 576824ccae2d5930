use anyhow::Context as _;

use crate::domain::repository::Mailer;
use crate::domain::types::{EmailMessage, MailgunCreds};
use crate::error::RelayError;

/// Mailgun messages API client. Sends one form-urlencoded POST per message
/// with `api:{key}` basic auth; any non-2xx answer is a definitive failure.
#[derive(Clone)]
pub struct MailgunMailer {
    pub http: reqwest::Client,
}

impl Mailer for MailgunMailer {
    async fn send(&self, creds: &MailgunCreds, message: &EmailMessage) -> Result<(), RelayError> {
        let response = self
            .http
            .post(format!("{}/messages", creds.api_base_url))
            .basic_auth("api", Some(&creds.api_key))
            .form(&[
                ("from", message.from.as_str()),
                ("to", message.to.as_str()),
                ("subject", message.subject.as_str()),
                ("text", message.text.as_str()),
                ("html", message.html.as_str()),
            ])
            .send()
            .await
            .context("send mailgun request")?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "mailgun rejected the message");
            return Err(RelayError::EmailSendFailed {
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}
