use anyhow::Context as _;

use crate::codec::{FieldValue, SmartFormPayload};
use crate::domain::repository::FormRelay;
use crate::error::RelayError;

/// Delivers a verified submission to its destination endpoint. Submissions
/// carrying binary fields go out as multipart/form-data so content types
/// survive; text-only submissions go out form-urlencoded.
#[derive(Clone)]
pub struct HttpFormRelay {
    pub http: reqwest::Client,
}

impl FormRelay for HttpFormRelay {
    async fn deliver(&self, form_url: &str, payload: &SmartFormPayload) -> Result<(), RelayError> {
        let request = self.http.post(form_url);

        let response = if payload.has_binary() {
            let mut form = reqwest::multipart::Form::new();
            for (name, value) in payload.iter() {
                form = match value {
                    FieldValue::Text(text) => form.text(name.clone(), text.clone()),
                    FieldValue::Bytes { data, content_type } => {
                        let part = reqwest::multipart::Part::bytes(data.clone())
                            .mime_str(content_type)
                            .with_context(|| format!("blob content type for field {name:?}"))?;
                        form.part(name.clone(), part)
                    }
                };
            }
            request.multipart(form).send().await
        } else {
            let pairs: Vec<(&str, &str)> = payload
                .iter()
                .filter_map(|(name, value)| match value {
                    FieldValue::Text(text) => Some((name.as_str(), text.as_str())),
                    FieldValue::Bytes { .. } => None,
                })
                .collect();
            request.form(&pairs).send().await
        }
        .context("post form submission")?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(
                status = status.as_u16(),
                form_url,
                "destination form rejected the submission"
            );
            return Err(RelayError::RelayFailed {
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}
