//! Redemption flow: consume a link token (or verify a signed payload),
//! strip the control fields, and deliver the submission to its destination.

use crate::codec;
use crate::domain::repository::{FormRelay, KeyValueStorage};
use crate::domain::types::{
    EMAIL_FIELD_NAME_FIELD, FORM_KEY_FIELD, SUBMIT_REDIRECT_FIELD,
};
use crate::error::RelayError;
use crate::usecase::{forms, links, signed};

/// One redemption request, already shaped by the deployment's protocol.
pub enum SubmitRequest {
    Token { link_id: String },
    Signed { data: String, hash: String },
}

#[derive(Debug)]
pub struct SubmitFormOutput {
    /// Resolved post-submit redirect target, if any.
    pub redirect: Option<String>,
}

pub struct SubmitFormUseCase<S, R>
where
    S: KeyValueStorage,
    R: FormRelay,
{
    pub storage: S,
    pub relay: R,
    pub secret_signature: String,
}

impl<S, R> SubmitFormUseCase<S, R>
where
    S: KeyValueStorage,
    R: FormRelay,
{
    pub async fn execute(&self, request: SubmitRequest) -> Result<SubmitFormOutput, RelayError> {
        // 1. Recover the pending payload: read it from the link store, or
        //    parse it out of the signed URL (signature checked below, once
        //    the form URL it covers is known).
        let (mut payload, link_id, presigned) = match request {
            SubmitRequest::Token { link_id } => {
                if !links::is_link_valid(&self.storage, &link_id).await? {
                    return Err(RelayError::LinkIdNotFound);
                }
                let payload = links::get_link_form_data(&self.storage, &link_id).await?;
                (payload, Some(link_id), None)
            }
            SubmitRequest::Signed { data, hash } => {
                let value: serde_json::Value = serde_json::from_str(&data)
                    .map_err(|e| RelayError::InvalidPayload(format!("signed data: {e}")))?;
                let payload = codec::decode(&value)?;
                (payload, None, Some((data, hash)))
            }
        };

        // 2. Resolve the destination.
        let form_key = payload
            .text(FORM_KEY_FIELD)
            .ok_or_else(|| RelayError::MissingField(FORM_KEY_FIELD.to_owned()))?
            .to_owned();
        let form_ref = forms::get_form(&self.storage, &form_key).await?;

        // 3. The signature covers the resolved form URL — a payload replayed
        //    against a different form key fails here even if its JSON is intact.
        if let Some((data, hash)) = presigned {
            if !signed::verify(&data, &form_ref.form_url, &self.secret_signature, &hash) {
                return Err(RelayError::InvalidSignature);
            }
        }

        // 4. The submitter's address must still be present in the payload.
        let email_field = form_ref
            .email_field_name
            .clone()
            .or_else(|| payload.text(EMAIL_FIELD_NAME_FIELD).map(str::to_owned))
            .ok_or_else(|| RelayError::MissingField(EMAIL_FIELD_NAME_FIELD.to_owned()))?;
        if payload.text(&email_field).is_none() {
            return Err(RelayError::MissingField(email_field));
        }

        // 5. Resolve the redirect, then strip every control field so the
        //    destination form only sees the submitter's own data.
        let redirect = form_ref
            .redirects
            .as_ref()
            .and_then(|r| r.submit.clone())
            .or_else(|| payload.text(SUBMIT_REDIRECT_FIELD).map(str::to_owned));
        payload.remove(EMAIL_FIELD_NAME_FIELD);
        payload.remove(FORM_KEY_FIELD);
        payload.remove(SUBMIT_REDIRECT_FIELD);

        // 6. Deliver. On failure the link survives, so the submitter can
        //    retry the same URL.
        self.relay.deliver(&form_ref.form_url, &payload).await?;

        // 7. Consume the token. Its outcome does not gate the response: a
        //    lost delete only leaves the entry to lapse via TTL, and a
        //    concurrent redemption racing us reports NotFound here.
        if let Some(id) = link_id {
            if let Err(e) = links::destroy_link(&self.storage, &id).await {
                tracing::warn!(error = %e, "redeemed link not destroyed");
            }
        }

        Ok(SubmitFormOutput { redirect })
    }
}
