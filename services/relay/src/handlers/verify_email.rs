use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::header;
use axum::response::Response;

use crate::codec::{FieldValue, SmartFormPayload};
use crate::error::RelayError;
use crate::handlers::redirect_or_message;
use crate::state::AppState;
use crate::usecase::verify::{VerifyEmailInput, VerifyEmailUseCase};

pub async fn verify_email(
    State(state): State<AppState>,
    req: Request,
) -> Result<Response, RelayError> {
    let payload = payload_from_request(req).await?;

    let usecase = VerifyEmailUseCase {
        storage: state.storage.clone(),
        mailer: state.mailer.clone(),
        config: state.config.clone(),
    };
    let out = usecase.execute(VerifyEmailInput { payload }).await?;

    Ok(redirect_or_message(
        out.redirect,
        "Form ready to submit. Please check your emails for a verification link to submit the form.",
    ))
}

/// Read a form submission out of the request body. Multipart parts carrying a
/// file name or content type become binary fields; everything else is text.
async fn payload_from_request(req: Request) -> Result<SmartFormPayload, RelayError> {
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned();

    let mut payload = SmartFormPayload::new();

    if content_type.starts_with("multipart/form-data") {
        let mut multipart = Multipart::from_request(req, &())
            .await
            .map_err(|e| RelayError::InvalidPayload(e.to_string()))?;
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| RelayError::InvalidPayload(e.to_string()))?
        {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };
            let part_content_type = field.content_type().map(str::to_owned);
            if field.file_name().is_some() || part_content_type.is_some() {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| RelayError::InvalidPayload(e.to_string()))?
                    .to_vec();
                payload.insert(
                    name,
                    FieldValue::Bytes {
                        data,
                        content_type: part_content_type
                            .unwrap_or_else(|| crate::codec::DEFAULT_CONTENT_TYPE.to_owned()),
                    },
                );
            } else {
                let text = field
                    .text()
                    .await
                    .map_err(|e| RelayError::InvalidPayload(e.to_string()))?;
                payload.insert(name, FieldValue::Text(text));
            }
        }
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        let bytes = axum::body::to_bytes(req.into_body(), usize::MAX)
            .await
            .map_err(|e| RelayError::InvalidPayload(e.to_string()))?;
        for (name, value) in url::form_urlencoded::parse(&bytes) {
            payload.insert(name.into_owned(), FieldValue::Text(value.into_owned()));
        }
    } else {
        return Err(RelayError::InvalidPayload(format!(
            "unsupported content type: {content_type:?}"
        )));
    }

    if payload.is_empty() {
        return Err(RelayError::InvalidPayload(
            "empty form submission".to_owned(),
        ));
    }
    Ok(payload)
}
