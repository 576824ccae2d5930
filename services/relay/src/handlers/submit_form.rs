use axum::extract::{Query, State};
use axum::response::Response;
use serde::Deserialize;

use crate::config::RedemptionMode;
use crate::error::RelayError;
use crate::handlers::redirect_or_message;
use crate::state::AppState;
use crate::usecase::submit::{SubmitFormUseCase, SubmitRequest};

#[derive(Deserialize)]
pub struct SubmitFormQuery {
    pub link_id: Option<String>,
    pub data: Option<String>,
    pub hash: Option<String>,
}

pub async fn submit_form(
    State(state): State<AppState>,
    Query(query): Query<SubmitFormQuery>,
) -> Result<Response, RelayError> {
    let request = match state.config.link_mode {
        RedemptionMode::Stateful => SubmitRequest::Token {
            link_id: query
                .link_id
                .ok_or_else(|| RelayError::MissingField("link_id".to_owned()))?,
        },
        RedemptionMode::Signed => SubmitRequest::Signed {
            data: query
                .data
                .ok_or_else(|| RelayError::MissingField("data".to_owned()))?,
            hash: query
                .hash
                .ok_or_else(|| RelayError::MissingField("hash".to_owned()))?,
        },
    };

    let usecase = SubmitFormUseCase {
        storage: state.storage.clone(),
        relay: state.form_relay.clone(),
        secret_signature: state.config.secret_signature.clone(),
    };
    let out = usecase.execute(request).await?;

    Ok(redirect_or_message(out.redirect, "Form submitted."))
}
