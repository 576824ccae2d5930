use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Relay service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("form not found: {0}")]
    FormNotFound(String),
    #[error("link invalid: unknown, already used, or not yet visible in this region")]
    LinkIdNotFound,
    #[error("link id in use")]
    LinkIdInUse,
    #[error("email timeout shorter than current: {0}")]
    TimeoutShorterThanCurrent(String),
    #[error("email is timed out: {0}")]
    EmailTimedOut(String),
    #[error("missing field: {0}")]
    MissingField(String),
    #[error("invalid field marker: {0}")]
    InvalidFieldMarker(String),
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
    #[error("invalid signature")]
    InvalidSignature,
    #[error("email send failed with status {status}")]
    EmailSendFailed { status: u16 },
    #[error("form relay failed with status {status}")]
    RelayFailed { status: u16 },
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl RelayError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::FormNotFound(_) => "FORM_NOT_FOUND",
            Self::LinkIdNotFound => "LINK_ID_NOT_FOUND",
            Self::LinkIdInUse => "LINK_ID_IN_USE",
            Self::TimeoutShorterThanCurrent(_) => "TIMEOUT_SHORTER_THAN_CURRENT",
            Self::EmailTimedOut(_) => "EMAIL_TIMED_OUT",
            Self::MissingField(_) => "MISSING_FIELD",
            Self::InvalidFieldMarker(_) => "INVALID_FIELD_MARKER",
            Self::InvalidPayload(_) => "INVALID_PAYLOAD",
            Self::InvalidSignature => "INVALID_SIGNATURE",
            Self::EmailSendFailed { .. } => "EMAIL_SEND_FAILED",
            Self::RelayFailed { .. } => "RELAY_FAILED",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::FormNotFound(_) | Self::LinkIdNotFound => StatusCode::NOT_FOUND,
            Self::LinkIdInUse | Self::TimeoutShorterThanCurrent(_) => StatusCode::CONFLICT,
            Self::EmailTimedOut(_) => StatusCode::TOO_MANY_REQUESTS,
            Self::MissingField(_)
            | Self::InvalidFieldMarker(_)
            | Self::InvalidPayload(_)
            | Self::InvalidSignature => StatusCode::BAD_REQUEST,
            Self::EmailSendFailed { .. } | Self::RelayFailed { .. } => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // Log 500s only — tower-http TraceLayer already records method/uri/status for all
        // requests. 4xx are expected client errors; upstream 502s are logged with their
        // collaborator status at the call site. Internal errors need the anyhow chain
        // logged so the root cause is traceable.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %e, kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
