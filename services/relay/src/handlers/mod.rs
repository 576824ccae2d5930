pub mod submit_form;
pub mod verify_email;

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};

/// 302 to the resolved redirect when one exists, plain 200 otherwise.
fn redirect_or_message(redirect: Option<String>, message: &'static str) -> Response {
    match redirect {
        Some(url) => (StatusCode::FOUND, [(header::LOCATION, url)], message).into_response(),
        None => (StatusCode::OK, message).into_response(),
    }
}
