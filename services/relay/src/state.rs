use std::sync::Arc;

use crate::config::RelayConfig;
use crate::infra::http_relay::HttpFormRelay;
use crate::infra::mailgun::MailgunMailer;
use crate::infra::redis::RedisStorage;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub storage: RedisStorage,
    pub mailer: MailgunMailer,
    pub form_relay: HttpFormRelay,
    pub config: Arc<RelayConfig>,
}
