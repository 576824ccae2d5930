/// Which redemption protocol this deployment runs. Chosen at startup, never
/// negotiated per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedemptionMode {
    /// Server-side single-use token carrying the payload (default).
    Stateful,
    /// Payload and signature embedded in the redemption URL; no storage,
    /// no single-use guarantee.
    Signed,
}

/// Relay service configuration loaded from environment variables.
#[derive(Debug)]
pub struct RelayConfig {
    /// Redis connection URL.
    pub redis_url: String,
    /// Public base URL of this service, used to build redemption links
    /// (e.g. "https://forms.example.com").
    pub public_base_url: String,
    /// Process-level Mailgun API key (per-form references may override).
    pub mailgun_api_key: String,
    /// Process-level Mailgun API base URL
    /// (e.g. "https://api.mailgun.net/v3/mg.example.com").
    pub mailgun_api_base_url: String,
    /// Default From address for verification emails.
    pub from_address: String,
    /// Server-wide secret for the signed redemption protocol.
    pub secret_signature: String,
    /// Redemption protocol. Env var: `LINK_MODE` ("stateful" or "signed").
    pub link_mode: RedemptionMode,
    /// Link lifetime in seconds; unset means links never expire.
    /// Env var: `LINK_TTL_SECS`.
    pub link_ttl_secs: Option<i64>,
    /// Pending-verification timeout applied to an address after a
    /// verification email is sent (default 300). Env var: `EMAIL_TIMEOUT_SECS`.
    pub email_timeout_secs: i64,
    /// TCP port to listen on (default 3114). Env var: `RELAY_PORT`.
    pub relay_port: u16,
}

impl RelayConfig {
    pub fn from_env() -> Self {
        Self {
            redis_url: std::env::var("REDIS_URL").expect("REDIS_URL"),
            public_base_url: std::env::var("PUBLIC_BASE_URL").expect("PUBLIC_BASE_URL"),
            mailgun_api_key: std::env::var("MAILGUN_API_KEY").expect("MAILGUN_API_KEY"),
            mailgun_api_base_url: std::env::var("MAILGUN_API_BASE_URL")
                .expect("MAILGUN_API_BASE_URL"),
            from_address: std::env::var("FROM_ADDRESS").expect("FROM_ADDRESS"),
            secret_signature: std::env::var("SECRET_SIGNATURE").expect("SECRET_SIGNATURE"),
            link_mode: match std::env::var("LINK_MODE").as_deref() {
                Err(_) | Ok("stateful") => RedemptionMode::Stateful,
                Ok("signed") => RedemptionMode::Signed,
                Ok(other) => panic!("LINK_MODE must be \"stateful\" or \"signed\", got {other:?}"),
            },
            link_ttl_secs: std::env::var("LINK_TTL_SECS")
                .ok()
                .map(|v| v.parse().expect("LINK_TTL_SECS")),
            email_timeout_secs: std::env::var("EMAIL_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(300),
            relay_port: std::env::var("RELAY_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3114),
        }
    }
}
