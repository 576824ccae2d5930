use std::sync::Arc;

use tracing::info;

use formgate_relay::config::RelayConfig;
use formgate_relay::infra::http_relay::HttpFormRelay;
use formgate_relay::infra::mailgun::MailgunMailer;
use formgate_relay::infra::redis::RedisStorage;
use formgate_relay::router::build_router;
use formgate_relay::state::AppState;

#[tokio::main]
async fn main() {
    formgate_core::tracing::init_tracing();

    let config = RelayConfig::from_env();

    let redis_cfg = deadpool_redis::Config::from_url(&config.redis_url);
    let redis = redis_cfg
        .create_pool(Some(deadpool_redis::Runtime::Tokio1))
        .expect("failed to create Redis pool");

    let http = reqwest::Client::new();

    let addr = format!("0.0.0.0:{}", config.relay_port);
    let state = AppState {
        storage: RedisStorage { pool: redis },
        mailer: MailgunMailer { http: http.clone() },
        form_relay: HttpFormRelay { http },
        config: Arc::new(config),
    };

    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("relay service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
