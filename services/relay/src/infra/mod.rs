pub mod http_relay;
pub mod mailgun;
pub mod memory;
pub mod redis;
