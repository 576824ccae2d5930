//! Shared service plumbing for Formgate binaries: health handlers,
//! tracing initialization, and request-id middleware.

pub mod health;
pub mod middleware;
pub mod tracing;
