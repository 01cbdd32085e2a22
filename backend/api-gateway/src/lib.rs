//! API Gateway library
//!
//! Configuration and HTTP endpoints, exposed for integration tests.

pub mod config;
pub mod handlers;

pub use config::Config;
