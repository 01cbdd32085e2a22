//! # Actix Middleware Library
//!
//! HTTP-side authentication middleware for Actix services
//!
//! ## Modules
//! - `auth_gate`: public-path allow-list plus access-token validation
//! - `logging`: request logging with the gate's decision

pub mod auth_gate;
pub mod logging;

pub use auth_gate::{AuthGate, GateOutcome, PublicPaths, DEFAULT_PUBLIC_PATHS};
pub use logging::RequestLogging;
