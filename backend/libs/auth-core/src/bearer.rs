//! Bearer credential encodings.
//!
//! Two forms exist and they are not interchangeable:
//!
//! - RPC metadata: value must start with the exact prefix `"Bearer "`
//!   ([`strip_bearer_prefix`]); anything else is `NoCredentialPresent`.
//! - HTTP `Authorization` header: split on single spaces into exactly two
//!   parts with scheme `Bearer` ([`extract_from_header`]); anything else is
//!   "no token" and the caller decides how to answer.

use crate::error::{AuthError, Result};

/// Metadata / header key, matched case-insensitively by the transports
pub const AUTHORIZATION: &str = "authorization";
pub const BEARER_SCHEME: &str = "Bearer";
pub const BEARER_PREFIX: &str = "Bearer ";

/// `"Bearer <token>"`
pub fn bearer_value(token: &str) -> String {
    format!("{BEARER_PREFIX}{token}")
}

/// Token from an HTTP `Authorization` header value, or `None`.
pub fn extract_from_header(header_value: &str) -> Option<&str> {
    let mut parts = header_value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(BEARER_SCHEME), Some(token), None) if !token.is_empty() => Some(token),
        _ => None,
    }
}

/// Token from an RPC metadata value carrying `"Bearer <token>"`.
pub fn strip_bearer_prefix(value: &str) -> Result<&str> {
    match value.strip_prefix(BEARER_PREFIX) {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(AuthError::NoCredentialPresent),
    }
}
