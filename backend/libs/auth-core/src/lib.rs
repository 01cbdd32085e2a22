//! Token-based authentication core
//!
//! Stateless bearer credentials for the gateway and every backend service:
//! RS256-signed tokens carrying a subject id and a token class, plus Argon2id
//! password hashing.
//!
//! ## Core Components
//!
//! - **KeyStore**: RSA key pair loaded once at startup, shared read-only
//! - **TokenCodec**: sign/verify with the RS256/RS384/RS512 allow-list and expiry check
//! - **TokenIssuer**: access (1 hour) and refresh (7 days) tokens for a subject
//! - **TokenValidator**: verification plus token-class enforcement
//! - **AuthProvider**: the capability interface services depend on
//! - **bearer**: `Authorization: Bearer <token>` encodings for HTTP and RPC
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use auth_core::{AuthProvider, JwtAuthProvider, KeySettings, Subject, TokenClass};
//! use std::sync::Arc;
//!
//! # fn example() -> anyhow::Result<()> {
//! let keys = KeySettings::from_env()?.load()?;
//! let provider = JwtAuthProvider::new(Arc::new(keys));
//!
//! let pair = provider.issue_pair(&Subject::new(42).with_login("alice"))?;
//! let principal = provider.validate(&pair.access_token, TokenClass::Access)?;
//! assert_eq!(principal.subject_id, 42);
//! # Ok(())
//! # }
//! ```
//!
//! ## Security Guarantees
//!
//! - Verification never consults server-side state; only the key, the clock
//!   and the token bytes decide the outcome
//! - A refresh token is never accepted where an access token is required,
//!   and vice versa
//! - Credential failures carry a precise [`AuthError`] for logs; transports
//!   collapse them into one generic "unauthorized" answer

pub mod bearer;
pub mod claims;
pub mod clock;
pub mod codec;
pub mod config;
pub mod error;
pub mod issuer;
pub mod keys;
pub mod password;
pub mod provider;
pub mod validator;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use claims::{
    Claims, Principal, Subject, TokenClass, TokenPair, ACCESS_TOKEN_TTL_SECS,
    REFRESH_TOKEN_TTL_SECS,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use codec::TokenCodec;
pub use config::{KeySettings, KeySource};
pub use error::{AuthError, Result};
pub use issuer::TokenIssuer;
pub use keys::KeyStore;
pub use password::{hash_password, verify_password};
pub use provider::{AuthProvider, JwtAuthProvider};
pub use validator::TokenValidator;
