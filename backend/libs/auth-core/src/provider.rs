//! Capability interface shared by every service that touches credentials.

use crate::claims::{Claims, Principal, Subject, TokenClass, TokenPair, ACCESS_TOKEN_TTL_SECS};
use crate::clock::{Clock, SystemClock};
use crate::codec::TokenCodec;
use crate::error::{AuthError, Result};
use crate::issuer::TokenIssuer;
use crate::keys::KeyStore;
use crate::password;
use crate::validator::TokenValidator;
use std::sync::Arc;
use tracing::debug;

/// Token and password operations consumed by gateways, RPC interceptors and
/// business services.
///
/// `JwtAuthProvider` is the production implementation. Tests that exercise
/// adapters can use the in-memory `test_utils::StubAuthProvider` instead.
pub trait AuthProvider: Send + Sync {
    fn issue_access(&self, subject: &Subject) -> Result<String>;

    fn issue_refresh(&self, subject: &Subject) -> Result<String>;

    /// Verify and require `expected` class.
    fn validate(&self, token: &str, expected: TokenClass) -> Result<Principal>;

    /// Verify signature and expiry without a class requirement.
    fn inspect(&self, token: &str) -> Result<Claims>;

    fn issue_pair(&self, subject: &Subject) -> Result<TokenPair> {
        Ok(TokenPair {
            access_token: self.issue_access(subject)?,
            refresh_token: self.issue_refresh(subject)?,
            token_type: "Bearer".to_string(),
            expires_in: ACCESS_TOKEN_TTL_SECS,
        })
    }

    /// Exchange a refresh token for a fresh access token for the same
    /// subject. An access token presented here fails with `WrongTokenClass`.
    fn refresh_access(&self, refresh_token: &str) -> Result<String> {
        let claims = self.inspect(refresh_token)?;
        if claims.token_type != TokenClass::Refresh {
            return Err(AuthError::WrongTokenClass);
        }
        self.issue_access(&claims.subject())
    }

    fn hash_password(&self, password: &str) -> Result<String> {
        password::hash_password(password)
    }

    fn verify_password(&self, password: &str, password_hash: &str) -> bool {
        password::verify_password(password, password_hash)
    }
}

/// RS256-backed provider over an immutable [`KeyStore`].
#[derive(Clone)]
pub struct JwtAuthProvider {
    issuer: TokenIssuer,
    validator: TokenValidator,
}

impl JwtAuthProvider {
    /// System clock, zero clock-skew leeway.
    pub fn new(keys: Arc<KeyStore>) -> Self {
        Self::with_clock(keys, Arc::new(SystemClock), 0)
    }

    pub fn with_clock(keys: Arc<KeyStore>, clock: Arc<dyn Clock>, leeway_secs: u64) -> Self {
        let codec = Arc::new(TokenCodec::new(keys, clock).with_leeway(leeway_secs));
        Self {
            issuer: TokenIssuer::new(codec.clone()),
            validator: TokenValidator::new(codec),
        }
    }

    /// Whether this process holds a signing key.
    pub fn can_issue(&self) -> bool {
        self.issuer.can_issue()
    }

    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    pub fn validator(&self) -> &TokenValidator {
        &self.validator
    }
}

impl AuthProvider for JwtAuthProvider {
    fn issue_access(&self, subject: &Subject) -> Result<String> {
        self.issuer.issue_access(subject)
    }

    fn issue_refresh(&self, subject: &Subject) -> Result<String> {
        self.issuer.issue_refresh(subject)
    }

    fn issue_pair(&self, subject: &Subject) -> Result<TokenPair> {
        self.issuer.issue_pair(subject)
    }

    fn validate(&self, token: &str, expected: TokenClass) -> Result<Principal> {
        let principal = self.validator.validate(token, expected)?;
        debug!(user_id = principal.subject_id, token_class = %expected, "Token validated");
        Ok(principal)
    }

    fn inspect(&self, token: &str) -> Result<Claims> {
        self.validator.inspect(token)
    }

    fn refresh_access(&self, refresh_token: &str) -> Result<String> {
        let claims = self.validator.validate_claims(refresh_token, TokenClass::Refresh)?;
        self.issuer.issue_access(&claims.subject())
    }
}
