//! Compact signed token encoding (JWT, RS256).
//!
//! ## Security Design
//!
//! - **RSA only**: the header algorithm must be RS256, RS384 or RS512; any
//!   other algorithm (PSS padding included) is rejected before the signature is considered, so a
//!   token "signed" with the public key as an HMAC secret never validates.
//! - **Strict expiry**: `now >= exp + leeway` is expired. The leeway
//!   defaults to zero.
//! - **No class policy here**: a verified token's claims are returned as-is;
//!   [`TokenValidator`](crate::validator::TokenValidator) enforces the class.

use crate::claims::Claims;
use crate::clock::Clock;
use crate::error::{AuthError, Result};
use crate::keys::{KeyStore, ACCEPTED_ALGORITHMS, SIGNING_ALGORITHM};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::{decode, decode_header, encode, Header, Validation};
use std::sync::Arc;

pub struct TokenCodec {
    keys: Arc<KeyStore>,
    clock: Arc<dyn Clock>,
    leeway_secs: i64,
}

impl TokenCodec {
    pub fn new(keys: Arc<KeyStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            keys,
            clock,
            leeway_secs: 0,
        }
    }

    /// Clock-skew tolerance applied to the expiry check.
    pub fn with_leeway(mut self, leeway_secs: u64) -> Self {
        self.leeway_secs = i64::try_from(leeway_secs).unwrap_or(i64::MAX);
        self
    }

    pub fn keys(&self) -> &KeyStore {
        &self.keys
    }

    pub fn now(&self) -> i64 {
        self.clock.unix_now()
    }

    /// Sign `claims` with the private key.
    ///
    /// ## Errors
    ///
    /// - `SigningKeyMissing` on a verify-only store
    /// - `MalformedToken` if `claims.exp <= claims.iat`
    pub fn sign(&self, claims: &Claims) -> Result<String> {
        let key = self.keys.signing_key()?;

        if !claims.is_well_formed() {
            return Err(AuthError::MalformedToken);
        }

        encode(&Header::new(SIGNING_ALGORITHM), claims, key).map_err(AuthError::from)
    }

    /// Verify signature and expiry and return the decoded claims.
    ///
    /// ## Errors
    ///
    /// - `VerifyKeyMissing` if no public key is configured
    /// - `MalformedToken` if the header or payload segment cannot be parsed
    /// - `InvalidSignature` if the signature does not check out or the
    ///   header names an algorithm outside RS256/RS384/RS512
    /// - `TokenExpired` once `now >= exp + leeway`
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let key = self.keys.verifying_key()?;

        // Anything wrong before the signature segment is a structural fault.
        let claims = parse_unverified(token)?;

        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.algorithms = ACCEPTED_ALGORITHMS.to_vec();
        // Expiry is checked below against the injected clock.
        validation.validate_exp = false;

        decode::<Claims>(token, key, &validation).map_err(|e| match AuthError::from(e) {
            // Header and payload already parsed, so only the signature can be at fault.
            AuthError::MalformedToken => AuthError::InvalidSignature,
            other => other,
        })?;

        if self.now() >= claims.exp.saturating_add(self.leeway_secs) {
            return Err(AuthError::TokenExpired);
        }

        Ok(claims)
    }
}

/// Split into header/payload/signature and decode the first two without
/// checking the signature.
fn parse_unverified(token: &str) -> Result<Claims> {
    let mut segments = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(AuthError::MalformedToken);
    };

    decode_header(token).map_err(|_| AuthError::MalformedToken)?;

    let payload = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| AuthError::MalformedToken)?;

    serde_json::from_slice::<Claims>(&payload).map_err(|_| AuthError::MalformedToken)
}
