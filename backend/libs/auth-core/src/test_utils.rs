//! Test utilities for token handling
//!
//! Fixed RSA key pairs, a provider pinned to a fixed clock, and an in-memory
//! [`StubAuthProvider`] for tests that exercise adapters rather than
//! cryptography.
//!
//! FOR TESTING ONLY - never load these keys in a deployed service.

use crate::claims::{Claims, Principal, Subject, TokenClass};
use crate::clock::{Clock, FixedClock};
use crate::error::{AuthError, Result};
use crate::keys::KeyStore;
use crate::provider::{AuthProvider, JwtAuthProvider};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

pub const TEST_PRIVATE_KEY_PEM: &str = include_str!("../tests/fixtures/test_private_key.pem");
pub const TEST_PUBLIC_KEY_PEM: &str = include_str!("../tests/fixtures/test_public_key.pem");

/// Second, unrelated pair for wrong-key scenarios
pub const FOREIGN_PRIVATE_KEY_PEM: &str =
    include_str!("../tests/fixtures/foreign_private_key.pem");
pub const FOREIGN_PUBLIC_KEY_PEM: &str = include_str!("../tests/fixtures/foreign_public_key.pem");

/// 2023-11-14T22:13:20Z
pub const TEST_EPOCH: i64 = 1_700_000_000;

/// Issue+verify store built from the primary fixture pair.
pub fn test_key_store() -> Arc<KeyStore> {
    Arc::new(
        KeyStore::from_pem(Some(TEST_PRIVATE_KEY_PEM), Some(TEST_PUBLIC_KEY_PEM))
            .unwrap_or_else(|e| panic!("fixture keys must load: {e}")),
    )
}

/// Verify-only store built from the primary fixture public key.
pub fn test_verify_only_store() -> Arc<KeyStore> {
    Arc::new(
        KeyStore::verify_only(TEST_PUBLIC_KEY_PEM)
            .unwrap_or_else(|e| panic!("fixture key must load: {e}")),
    )
}

/// Real RS256 provider over the fixture keys with a clock the test controls.
pub fn fixed_clock_provider(now: i64) -> (JwtAuthProvider, Arc<FixedClock>) {
    let clock = Arc::new(FixedClock::at(now));
    let provider = JwtAuthProvider::with_clock(test_key_store(), clock.clone(), 0);
    (provider, clock)
}

/// In-memory AuthProvider: tokens are opaque handles into a table, no
/// signing involved. Expiry follows the same `now >= exp` rule as the real
/// codec.
pub struct StubAuthProvider {
    clock: Arc<FixedClock>,
    tokens: Mutex<HashMap<String, Claims>>,
    next_id: AtomicU64,
}

impl StubAuthProvider {
    pub fn new() -> Self {
        Self::at(TEST_EPOCH)
    }

    pub fn at(now: i64) -> Self {
        Self {
            clock: Arc::new(FixedClock::at(now)),
            tokens: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn clock(&self) -> &FixedClock {
        &self.clock
    }

    fn issue(&self, subject: &Subject, class: TokenClass) -> String {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let token = format!("stub-{class}-{id}");
        let claims = Claims::new(subject, class, self.clock.unix_now());
        self.tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(token.clone(), claims);
        token
    }
}

impl Default for StubAuthProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthProvider for StubAuthProvider {
    fn issue_access(&self, subject: &Subject) -> Result<String> {
        Ok(self.issue(subject, TokenClass::Access))
    }

    fn issue_refresh(&self, subject: &Subject) -> Result<String> {
        Ok(self.issue(subject, TokenClass::Refresh))
    }

    fn inspect(&self, token: &str) -> Result<Claims> {
        let claims = self
            .tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidSignature)?;

        if self.clock.unix_now() >= claims.exp {
            return Err(AuthError::TokenExpired);
        }
        Ok(claims)
    }

    fn validate(&self, token: &str, expected: TokenClass) -> Result<Principal> {
        let claims = self.inspect(token)?;
        if claims.token_type != expected {
            return Err(AuthError::WrongTokenClass);
        }
        Ok(claims.principal())
    }
}
