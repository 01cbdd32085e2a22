use crate::claims::{Claims, Principal, TokenClass};
use crate::codec::TokenCodec;
use crate::error::{AuthError, Result};
use std::sync::Arc;

/// Verifies tokens and enforces that they were issued for the purpose they
/// are presented for.
#[derive(Clone)]
pub struct TokenValidator {
    codec: Arc<TokenCodec>,
}

impl TokenValidator {
    pub fn new(codec: Arc<TokenCodec>) -> Self {
        Self { codec }
    }

    /// Verify `token` and require `expected` class.
    ///
    /// A class mismatch is reported as `WrongTokenClass`, never folded into
    /// a signature failure.
    pub fn validate(&self, token: &str, expected: TokenClass) -> Result<Principal> {
        self.validate_claims(token, expected).map(|claims| claims.principal())
    }

    /// Same check as [`validate`](Self::validate), returning the full claims.
    pub fn validate_claims(&self, token: &str, expected: TokenClass) -> Result<Claims> {
        let claims = self.codec.verify(token)?;
        if claims.token_type != expected {
            return Err(AuthError::WrongTokenClass);
        }
        Ok(claims)
    }

    /// Verify signature and expiry only; the caller decides what to do with
    /// the class.
    pub fn inspect(&self, token: &str) -> Result<Claims> {
        self.codec.verify(token)
    }
}
