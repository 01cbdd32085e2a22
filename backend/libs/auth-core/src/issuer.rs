use crate::claims::{Claims, Subject, TokenClass, TokenPair, ACCESS_TOKEN_TTL_SECS};
use crate::codec::TokenCodec;
use crate::error::Result;
use std::sync::Arc;
use tracing::debug;

/// Builds claims for a subject and signs them.
///
/// Stateless: nothing about an issued token is retained. Two tokens issued
/// for the same subject in the same second carry identical claims.
#[derive(Clone)]
pub struct TokenIssuer {
    codec: Arc<TokenCodec>,
}

impl TokenIssuer {
    pub fn new(codec: Arc<TokenCodec>) -> Self {
        Self { codec }
    }

    pub fn can_issue(&self) -> bool {
        self.codec.keys().can_sign()
    }

    pub fn issue(&self, subject: &Subject, class: TokenClass) -> Result<String> {
        let claims = Claims::new(subject, class, self.codec.now());
        let token = self.codec.sign(&claims)?;

        debug!(user_id = subject.id, token_class = %class, exp = claims.exp, "Token issued");
        Ok(token)
    }

    /// Short-lived (1 hour) token for API calls.
    pub fn issue_access(&self, subject: &Subject) -> Result<String> {
        self.issue(subject, TokenClass::Access)
    }

    /// Long-lived (7 days) token accepted only by the refresh exchange.
    pub fn issue_refresh(&self, subject: &Subject) -> Result<String> {
        self.issue(subject, TokenClass::Refresh)
    }

    pub fn issue_pair(&self, subject: &Subject) -> Result<TokenPair> {
        Ok(TokenPair {
            access_token: self.issue_access(subject)?,
            refresh_token: self.issue_refresh(subject)?,
            token_type: "Bearer".to_string(),
            expires_in: ACCESS_TOKEN_TTL_SECS,
        })
    }
}
