//! Token payload and the identities derived from it.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Access-token lifetime (1 hour).
pub const ACCESS_TOKEN_TTL_SECS: i64 = 60 * 60;
/// Refresh-token lifetime (7 days).
pub const REFRESH_TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Purpose a token was issued for.
///
/// Access tokens authorize regular API calls; refresh tokens are accepted
/// only by the refresh exchange. The class is fixed at issuance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenClass {
    Access,
    Refresh,
}

impl TokenClass {
    /// Fixed lifetime policy for this class.
    pub fn lifetime(self) -> Duration {
        match self {
            TokenClass::Access => Duration::seconds(ACCESS_TOKEN_TTL_SECS),
            TokenClass::Refresh => Duration::seconds(REFRESH_TOKEN_TTL_SECS),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TokenClass::Access => "access",
            TokenClass::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Signed payload of every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (numeric user ID)
    pub user_id: i64,
    /// Subject login, when the issuing service knows it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_login: Option<String>,
    pub token_type: TokenClass,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Claims for `subject` issued at `now` with the class's fixed lifetime.
    pub fn new(subject: &Subject, token_type: TokenClass, now: i64) -> Self {
        Self {
            user_id: subject.id,
            user_login: subject.login.clone(),
            token_type,
            iat: now,
            exp: now + token_type.lifetime().num_seconds(),
        }
    }

    /// `exp` strictly after `iat`.
    pub fn is_well_formed(&self) -> bool {
        self.exp > self.iat
    }

    pub fn principal(&self) -> Principal {
        Principal {
            subject_id: self.user_id,
            token_class: self.token_type,
        }
    }

    pub fn subject(&self) -> Subject {
        Subject {
            id: self.user_id,
            login: self.user_login.clone(),
        }
    }
}

/// Who a token is being issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub id: i64,
    pub login: Option<String>,
}

impl Subject {
    pub fn new(id: i64) -> Self {
        Self { id, login: None }
    }

    pub fn with_login(mut self, login: impl Into<String>) -> Self {
        self.login = Some(login.into());
        self
    }
}

impl From<i64> for Subject {
    fn from(id: i64) -> Self {
        Subject::new(id)
    }
}

/// Identity resolved from a validated token, handed to business logic for
/// the lifetime of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub subject_id: i64,
    pub token_class: TokenClass,
}

impl Principal {
    pub fn is_owner(&self, resource_owner_id: i64) -> bool {
        self.subject_id == resource_owner_id
    }
}

/// Token pair handed out by register/authenticate flows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}
