use thiserror::Error;

pub type Result<T> = std::result::Result<T, AuthError>;

/// Failures raised by key loading, token handling and password hashing.
///
/// `KeyLoad` and `SigningKeyMissing` are startup-fatal for an issuing
/// process. Every variant for which [`AuthError::is_credential_failure`]
/// holds is a per-request outcome and must surface to the caller as a
/// generic "unauthorized" answer; the `Display` text is for operator logs.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Failed to load key material: {0}")]
    KeyLoad(String),

    #[error("No signing key configured")]
    SigningKeyMissing,

    #[error("No verifying key configured")]
    VerifyKeyMissing,

    #[error("Malformed token")]
    MalformedToken,

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Token expired")]
    TokenExpired,

    #[error("Token class does not match the expected class")]
    WrongTokenClass,

    #[error("No bearer credential present")]
    NoCredentialPresent,

    #[error("Password hashing failed: {0}")]
    HashingFailed(String),
}

impl AuthError {
    /// True for the errors a presented credential can cause.
    pub fn is_credential_failure(&self) -> bool {
        matches!(
            self,
            AuthError::MalformedToken
                | AuthError::InvalidSignature
                | AuthError::TokenExpired
                | AuthError::WrongTokenClass
                | AuthError::NoCredentialPresent
        )
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            ErrorKind::InvalidToken
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_)
            | ErrorKind::MissingRequiredClaim(_)
            | ErrorKind::InvalidAlgorithmName => AuthError::MalformedToken,
            // Bad signature bytes, or a header naming an algorithm outside
            // RS256/RS384/RS512.
            _ => AuthError::InvalidSignature,
        }
    }
}
