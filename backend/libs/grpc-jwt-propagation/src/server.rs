//! Server-side interceptor
//!
//! Validates the bearer credential on incoming gRPC requests and stores the
//! resolved [`Principal`] in request extensions.

use crate::metadata::extract_from_incoming;
use auth_core::{AuthError, AuthProvider, Principal, TokenClass};
use std::sync::Arc;
use tonic::metadata::MetadataMap;
use tonic::service::Interceptor;
use tonic::{Request, Status};
use tracing::{debug, error, warn};

/// Message returned for every credential failure
pub const UNAUTHORIZED_MESSAGE: &str = "unauthorized";

/// Map an [`AuthError`] to the status an untrusted caller sees.
///
/// Every credential failure collapses into the same
/// `Unauthenticated("unauthorized")`. Anything else is a server-side
/// misconfiguration and becomes `Internal`.
pub fn status_for(err: &AuthError) -> Status {
    if err.is_credential_failure() {
        Status::unauthenticated(UNAUTHORIZED_MESSAGE)
    } else {
        Status::internal("authentication unavailable")
    }
}

/// Rejects requests without a valid token of the expected class.
///
/// ## Security
///
/// - Missing, malformed, forged, expired and wrong-class tokens all produce
///   the same response; the precise reason is only logged
/// - A refresh token never passes an interceptor built with [`access`](Self::access)
///
/// ## Usage
///
/// ```rust,no_run
/// use auth_core::{JwtAuthProvider, KeyStore};
/// use grpc_jwt_propagation::JwtServerInterceptor;
/// use std::sync::Arc;
///
/// # fn example(public_key_pem: &str) -> Result<(), Box<dyn std::error::Error>> {
/// let keys = Arc::new(KeyStore::verify_only(public_key_pem)?);
/// let interceptor = JwtServerInterceptor::access(Arc::new(JwtAuthProvider::new(keys)));
///
/// // let service = MyServiceServer::with_interceptor(MyService, interceptor);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct JwtServerInterceptor {
    provider: Arc<dyn AuthProvider>,
    expected: TokenClass,
}

impl JwtServerInterceptor {
    pub fn new(provider: Arc<dyn AuthProvider>, expected: TokenClass) -> Self {
        Self { provider, expected }
    }

    /// Interceptor for ordinary API calls.
    pub fn access(provider: Arc<dyn AuthProvider>) -> Self {
        Self::new(provider, TokenClass::Access)
    }

    fn authenticate(&self, metadata: &MetadataMap) -> Result<Principal, Status> {
        let principal = extract_from_incoming(metadata)
            .and_then(|token| self.provider.validate(token, self.expected))
            .map_err(|e| {
                if e.is_credential_failure() {
                    warn!(error = %e, expected = %self.expected, "Rejected gRPC credential");
                } else {
                    error!(error = %e, "gRPC credential check could not run");
                }
                status_for(&e)
            })?;

        debug!(user_id = principal.subject_id, "gRPC credential accepted");
        Ok(principal)
    }
}

impl Interceptor for JwtServerInterceptor {
    fn call(&mut self, mut request: Request<()>) -> Result<Request<()>, Status> {
        let principal = self.authenticate(request.metadata())?;
        request.extensions_mut().insert(principal);
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auth_core::test_utils::{fixed_clock_provider, StubAuthProvider, TEST_EPOCH};
    use auth_core::{JwtAuthProvider, KeyStore, Subject};
    use tonic::metadata::MetadataValue;

    fn request_with(value: &str) -> Request<()> {
        let mut request = Request::new(());
        request
            .metadata_mut()
            .insert("authorization", value.parse().unwrap());
        request
    }

    fn assert_generic_unauthenticated(result: Result<Request<()>, Status>) {
        let status = result.unwrap_err();
        assert_eq!(status.code(), tonic::Code::Unauthenticated);
        assert_eq!(status.message(), UNAUTHORIZED_MESSAGE);
    }

    #[test]
    fn test_missing_header() {
        let mut interceptor = JwtServerInterceptor::access(Arc::new(StubAuthProvider::new()));
        assert_generic_unauthenticated(interceptor.call(Request::new(())));
    }

    #[test]
    fn test_invalid_format() {
        let mut interceptor = JwtServerInterceptor::access(Arc::new(StubAuthProvider::new()));

        let mut request = Request::new(());
        request
            .metadata_mut()
            .insert("authorization", MetadataValue::from_static("InvalidFormat"));

        assert_generic_unauthenticated(interceptor.call(request));
    }

    #[test]
    fn test_valid_token_stores_principal() {
        let stub = Arc::new(StubAuthProvider::new());
        let token = stub.issue_access(&Subject::new(8)).unwrap();
        let mut interceptor = JwtServerInterceptor::access(stub);

        let request = interceptor.call(request_with(&format!("Bearer {token}"))).unwrap();

        let principal = request.extensions().get::<Principal>().unwrap();
        assert_eq!(principal.subject_id, 8);
        assert_eq!(principal.token_class, TokenClass::Access);
    }

    #[test]
    fn test_refresh_token_rejected_by_access_interceptor() {
        let stub = Arc::new(StubAuthProvider::new());
        let token = stub.issue_refresh(&Subject::new(8)).unwrap();
        let mut interceptor = JwtServerInterceptor::access(stub);

        assert_generic_unauthenticated(interceptor.call(request_with(&format!("Bearer {token}"))));
    }

    #[test]
    fn test_refresh_interceptor_accepts_refresh_token() {
        let stub = Arc::new(StubAuthProvider::new());
        let token = stub.issue_refresh(&Subject::new(8)).unwrap();
        let mut interceptor = JwtServerInterceptor::new(stub, TokenClass::Refresh);

        let request = interceptor.call(request_with(&format!("Bearer {token}"))).unwrap();
        assert_eq!(
            request.extensions().get::<Principal>().unwrap().token_class,
            TokenClass::Refresh
        );
    }

    #[test]
    fn test_expired_token_message_is_generic() {
        let (provider, clock) = fixed_clock_provider(TEST_EPOCH);
        let token = provider.issue_access(&Subject::new(8)).unwrap();
        clock.advance(3600);

        let mut interceptor = JwtServerInterceptor::access(Arc::new(provider));
        let status = interceptor
            .call(request_with(&format!("Bearer {token}")))
            .unwrap_err();

        assert_eq!(status.code(), tonic::Code::Unauthenticated);
        assert!(!status.message().contains("expired"));
    }

    #[test]
    fn test_tampered_token() {
        let (provider, _) = fixed_clock_provider(TEST_EPOCH);
        let token = provider.issue_access(&Subject::new(8)).unwrap();
        let replacement = if token.ends_with('A') { 'B' } else { 'A' };
        let tampered = format!("{}{replacement}", &token[..token.len() - 1]);

        let mut interceptor = JwtServerInterceptor::access(Arc::new(provider));
        let request = request_with(&format!("Bearer {tampered}"));
        assert_generic_unauthenticated(interceptor.call(request));
    }

    #[test]
    fn test_misconfigured_provider_is_internal() {
        let (issuer, _) = fixed_clock_provider(TEST_EPOCH);
        let token = issuer.issue_access(&Subject::new(8)).unwrap();

        // Signing-only store: verification cannot run at all.
        let signing_only = KeyStore::from_pem(
            Some(auth_core::test_utils::TEST_PRIVATE_KEY_PEM),
            None,
        )
        .unwrap();
        let provider = JwtAuthProvider::new(Arc::new(signing_only));

        let mut interceptor = JwtServerInterceptor::access(Arc::new(provider));
        let status = interceptor
            .call(request_with(&format!("Bearer {token}")))
            .unwrap_err();
        assert_eq!(status.code(), tonic::Code::Internal);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(&AuthError::TokenExpired).code(), tonic::Code::Unauthenticated);
        assert_eq!(status_for(&AuthError::WrongTokenClass).code(), tonic::Code::Unauthenticated);
        assert_eq!(status_for(&AuthError::VerifyKeyMissing).code(), tonic::Code::Internal);
    }
}
