//! Client-side interceptor
//!
//! Attaches a bearer credential to every outgoing gRPC request.

use crate::metadata::{bearer_metadata_value, extract_from_incoming};
use auth_core::bearer::AUTHORIZATION;
use auth_core::AuthError;
use tonic::metadata::{AsciiMetadataValue, MetadataMap};
use tonic::service::Interceptor;
use tonic::{Request, Status};

/// Injects `authorization: Bearer <token>` into outgoing requests.
///
/// The header value is encoded once at construction, so a token metadata
/// cannot carry is rejected up front instead of on every call.
///
/// ## Usage
///
/// ```rust,no_run
/// use grpc_jwt_propagation::JwtClientInterceptor;
/// use tonic::transport::Channel;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let interceptor = JwtClientInterceptor::new("eyJhbGc...")?;
///
/// let channel = Channel::from_static("http://[::1]:50051")
///     .connect()
///     .await?;
///
/// // let mut client = SomeServiceClient::with_interceptor(channel, interceptor);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct JwtClientInterceptor {
    auth_header: AsciiMetadataValue,
}

impl JwtClientInterceptor {
    /// `token` without the `"Bearer "` prefix.
    pub fn new(token: &str) -> Result<Self, AuthError> {
        Ok(Self {
            auth_header: bearer_metadata_value(token)?,
        })
    }

    /// Reuse the caller's credential for downstream calls (service acting
    /// on behalf of the caller).
    pub fn from_incoming(metadata: &MetadataMap) -> Result<Self, AuthError> {
        Self::new(extract_from_incoming(metadata)?)
    }
}

impl Interceptor for JwtClientInterceptor {
    fn call(&mut self, mut request: Request<()>) -> Result<Request<()>, Status> {
        request
            .metadata_mut()
            .insert(AUTHORIZATION, self.auth_header.clone());

        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interceptor_injects_header() {
        let mut interceptor = JwtClientInterceptor::new("test-token-123").unwrap();

        let request = interceptor.call(Request::new(())).unwrap();

        let auth = request.metadata().get(AUTHORIZATION).unwrap();
        assert_eq!(auth.to_str().unwrap(), "Bearer test-token-123");
    }

    #[test]
    fn test_interceptor_overwrites_stale_header() {
        let mut interceptor = JwtClientInterceptor::new("fresh").unwrap();

        let mut request = Request::new(());
        request
            .metadata_mut()
            .insert(AUTHORIZATION, "Bearer stale".parse().unwrap());

        let request = interceptor.call(request).unwrap();
        assert_eq!(
            request.metadata().get(AUTHORIZATION).unwrap().to_str().unwrap(),
            "Bearer fresh"
        );
    }

    #[test]
    fn test_new_rejects_unencodable_token() {
        assert!(matches!(
            JwtClientInterceptor::new("bad\r\ntoken"),
            Err(AuthError::MalformedToken)
        ));
    }

    #[test]
    fn test_from_incoming() {
        let mut metadata = MetadataMap::new();
        metadata.insert(AUTHORIZATION, "Bearer caller-token".parse().unwrap());

        let mut interceptor = JwtClientInterceptor::from_incoming(&metadata).unwrap();
        let request = interceptor.call(Request::new(())).unwrap();

        assert_eq!(
            request.metadata().get(AUTHORIZATION).unwrap().to_str().unwrap(),
            "Bearer caller-token"
        );
    }

    #[test]
    fn test_from_incoming_missing() {
        let metadata = MetadataMap::new();
        assert!(matches!(
            JwtClientInterceptor::from_incoming(&metadata),
            Err(AuthError::NoCredentialPresent)
        ));
    }
}
