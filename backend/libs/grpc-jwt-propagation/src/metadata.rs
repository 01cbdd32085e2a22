//! Bearer credentials in gRPC metadata.
//!
//! The value under `authorization` must start with the exact prefix
//! `"Bearer "`. Key lookup is case-insensitive (metadata keys are normalized
//! to lowercase).

use auth_core::bearer::{bearer_value, strip_bearer_prefix, AUTHORIZATION};
use auth_core::AuthError;
use tonic::metadata::{AsciiMetadataValue, MetadataMap};
use tonic::Request;

/// Token carried by incoming request metadata.
///
/// ## Errors
///
/// `NoCredentialPresent` if the key is absent, the value is not visible
/// ASCII, or it lacks the `"Bearer "` prefix.
pub fn extract_from_incoming(metadata: &MetadataMap) -> Result<&str, AuthError> {
    let value = metadata
        .get(AUTHORIZATION)
        .ok_or(AuthError::NoCredentialPresent)?;

    let value = value.to_str().map_err(|_| AuthError::NoCredentialPresent)?;
    strip_bearer_prefix(value)
}

/// `"Bearer <token>"` as a metadata value.
///
/// ## Errors
///
/// `MalformedToken` if the token contains characters metadata cannot carry.
/// Tokens produced by the codec are base64url and always encode.
pub fn bearer_metadata_value(token: &str) -> Result<AsciiMetadataValue, AuthError> {
    AsciiMetadataValue::try_from(bearer_value(token)).map_err(|_| AuthError::MalformedToken)
}

/// Attach `token` to an outgoing request, replacing any existing credential.
pub fn inject_outgoing<T>(mut request: Request<T>, token: &str) -> Result<Request<T>, AuthError> {
    let value = bearer_metadata_value(token)?;
    request.metadata_mut().insert(AUTHORIZATION, value);
    Ok(request)
}

/// Copy the caller's credential from `incoming` onto `outgoing` byte for
/// byte. Nothing is re-signed and the token class is whatever the caller
/// presented.
///
/// ## Errors
///
/// `NoCredentialPresent` if `incoming` carries no well-formed bearer value.
pub fn forward_credential<T, U>(
    incoming: &Request<T>,
    mut outgoing: Request<U>,
) -> Result<Request<U>, AuthError> {
    let metadata = incoming.metadata();
    extract_from_incoming(metadata)?;

    if let Some(value) = metadata.get(AUTHORIZATION) {
        outgoing.metadata_mut().insert(AUTHORIZATION, value.clone());
    }
    Ok(outgoing)
}
