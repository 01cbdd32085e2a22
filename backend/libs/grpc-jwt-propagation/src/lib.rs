//! Bearer Credential Propagation for gRPC Microservices
//!
//! Carries the caller's token between services in `authorization` metadata
//! and validates it on arrival.
//!
//! ## Core Components
//!
//! - **metadata**: extract from incoming, inject into outgoing, forward unchanged
//! - **JwtClientInterceptor**: attaches a token to every outgoing request
//! - **JwtServerInterceptor**: validates the token and stores the
//!   [`Principal`](auth_core::Principal)
//! - **PrincipalExt**: handler-side access and ownership checks
//!
//! ## Usage Example
//!
//! ### Forwarding the caller's identity
//!
//! ```rust,no_run
//! use grpc_jwt_propagation::forward_credential;
//! use tonic::{Request, Status};
//!
//! fn downstream_request<T>(incoming: &Request<T>) -> Result<Request<()>, Status> {
//!     forward_credential(incoming, Request::new(()))
//!         .map_err(|e| grpc_jwt_propagation::status_for(&e))
//! }
//! ```
//!
//! ### Server side
//!
//! ```rust,no_run
//! use grpc_jwt_propagation::PrincipalExt;
//! use tonic::{Request, Response, Status};
//!
//! async fn get_profile(request: Request<()>) -> Result<Response<()>, Status> {
//!     let principal = request.principal()?;
//!     let _ = principal.subject_id;
//!     Ok(Response::new(()))
//! }
//! ```
//!
//! ## Security Guarantees
//!
//! - Tokens validated by `auth-core` (RS256/RS384/RS512 only, strict expiry)
//! - Every credential failure = `Status::unauthenticated("unauthorized")`
//! - Ownership violations = `Status::permission_denied`

mod client;
mod extensions;
mod metadata;
mod server;

pub use client::JwtClientInterceptor;
pub use extensions::PrincipalExt;
pub use metadata::{
    bearer_metadata_value, extract_from_incoming, forward_credential, inject_outgoing,
};
pub use server::{status_for, JwtServerInterceptor, UNAUTHORIZED_MESSAGE};

// Re-export tonic Status for convenience
pub use tonic::Status;
