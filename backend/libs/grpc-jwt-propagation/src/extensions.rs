//! Request extension trait for handlers behind [`JwtServerInterceptor`].
//!
//! [`JwtServerInterceptor`]: crate::JwtServerInterceptor

use crate::server::UNAUTHORIZED_MESSAGE;
use auth_core::Principal;
use tonic::{Request, Status};

/// Access to the [`Principal`] the server interceptor resolved.
///
/// ## Usage
///
/// ```rust,no_run
/// use grpc_jwt_propagation::PrincipalExt;
/// use tonic::{Request, Response, Status};
///
/// async fn delete_post(request: Request<()>) -> Result<Response<()>, Status> {
///     let post_author_id = 42; // From database
///     request.require_owner(post_author_id)?;
///     Ok(Response::new(()))
/// }
/// ```
pub trait PrincipalExt {
    /// `Unauthenticated` if no interceptor stored a principal.
    fn principal(&self) -> Result<&Principal, Status>;

    /// `PermissionDenied` unless the caller is `resource_owner_id`.
    fn require_owner(&self, resource_owner_id: i64) -> Result<&Principal, Status>;
}

impl<T> PrincipalExt for Request<T> {
    fn principal(&self) -> Result<&Principal, Status> {
        self.extensions()
            .get::<Principal>()
            .ok_or_else(|| Status::unauthenticated(UNAUTHORIZED_MESSAGE))
    }

    fn require_owner(&self, resource_owner_id: i64) -> Result<&Principal, Status> {
        let principal = self.principal()?;

        if !principal.is_owner(resource_owner_id) {
            return Err(Status::permission_denied(
                "You do not have permission to access this resource",
            ));
        }

        Ok(principal)
    }
}
