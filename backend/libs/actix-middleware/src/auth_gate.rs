//! Authentication gate for inbound HTTP requests.
//!
//! Requests to an allow-listed path pass through untouched. Every other
//! request must carry `Authorization: Bearer <access token>`; anything less
//! is answered with `401 {"error":"unauthorized"}` and never reaches the
//! handler.
//!
//! The gate records its decision as a [`GateOutcome`] request extension. It
//! does not attach the resolved principal: handlers that need the caller's
//! identity revalidate or forward the raw header.

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error, HttpMessage, HttpResponse,
};
use auth_core::bearer::extract_from_header;
use auth_core::{AuthError, AuthProvider, TokenClass};
use futures::future::LocalBoxFuture;
use std::fmt;
use std::future::{ready, Ready};
use std::sync::Arc;

/// Allow-list used when none is configured
pub const DEFAULT_PUBLIC_PATHS: &str =
    "/health,/api/v1/register,/api/v1/authenticate,/api/v1/refresh-token,/api/swagger/*";

#[derive(Debug, Clone, PartialEq, Eq)]
enum PathRule {
    Exact(String),
    /// `/base/*`: `/base` itself and anything below `/base/`
    Subtree(String),
}

impl PathRule {
    fn parse(entry: &str) -> Self {
        match entry.strip_suffix("/*") {
            Some(base) => PathRule::Subtree(base.to_string()),
            None => PathRule::Exact(entry.to_string()),
        }
    }

    fn matches(&self, path: &str) -> bool {
        match self {
            PathRule::Exact(exact) => path == exact,
            PathRule::Subtree(base) => path
                .strip_prefix(base.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/')),
        }
    }
}

/// Paths that bypass authentication.
///
/// Entries match exactly. An entry ending in `/*` matches whole path
/// segments below it, so `/api/swagger/*` admits `/api/swagger/index.html`
/// but not `/api/swaggerfoo`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublicPaths {
    rules: Vec<PathRule>,
}

impl PublicPaths {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rules = entries
            .into_iter()
            .map(|e| e.as_ref().trim().to_string())
            .filter(|e| !e.is_empty())
            .map(|e| PathRule::parse(&e))
            .collect();
        Self { rules }
    }

    /// Comma-separated list, as in `AUTH_PUBLIC_PATHS`.
    pub fn parse(csv: &str) -> Self {
        Self::new(csv.split(','))
    }

    pub fn matches(&self, path: &str) -> bool {
        self.rules.iter().any(|rule| rule.matches(path))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Terminal decision the gate reached for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    Bypassed,
    Authorized,
    Rejected,
}

impl GateOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            GateOutcome::Bypassed => "bypassed",
            GateOutcome::Authorized => "authorized",
            GateOutcome::Rejected => "rejected",
        }
    }
}

impl fmt::Display for GateOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Access-token gate middleware.
///
/// ## Usage
///
/// ```rust,no_run
/// use actix_middleware::{AuthGate, PublicPaths};
/// use actix_web::App;
/// use auth_core::{JwtAuthProvider, KeyStore};
/// use std::sync::Arc;
///
/// # fn example(public_key_pem: &str) -> Result<(), Box<dyn std::error::Error>> {
/// let provider = Arc::new(JwtAuthProvider::new(Arc::new(KeyStore::verify_only(public_key_pem)?)));
/// let gate = AuthGate::new(provider, PublicPaths::parse("/health"));
/// let _app = App::new().wrap(gate);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AuthGate {
    provider: Arc<dyn AuthProvider>,
    public_paths: Arc<PublicPaths>,
}

impl AuthGate {
    pub fn new(provider: Arc<dyn AuthProvider>, public_paths: PublicPaths) -> Self {
        Self {
            provider,
            public_paths: Arc::new(public_paths),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthGateService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthGateService {
            service,
            provider: self.provider.clone(),
            public_paths: self.public_paths.clone(),
        }))
    }
}

pub struct AuthGateService<S> {
    service: S,
    provider: Arc<dyn AuthProvider>,
    public_paths: Arc<PublicPaths>,
}

impl<S> AuthGateService<S> {
    fn check(&self, req: &ServiceRequest) -> Result<(), AuthError> {
        let token = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(extract_from_header)
            .ok_or(AuthError::NoCredentialPresent)?;

        self.provider
            .validate(token, TokenClass::Access)
            .map(|_| ())
    }
}

impl<S, B> Service<ServiceRequest> for AuthGateService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let outcome = if self.public_paths.matches(req.path()) {
            GateOutcome::Bypassed
        } else {
            match self.check(&req) {
                Ok(()) => GateOutcome::Authorized,
                Err(e) => {
                    if e.is_credential_failure() {
                        tracing::warn!(
                            path = %req.path(),
                            error = %e,
                            "Request rejected by auth gate"
                        );
                    } else {
                        tracing::error!(
                            path = %req.path(),
                            error = %e,
                            "Auth gate could not validate request"
                        );
                    }
                    GateOutcome::Rejected
                }
            }
        };

        req.extensions_mut().insert(outcome);

        if outcome == GateOutcome::Rejected {
            let response = unauthorized_response();
            return Box::pin(async move {
                Ok(req.into_response(response).map_into_right_body())
            });
        }

        let fut = self.service.call(req);
        Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
    }
}

fn unauthorized_response() -> HttpResponse {
    HttpResponse::Unauthorized()
        .insert_header((header::WWW_AUTHENTICATE, "Bearer"))
        .json(serde_json::json!({ "error": "unauthorized" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::{call_service, init_service, read_body_json, TestRequest};
    use actix_web::{web, App};
    use auth_core::test_utils::StubAuthProvider;
    use auth_core::Subject;

    async fn ok_handler() -> HttpResponse {
        HttpResponse::Ok().body("handled")
    }

    #[test]
    fn test_path_rules() {
        let paths = PublicPaths::parse("/health, /api/v1/register,,/api/swagger/*");
        assert_eq!(paths.len(), 3);

        assert!(paths.matches("/health"));
        assert!(paths.matches("/api/v1/register"));
        assert!(paths.matches("/api/swagger"));
        assert!(paths.matches("/api/swagger/index.html"));

        assert!(!paths.matches("/health/deep"));
        assert!(!paths.matches("/healthz"));
        assert!(!paths.matches("/api/v1/registered-users"));
        assert!(!paths.matches("/api/swaggerfoo"));
        assert!(!paths.matches("/"));
    }

    #[test]
    fn test_empty_allow_list() {
        let paths = PublicPaths::parse("");
        assert!(paths.is_empty());
        assert!(!paths.matches("/health"));
    }

    #[actix_web::test]
    async fn test_rejection_body_is_generic() {
        let stub = Arc::new(StubAuthProvider::new());
        let app = init_service(
            App::new()
                .wrap(AuthGate::new(stub, PublicPaths::default()))
                .route("/private", web::get().to(ok_handler)),
        )
        .await;

        let req = TestRequest::get()
            .uri("/private")
            .insert_header(("Authorization", "Bearer stub-access-404"))
            .to_request();
        let resp = call_service(&app, req).await;

        assert_eq!(resp.status(), 401);
        assert_eq!(resp.headers().get("www-authenticate").unwrap(), "Bearer");
        let body: serde_json::Value = read_body_json(resp).await;
        assert_eq!(body, serde_json::json!({ "error": "unauthorized" }));
    }

    #[actix_web::test]
    async fn test_outcome_recorded_in_extensions() {
        let stub = Arc::new(StubAuthProvider::new());
        let token = stub.issue_access(&Subject::new(4)).unwrap();

        let app = init_service(
            App::new()
                .wrap(AuthGate::new(stub, PublicPaths::parse("/health")))
                .route("/health", web::get().to(ok_handler))
                .route("/private", web::get().to(ok_handler)),
        )
        .await;

        let resp = call_service(&app, TestRequest::get().uri("/health").to_request()).await;
        assert_eq!(
            resp.request().extensions().get::<GateOutcome>().copied(),
            Some(GateOutcome::Bypassed)
        );

        let req = TestRequest::get()
            .uri("/private")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(
            resp.request().extensions().get::<GateOutcome>().copied(),
            Some(GateOutcome::Authorized)
        );
        assert!(resp
            .request()
            .extensions()
            .get::<auth_core::Principal>()
            .is_none());

        let resp = call_service(&app, TestRequest::get().uri("/private").to_request()).await;
        assert_eq!(resp.status(), 401);
        assert_eq!(
            resp.request().extensions().get::<GateOutcome>().copied(),
            Some(GateOutcome::Rejected)
        );
    }
}
