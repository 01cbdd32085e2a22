/// Gateway HTTP endpoints
///
/// GET  /health                  - Liveness probe (public)
/// POST /api/v1/refresh-token    - Exchange a refresh token for an access token (public)
/// GET  /api/v1/session          - Identity behind the presented access token
use actix_web::{http::header, web, HttpRequest, HttpResponse};
use auth_core::bearer::extract_from_header;
use auth_core::{AuthError, AuthProvider, TokenClass};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshTokenResponse {
    pub access_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub user_id: i64,
    pub token_type: TokenClass,
}

fn error_body(message: &str) -> serde_json::Value {
    serde_json::json!({ "error": message })
}

pub async fn health() -> &'static str {
    "ok"
}

/// POST /api/v1/refresh-token
pub async fn refresh_token(
    req: web::Json<RefreshTokenRequest>,
    provider: web::Data<dyn AuthProvider>,
) -> HttpResponse {
    match provider.refresh_access(&req.refresh_token) {
        Ok(access_token) => {
            info!("Access token refreshed");
            HttpResponse::Ok().json(RefreshTokenResponse { access_token })
        }
        Err(e) if e.is_credential_failure() => {
            warn!(error = %e, "Refresh token rejected");
            HttpResponse::Unauthorized().json(error_body("invalid or expired refresh token"))
        }
        Err(e) => {
            error!(error = %e, "Token refresh failed");
            HttpResponse::InternalServerError().json(error_body("internal error"))
        }
    }
}

/// GET /api/v1/session
///
/// The gate does not hand the principal over, so the raw header token is
/// validated again here.
pub async fn session(req: HttpRequest, provider: web::Data<dyn AuthProvider>) -> HttpResponse {
    let principal = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(extract_from_header)
        .ok_or(AuthError::NoCredentialPresent)
        .and_then(|token| provider.validate(token, TokenClass::Access));

    match principal {
        Ok(principal) => HttpResponse::Ok().json(SessionResponse {
            user_id: principal.subject_id,
            token_type: principal.token_class,
        }),
        Err(e) => {
            warn!(error = %e, "Session lookup rejected");
            HttpResponse::Unauthorized().json(error_body("unauthorized"))
        }
    }
}

/// Mount the gateway routes. The refresh exchange only exists on a process
/// that holds the signing key.
pub fn configure(cfg: &mut web::ServiceConfig, can_issue: bool) {
    cfg.route("/health", web::get().to(health))
        .route("/api/v1/session", web::get().to(session));

    if can_issue {
        cfg.route("/api/v1/refresh-token", web::post().to(refresh_token));
    }
}
