use actix_middleware::{AuthGate, PublicPaths, RequestLogging, DEFAULT_PUBLIC_PATHS};
use actix_web::{http::header, test, web, App, HttpResponse};
use auth_core::test_utils::{fixed_clock_provider, TEST_EPOCH};
use auth_core::{AuthProvider, FixedClock, JwtAuthProvider, Subject};
use std::sync::Arc;

/// Simple test handler
async fn test_handler() -> HttpResponse {
    HttpResponse::Ok().body("success")
}

fn provider() -> (Arc<JwtAuthProvider>, Arc<FixedClock>) {
    let (provider, clock) = fixed_clock_provider(TEST_EPOCH);
    (Arc::new(provider), clock)
}

macro_rules! gated_app {
    ($provider:expr) => {
        test::init_service(
            App::new()
                .wrap(AuthGate::new($provider, PublicPaths::parse(DEFAULT_PUBLIC_PATHS)))
                .wrap(RequestLogging)
                .route("/health", web::get().to(test_handler))
                .route("/api/v1/register", web::post().to(test_handler))
                .route("/api/v1/registered-users", web::get().to(test_handler))
                .route("/api/swagger/index.html", web::get().to(test_handler))
                .route("/api/v1/posts", web::get().to(test_handler)),
        )
    };
}

#[actix_web::test]
async fn test_allow_listed_path_without_header_reaches_handler() {
    let (provider, _) = provider();
    let app = gated_app!(provider).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let req = test::TestRequest::get()
        .uri("/api/swagger/index.html")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
}

#[actix_web::test]
async fn test_protected_path_without_header_is_401() {
    let (provider, _) = provider();
    let app = gated_app!(provider).await;

    let req = test::TestRequest::get().uri("/api/v1/posts").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_web::test]
async fn test_sibling_of_public_path_is_not_exempt() {
    let (provider, _) = provider();
    let app = gated_app!(provider).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/registered-users")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_web::test]
async fn test_valid_access_token_reaches_handler() {
    let (provider, _) = provider();
    let token = provider.issue_access(&Subject::new(3)).unwrap();
    let app = gated_app!(provider).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/posts")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body = test::read_body(resp).await;
    assert_eq!(body, "success");
}

#[actix_web::test]
async fn test_refresh_token_is_rejected() {
    let (provider, _) = provider();
    let token = provider.issue_refresh(&Subject::new(3)).unwrap();
    let app = gated_app!(provider).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/posts")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body, serde_json::json!({ "error": "unauthorized" }));
}

#[actix_web::test]
async fn test_expired_token_is_rejected() {
    let (provider, clock) = provider();
    let token = provider.issue_access(&Subject::new(3)).unwrap();
    clock.advance(3600);
    let app = gated_app!(provider).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/posts")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_web::test]
async fn test_malformed_headers_are_rejected() {
    let (provider, _) = provider();
    let token = provider.issue_access(&Subject::new(3)).unwrap();
    let app = gated_app!(provider).await;

    for header in [
        format!("bearer {token}"),
        format!("Basic {token}"),
        format!("Bearer {token} extra"),
        token.clone(),
        "Bearer".to_string(),
    ] {
        let req = test::TestRequest::get()
            .uri("/api/v1/posts")
            .insert_header(("Authorization", header.clone()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401, "header {header:?}");
    }
}

#[actix_web::test]
async fn test_token_from_other_deployment_is_rejected() {
    let foreign_keys = auth_core::KeyStore::from_pem(
        Some(auth_core::test_utils::FOREIGN_PRIVATE_KEY_PEM),
        Some(auth_core::test_utils::FOREIGN_PUBLIC_KEY_PEM),
    )
    .unwrap();
    let foreign = JwtAuthProvider::with_clock(
        Arc::new(foreign_keys),
        Arc::new(FixedClock::at(TEST_EPOCH)),
        0,
    );
    let token = foreign.issue_access(&Subject::new(3)).unwrap();

    let (provider, _) = provider();
    let app = gated_app!(provider).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/posts")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_web::test]
async fn test_missing_verifying_key_still_returns_generic_401() {
    let signing_only =
        auth_core::KeyStore::from_pem(Some(auth_core::test_utils::TEST_PRIVATE_KEY_PEM), None)
            .unwrap();
    let provider = Arc::new(JwtAuthProvider::with_clock(
        Arc::new(signing_only),
        Arc::new(FixedClock::at(TEST_EPOCH)),
        0,
    ));
    let token = provider.issue_access(&Subject::new(3)).unwrap();
    let app = gated_app!(provider).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/posts")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
    assert_eq!(resp.headers().get(header::WWW_AUTHENTICATE).unwrap(), "Bearer");

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body, serde_json::json!({ "error": "unauthorized" }));

    // Public paths never touch the provider
    let req = test::TestRequest::get().uri("/health").to_request();
    assert!(test::call_service(&app, req).await.status().is_success());
}
