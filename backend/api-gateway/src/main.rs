use actix_middleware::{AuthGate, PublicPaths, RequestLogging};
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use api_gateway::{handlers, Config};
use auth_core::AuthProvider;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::prelude::*;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Structured JSON logs for aggregation
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,api_gateway=debug,auth_core=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_thread_ids(true)
                .with_line_number(true)
                .with_target(true),
        )
        .init();

    info!("Starting API Gateway...");

    let config = Config::from_env().context("Failed to load configuration")?;

    // Startup-fatal: no gateway without usable key material.
    let provider = config.auth.build_provider()?;
    let can_issue = provider.can_issue();
    let provider: Arc<dyn AuthProvider> = provider;

    let public_paths = PublicPaths::parse(&config.auth.public_paths);
    info!(
        public_paths = public_paths.len(),
        refresh_endpoint = can_issue,
        "Auth gate configured"
    );

    let bind_addr = config.bind_addr();
    info!("API Gateway starting on http://{}", bind_addr);

    HttpServer::new(move || {
        App::new()
            .wrap(AuthGate::new(provider.clone(), public_paths.clone()))
            .wrap(RequestLogging)
            .app_data(web::Data::from(provider.clone()))
            .configure(move |cfg| handlers::configure(cfg, can_issue))
    })
    .bind(&bind_addr)
    .with_context(|| format!("Failed to bind {bind_addr}"))?
    .run()
    .await?;

    Ok(())
}
