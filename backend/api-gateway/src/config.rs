//! Configuration for the API Gateway
//!
//! Loads settings from:
//! 1. Environment variables
//! 2. .env file (local development)

use actix_middleware::DEFAULT_PUBLIC_PATHS;
use anyhow::{bail, Context, Result};
use auth_core::{JwtAuthProvider, KeySettings, SystemClock};
use std::env;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,

    /// Token verification and issuance
    pub auth: AuthConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub keys: KeySettings,
    /// Comma-separated allow-list (`AUTH_PUBLIC_PATHS`)
    pub public_paths: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let keys = KeySettings::from_lookup(&lookup).context("Invalid JWT key settings")?;
        if keys.public_key.is_none() {
            bail!("JWT_PUBLIC_KEY_FILE or JWT_PUBLIC_KEY_PEM must be set");
        }

        Ok(Self {
            server: ServerConfig {
                host: lookup("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: lookup("SERVER_PORT")
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(8080),
            },
            auth: AuthConfig {
                keys,
                public_paths: lookup("AUTH_PUBLIC_PATHS")
                    .unwrap_or_else(|| DEFAULT_PUBLIC_PATHS.to_string()),
            },
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl AuthConfig {
    /// Load key material and build the provider. Any failure here must stop
    /// the process.
    pub fn build_provider(&self) -> Result<Arc<JwtAuthProvider>> {
        let keys = self.keys.load().context("Failed to load JWT key material")?;
        let provider = JwtAuthProvider::with_clock(
            Arc::new(keys),
            Arc::new(SystemClock),
            self.keys.leeway_secs,
        );

        info!(
            can_issue = provider.can_issue(),
            leeway_secs = self.keys.leeway_secs,
            "Token provider ready"
        );
        Ok(Arc::new(provider))
    }
}
