//! Key material settings
//!
//! Resolved from environment variables:
//! - `JWT_PRIVATE_KEY_PEM` / `JWT_PRIVATE_KEY_FILE`: signing key
//! - `JWT_PUBLIC_KEY_PEM` / `JWT_PUBLIC_KEY_FILE`: verifying key
//! - `JWT_LEEWAY_SECS`: clock-skew tolerance, default 0
//!
//! Inline PEM wins over a file path when both are set.

use crate::error::Result;
use crate::keys::{read_pem, KeyStore};
use anyhow::Context;
use std::fmt;
use std::path::PathBuf;

/// Where a PEM document comes from.
#[derive(Clone, PartialEq, Eq)]
pub enum KeySource {
    File(PathBuf),
    Pem(String),
}

impl KeySource {
    fn resolve(&self) -> Result<String> {
        match self {
            KeySource::File(path) => read_pem(path),
            KeySource::Pem(pem) => Ok(pem.clone()),
        }
    }
}

// Inline key material never reaches logs.
impl fmt::Debug for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySource::File(path) => f.debug_tuple("File").field(path).finish(),
            KeySource::Pem(_) => f.write_str("Pem(<redacted>)"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct KeySettings {
    pub private_key: Option<KeySource>,
    pub public_key: Option<KeySource>,
    pub leeway_secs: u64,
}

impl KeySettings {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let source = |pem_var: &str, file_var: &str| {
            non_empty(pem_var)
                .map(KeySource::Pem)
                .or_else(|| non_empty(file_var).map(|p| KeySource::File(PathBuf::from(p))))
        };

        let leeway_secs = match non_empty("JWT_LEEWAY_SECS") {
            Some(raw) => raw.trim().parse().with_context(|| {
                format!("JWT_LEEWAY_SECS must be a non-negative integer, got {raw:?}")
            })?,
            None => 0,
        };

        Ok(Self {
            private_key: source("JWT_PRIVATE_KEY_PEM", "JWT_PRIVATE_KEY_FILE"),
            public_key: source("JWT_PUBLIC_KEY_PEM", "JWT_PUBLIC_KEY_FILE"),
            leeway_secs,
        })
    }

    /// Read and parse the configured keys.
    pub fn load(&self) -> Result<KeyStore> {
        let private_pem = self.private_key.as_ref().map(KeySource::resolve).transpose()?;
        let public_pem = self.public_key.as_ref().map(KeySource::resolve).transpose()?;
        KeyStore::from_pem(private_pem.as_deref(), public_pem.as_deref())
    }
}
