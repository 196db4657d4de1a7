//! Server configuration
//!
//! Environment variables:
//! - `PORT` - HTTP server port (default: 8080)
//! - `METRICS_PORT` - Metrics server port (default: 9090)
//! - `CACHE_SIZE` - Maximum cached role sets (default: 10000)
//! - `RBAC_MODEL_PATH` - JSON model definition (default: built-in model)
//! - `REVOCATION_TTL_SECS` - How long a stale session stays revoked (default: 900)
//! - `RUST_LOG` - Log level (default: info)

use std::path::PathBuf;
use std::time::Duration;
use std::str::FromStr;
use tracing::{info, warn};

use crate::engine::{CacheConfig, EngineConfig};
use crate::error::Result;
use crate::guard::DEFAULT_REVOCATION_TTL;
use crate::model::ModelDefinition;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub metrics_port: u16,
    pub cache_size: usize,
    pub model_path: Option<PathBuf>,
    pub revocation_ttl_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            metrics_port: 9090,
            cache_size: 10_000,
            model_path: None,
            revocation_ttl_secs: DEFAULT_REVOCATION_TTL.as_secs(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            port: parse_or(&lookup, "PORT", defaults.port),
            metrics_port: parse_or(&lookup, "METRICS_PORT", defaults.metrics_port),
            cache_size: parse_or(&lookup, "CACHE_SIZE", defaults.cache_size),
            model_path: lookup("RBAC_MODEL_PATH")
                .filter(|path| !path.trim().is_empty())
                .map(PathBuf::from),
            revocation_ttl_secs: parse_or(
                &lookup,
                "REVOCATION_TTL_SECS",
                defaults.revocation_ttl_secs,
            ),
        }
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            enable_cache: self.cache_size > 0,
            cache: CacheConfig {
                capacity: self.cache_size,
            },
        }
    }

    pub fn revocation_ttl(&self) -> Duration {
        Duration::from_secs(self.revocation_ttl_secs)
    }

    /// Read the configured model file, or the built-in model
    pub fn model_definition(&self) -> Result<ModelDefinition> {
        match &self.model_path {
            Some(path) => {
                info!("Loading authorization model from {}", path.display());
                ModelDefinition::from_path(path)
            }
            None => {
                info!("Loading built-in authorization model");
                ModelDefinition::builtin()
            }
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Copy + std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring invalid {}={:?}, using {}", key, raw, default);
            default
        }),
        None => default,
    }
}
