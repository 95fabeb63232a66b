//! Application configuration and tracing setup
//!
//! Sources are layered: built-in defaults, then `config/default.*`, then
//! `config/{RUN_ENV}.*`, then `APP__*` environment variables.

use std::env;

use config::{builder::DefaultState, Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use tracing::info;

use crate::cart::service::CartPolicy;

const CONFIG_DIR: &str = "config";
const DEFAULT_ENV: &str = "development";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_MAX_MUTATION_RETRIES: u32 = 16;

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,

    /// Level for this crate when `RUST_LOG` is unset
    pub log_level: String,

    /// Emit JSON log lines instead of the human format
    pub log_json: bool,

    /// Compare-and-swap attempts per cart mutation
    pub max_mutation_retries: u32,

    /// Clearing a cart counts as a purchase for buyer counters
    pub count_cleared_as_purchase: bool,

    /// Load the demo products into the in-memory catalog at startup
    pub seed_demo_products: bool,

    /// Append orders to this JSONL file; in-memory ledger when unset
    #[serde(default)]
    pub order_ledger_path: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_json: false,
            max_mutation_retries: DEFAULT_MAX_MUTATION_RETRIES,
            count_cleared_as_purchase: true,
            seed_demo_products: true,
            order_ledger_path: None,
        }
    }
}

impl AppConfig {
    pub fn policy(&self) -> CartPolicy {
        CartPolicy {
            max_mutation_retries: self.max_mutation_retries,
            count_cleared_as_purchase: self.count_cleared_as_purchase,
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("host", DEFAULT_HOST)?
        .set_default("port", i64::from(DEFAULT_PORT))?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .set_default("max_mutation_retries", i64::from(DEFAULT_MAX_MUTATION_RETRIES))?
        .set_default("count_cleared_as_purchase", true)?
        .set_default("seed_demo_products", true)
}

/// Loads application configuration from all layered sources.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    let config = with_defaults()?
        .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
        .add_source(File::with_name(&format!("{}/{}", CONFIG_DIR, run_env)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    config.try_deserialize()
}

/// Installs the global tracing subscriber. `RUST_LOG` wins over `level`.
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_directive = format!("cart_core={},tower_http=debug", level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    if json {
        let _ = fmt()
            .with_env_filter(EnvFilter::new(filter_directive))
            .json()
            .try_init();
    } else {
        let _ = fmt()
            .with_env_filter(EnvFilter::new(filter_directive))
            .try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_struct_default() {
        let cfg: AppConfig = with_defaults()
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.bind_address(), "0.0.0.0:8000");
    }

    #[test]
    fn overrides_flow_into_policy() {
        let cfg: AppConfig = with_defaults()
            .unwrap()
            .set_override("max_mutation_retries", 3)
            .unwrap()
            .set_override("count_cleared_as_purchase", false)
            .unwrap()
            .set_override("order_ledger_path", "/tmp/orders.jsonl")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        let policy = cfg.policy();
        assert_eq!(policy.max_mutation_retries, 3);
        assert!(!policy.count_cleared_as_purchase);
        assert_eq!(cfg.order_ledger_path.as_deref(), Some("/tmp/orders.jsonl"));
    }
}
