// Service configuration
//
// Everything comes from the environment (after `.env` is loaded), with
// defaults that run the react strategy on port 9000.

use std::time::Duration;

use orchestrator_core::{RouterConfig, StrategyKind};
use thiserror::Error;

const DEFAULT_ADDR: &str = "0.0.0.0:9000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {var}: {message}")]
    Invalid { var: &'static str, message: String },
}

/// Configuration for the HTTP service
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind (ORCHESTRATOR_ADDR)
    pub addr: String,
    /// Optional route prefix (API_PREFIX), e.g. "/api"
    pub api_prefix: String,
    pub router: RouterConfig,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let strategy = match get("ORCHESTRATOR_STRATEGY") {
            Some(raw) => raw.parse::<StrategyKind>().map_err(|message| ConfigError::Invalid {
                var: "ORCHESTRATOR_STRATEGY",
                message,
            })?,
            None => StrategyKind::default(),
        };

        let mut builder = RouterConfig::builder().strategy(strategy);

        if let Some(raw) = get("ORCHESTRATOR_STREAM_INTERVAL_MS") {
            let millis = raw.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
                var: "ORCHESTRATOR_STREAM_INTERVAL_MS",
                message: e.to_string(),
            })?;
            builder = builder.stream_interval(Duration::from_millis(millis));
        }

        if let Some(tool) = get("ORCHESTRATOR_ANSWER_TOOL") {
            builder = builder.answer_tool(tool);
        }

        Ok(Self {
            addr: get("ORCHESTRATOR_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string()),
            api_prefix: lookup("API_PREFIX").unwrap_or_default(),
            router: builder.build(),
        })
    }
}
