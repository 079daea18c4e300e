//! Configuration loading from disk and environment.

use std::path::Path;
use std::fs;
use crate::config::schema::{GatewayConfig, TokenConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Overrides the RPC endpoint.
pub const ENV_RPC_URL: &str = "GATEWAY_RPC_URL";
/// Overrides the chain ID used for signing hashes.
pub const ENV_CHAIN_ID: &str = "GATEWAY_CHAIN_ID";
/// Overrides the HTTP bind address.
pub const ENV_BIND_ADDRESS: &str = "GATEWAY_BIND_ADDRESS";
/// Comma-separated token contract addresses appended to the allow-list.
pub const ENV_SUPPORTED_TOKENS: &str = "GATEWAY_SUPPORTED_TOKENS";
/// Overrides the external transfer index URL.
pub const ENV_TRANSFER_API_URL: &str = "GATEWAY_TRANSFER_API_URL";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Env { var: &'static str, message: String },
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Env { var, message } => write!(f, "Invalid {}: {}", var, message),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load configuration from an optional TOML file, apply environment
/// overrides, then validate.
pub fn load_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
            toml::from_str(&content).map_err(ConfigError::Parse)?
        }
        None => GatewayConfig::default(),
    };

    apply_env_overrides(&mut config, |var| std::env::var(var).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply overrides read through `lookup`, so tests don't touch the process env.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(ENV_RPC_URL) {
        config.blockchain.rpc_url = url;
    }
    if let Some(raw) = lookup(ENV_CHAIN_ID) {
        config.blockchain.chain_id = raw.trim().parse().map_err(|e| ConfigError::Env {
            var: ENV_CHAIN_ID,
            message: format!("{}", e),
        })?;
    }
    if let Some(addr) = lookup(ENV_BIND_ADDRESS) {
        config.listener.bind_address = addr;
    }
    if let Some(url) = lookup(ENV_TRANSFER_API_URL) {
        config.tokens.transfer_api_url = Some(url);
    }
    if let Some(list) = lookup(ENV_SUPPORTED_TOKENS) {
        for token in list.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let known = config
                .tokens
                .supported
                .iter()
                .any(|t| t.symbol.eq_ignore_ascii_case(token));
            if !known {
                config.tokens.supported.push(TokenConfig {
                    symbol: token.to_lowercase(),
                    contract_address: None,
                    decimals: 18,
                });
            }
        }
    }
    Ok(())
}
