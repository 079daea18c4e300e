//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the payment gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// HTTP listener configuration.
    pub listener: ListenerConfig,

    /// Chain RPC settings.
    pub blockchain: BlockchainConfig,

    /// Native coin rail.
    pub native: NativeRailConfig,

    /// Token rails sharing the contract-call encoding.
    pub tokens: TokenRailsConfig,

    /// Fee price and result cache lifetimes.
    pub cache: CacheConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:4000").
    pub bind_address: String,

    /// Whole-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:4000".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Blockchain RPC configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BlockchainConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs, used for reads only.
    pub failover_urls: Vec<String>,

    /// Chain ID used for EIP-155 signing hashes; 0 selects the legacy form.
    pub chain_id: u64,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Maximum raw fee price in gwei (protection against spikes).
    pub max_fee_price_gwei: u64,
}

impl Default for BlockchainConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            failover_urls: Vec::new(),
            chain_id: 1,
            rpc_timeout_secs: 5,
            max_fee_price_gwei: 500,
        }
    }
}

/// Native coin rail configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NativeRailConfig {
    /// Symbol matched exactly (case-sensitive).
    pub symbol: String,

    /// Decimal precision of the coin.
    pub decimals: u8,

    /// Fixed gas limit for every transfer on this rail.
    pub fee_limit: u64,

    /// Percentage applied to the raw fee price (120 = 20% buffer).
    pub fee_price_multiplier_percent: u64,

    /// Blocks required on top of the inclusion block before acceptance.
    pub required_confirmations: u64,

    /// Work units used when quoting a transfer fee to callers.
    pub fee_quote_units: u64,
}

impl Default for NativeRailConfig {
    fn default() -> Self {
        Self {
            symbol: "ETH".to_string(),
            decimals: 18,
            fee_limit: 21_000,
            fee_price_multiplier_percent: 120,
            required_confirmations: 6,
            fee_quote_units: 27_300,
        }
    }
}

/// A single allow-listed token.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenConfig {
    /// Symbol matched case-insensitively. May itself be the contract address.
    pub symbol: String,

    /// Token contract; defaults to `symbol` parsed as an address.
    #[serde(default)]
    pub contract_address: Option<String>,

    #[serde(default = "default_token_decimals")]
    pub decimals: u8,
}

fn default_token_decimals() -> u8 {
    18
}

/// Token (contract-call) rails configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TokenRailsConfig {
    /// Allow-listed tokens.
    pub supported: Vec<TokenConfig>,

    /// Optional external transfer index used by the confirmation oracle.
    pub transfer_api_url: Option<String>,

    /// Timeout for transfer index requests in seconds.
    pub transfer_api_timeout_secs: u64,

    pub fee_limit: u64,
    pub fee_price_multiplier_percent: u64,
    pub required_confirmations: u64,
    pub fee_quote_units: u64,
}

impl Default for TokenRailsConfig {
    fn default() -> Self {
        Self {
            supported: Vec::new(),
            transfer_api_url: None,
            transfer_api_timeout_secs: 5,
            fee_limit: 41_395,
            fee_price_multiplier_percent: 120,
            required_confirmations: 12,
            fee_quote_units: 180_000,
        }
    }
}

/// Cache lifetimes.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Fee price cache TTL in seconds.
    pub fee_price_ttl_secs: u64,

    /// Oracle and creation result cache TTL in seconds.
    pub result_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            fee_price_ttl_secs: 15,
            result_ttl_secs: 10,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Pretty for development, JSON for production.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rail_defaults() {
        let config = GatewayConfig::default();
        assert_eq!(config.native.symbol, "ETH");
        assert_eq!(config.native.fee_limit, 21_000);
        assert_eq!(config.native.required_confirmations, 6);
        assert_eq!(config.tokens.fee_limit, 41_395);
        assert_eq!(config.tokens.required_confirmations, 12);
        assert_eq!(config.cache.fee_price_ttl_secs, 15);
        assert_eq!(config.cache.result_ttl_secs, 10);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [native]
            required_confirmations = 3

            [[tokens.supported]]
            symbol = "USDC"
            contract_address = "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48"
            decimals = 6
            "#,
        )
        .unwrap();

        assert_eq!(config.native.required_confirmations, 3);
        assert_eq!(config.native.fee_limit, 21_000);
        assert_eq!(config.tokens.supported.len(), 1);
        assert_eq!(config.tokens.supported[0].decimals, 6);
        assert_eq!(config.tokens.fee_limit, 41_395);
        assert_eq!(config.observability.log_format, LogFormat::Pretty);
    }
}
