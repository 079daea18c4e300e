//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check addresses and URLs parse
//! - Validate value ranges (timeouts > 0, multipliers >= 100)
//! - Detect symbol collisions between rails
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use alloy::primitives::Address;
use std::collections::HashSet;

use crate::config::schema::GatewayConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<std::net::SocketAddr>().is_err() {
        errors.push(ValidationError::new("listener.bind_address", "not a socket address"));
    }
    if config.blockchain.rpc_url.parse::<url::Url>().is_err() {
        errors.push(ValidationError::new("blockchain.rpc_url", "not a valid URL"));
    }
    for (i, failover) in config.blockchain.failover_urls.iter().enumerate() {
        if failover.parse::<url::Url>().is_err() {
            errors.push(ValidationError::new(
                format!("blockchain.failover_urls[{}]", i),
                "not a valid URL",
            ));
        }
    }
    if config.blockchain.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new("blockchain.rpc_timeout_secs", "must be > 0"));
    }

    if config.native.symbol.is_empty() {
        errors.push(ValidationError::new("native.symbol", "must not be empty"));
    }
    check_policy(
        "native",
        config.native.fee_limit,
        config.native.fee_price_multiplier_percent,
        &mut errors,
    );
    check_policy(
        "tokens",
        config.tokens.fee_limit,
        config.tokens.fee_price_multiplier_percent,
        &mut errors,
    );

    let mut seen = HashSet::new();
    seen.insert(config.native.symbol.to_lowercase());
    for (i, token) in config.tokens.supported.iter().enumerate() {
        let field = format!("tokens.supported[{}]", i);
        if !seen.insert(token.symbol.to_lowercase()) {
            errors.push(ValidationError::new(
                &field,
                format!("duplicate symbol '{}'", token.symbol),
            ));
        }
        let contract = token.contract_address.as_deref().unwrap_or(&token.symbol);
        if contract.parse::<Address>().is_err() {
            errors.push(ValidationError::new(
                field,
                "contract_address missing and symbol is not an address",
            ));
        }
    }

    if let Some(api) = &config.tokens.transfer_api_url {
        if api.parse::<url::Url>().is_err() {
            errors.push(ValidationError::new("tokens.transfer_api_url", "not a valid URL"));
        }
    }
    if config.tokens.transfer_api_timeout_secs == 0 {
        errors.push(ValidationError::new("tokens.transfer_api_timeout_secs", "must be > 0"));
    }
    if config.cache.fee_price_ttl_secs == 0 {
        errors.push(ValidationError::new("cache.fee_price_ttl_secs", "must be > 0"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_policy(section: &str, fee_limit: u64, multiplier: u64, errors: &mut Vec<ValidationError>) {
    if fee_limit == 0 {
        errors.push(ValidationError::new(format!("{}.fee_limit", section), "must be > 0"));
    }
    // Pricing below the node estimate leaves transactions stuck
    if multiplier < 100 {
        errors.push(ValidationError::new(
            format!("{}.fee_price_multiplier_percent", section),
            "must be >= 100",
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::TokenConfig;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&GatewayConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = GatewayConfig::default();
        config.blockchain.rpc_timeout_secs = 0;
        config.native.fee_price_multiplier_percent = 90;
        config.tokens.fee_limit = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().any(|e| e.field == "native.fee_price_multiplier_percent"));
    }

    #[test]
    fn test_token_address_rules() {
        let mut config = GatewayConfig::default();
        config.tokens.supported = vec![
            // symbol doubles as the contract address
            TokenConfig {
                symbol: "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48".into(),
                contract_address: None,
                decimals: 6,
            },
            TokenConfig {
                symbol: "DAI".into(),
                contract_address: None,
                decimals: 18,
            },
            TokenConfig {
                symbol: "eth".into(),
                contract_address: Some("0x6b175474e89094c44da98b954eedeac495271d0f".into()),
                decimals: 18,
            },
        ];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].to_string().contains("tokens.supported[1]"));
        assert!(errors[1].message.contains("duplicate symbol"));
    }
}
