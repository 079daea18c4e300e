//! Symbol → rail resolution.

use alloy::primitives::Address;
use std::collections::HashMap;
use std::str::FromStr;

use crate::config::schema::GatewayConfig;
use crate::config::validation::ValidationError;
use crate::config::ConfigError;
use crate::error::{GatewayError, GatewayResult};
use crate::rails::{AssetRail, RailPolicy};

/// Immutable symbol table built once at startup.
///
/// The native symbol matches exactly; token symbols match case-insensitively.
#[derive(Debug, Clone)]
pub struct RailDispatcher {
    native: AssetRail,
    /// Keyed by lowercased symbol.
    tokens: HashMap<String, AssetRail>,
}

impl RailDispatcher {
    pub fn new(native: AssetRail, tokens: impl IntoIterator<Item = AssetRail>) -> Self {
        let tokens = tokens
            .into_iter()
            .map(|rail| (rail.symbol.to_lowercase(), rail))
            .collect();
        Self { native, tokens }
    }

    pub fn from_config(config: &GatewayConfig) -> Result<Self, ConfigError> {
        let native = &config.native;
        let native_rail = AssetRail::native(
            native.symbol.clone(),
            native.decimals,
            RailPolicy {
                fee_limit: native.fee_limit,
                fee_price_multiplier_percent: native.fee_price_multiplier_percent,
                required_confirmations: native.required_confirmations,
                fee_quote_units: native.fee_quote_units,
            },
        );

        let tokens = &config.tokens;
        let token_policy = RailPolicy {
            fee_limit: tokens.fee_limit,
            fee_price_multiplier_percent: tokens.fee_price_multiplier_percent,
            required_confirmations: tokens.required_confirmations,
            fee_quote_units: tokens.fee_quote_units,
        };

        let mut rails = Vec::with_capacity(tokens.supported.len());
        let mut errors = Vec::new();
        for (i, token) in tokens.supported.iter().enumerate() {
            // A symbol that is itself an address names its own contract.
            let raw = token.contract_address.as_deref().unwrap_or(&token.symbol);
            match Address::from_str(raw.trim()) {
                Ok(contract) => rails.push(AssetRail::contract_call(
                    token.symbol.clone(),
                    contract,
                    token.decimals,
                    token_policy,
                )),
                Err(_) => errors.push(ValidationError::new(
                    format!("tokens.supported[{}]", i),
                    format!("no contract address for {}", token.symbol),
                )),
            }
        }
        if !errors.is_empty() {
            return Err(ConfigError::Validation(errors));
        }

        let dispatcher = Self::new(native_rail, rails);
        for rail in std::iter::once(&dispatcher.native).chain(dispatcher.tokens.values()) {
            tracing::debug!(
                symbol = %rail.symbol,
                kind = ?rail.kind,
                decimals = rail.decimals,
                confirmations = rail.policy.required_confirmations,
                "Rail registered"
            );
        }
        tracing::info!(
            native = %dispatcher.native.symbol,
            tokens = dispatcher.tokens.len(),
            "Rails configured"
        );
        Ok(dispatcher)
    }

    /// Resolve `symbol`, failing before any external call when unknown.
    pub fn rail(&self, symbol: &str) -> GatewayResult<&AssetRail> {
        if symbol == self.native.symbol {
            return Ok(&self.native);
        }
        self.tokens
            .get(&symbol.to_lowercase())
            .ok_or_else(|| GatewayError::UnsupportedSymbol(symbol.to_string()))
    }

    pub fn native(&self) -> &AssetRail {
        &self.native
    }
}
