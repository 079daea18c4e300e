//! Gateway composition root and boundary operations.
//!
//! # Responsibilities
//! - Own the rail table, the builder, the broadcaster, the oracle and the caches
//! - Parse caller input into typed intents before any external call
//! - Convert internal errors into boundary statuses, logging them once
//!
//! # Caching
//! Oracle answers are keyed `symbol-reference-pool`, creation answers
//! `symbol-<intents>`. Only terminal or successful answers are stored.

use alloy::primitives::{Address, TxHash, U256};
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::blockchain::rail::{FeePriceSource, RailClient, TransferSource};
use crate::cache::{CacheStats, FeePriceCache, ResultCache};
use crate::config::{ConfigError, GatewayConfig};
use crate::error::{GatewayError, GatewayResult};
use crate::gateway::dispatcher::RailDispatcher;
use crate::gateway::signature;
use crate::gateway::types::{
    CreateTransactionResponse, FeeQuote, OperationStatus, OracleResult, SignAndSendResponse,
    TransferRequest,
};
use crate::observability::metrics;
use crate::rails::{AssetRail, Broadcaster, ConfirmationOracle, TransferIntent, TxBuilder, UnsignedTransaction};

/// Liveness snapshot served by the health endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_height: Option<u64>,
    pub fee_price_cache: CacheSnapshot,
    pub oracle_cache: CacheSnapshot,
    pub create_cache: CacheSnapshot,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CacheSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
}

impl From<CacheStats> for CacheSnapshot {
    fn from(stats: CacheStats) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            hit_rate: stats.hit_rate(),
        }
    }
}

pub struct Gateway {
    dispatcher: RailDispatcher,
    client: Arc<dyn RailClient>,
    builder: TxBuilder,
    broadcaster: Broadcaster,
    oracle: ConfirmationOracle,
    fee_cache: Arc<FeePriceCache>,
    oracle_cache: ResultCache<OracleResult>,
    create_cache: ResultCache<CreateTransactionResponse>,
}

impl Gateway {
    /// Wire the gateway from configuration and its external collaborators.
    pub fn new(
        config: &GatewayConfig,
        client: Arc<dyn RailClient>,
        fee_source: Arc<dyn FeePriceSource>,
        transfer_source: Option<Arc<dyn TransferSource>>,
    ) -> Result<Self, ConfigError> {
        let dispatcher = RailDispatcher::from_config(config)?;
        let fee_cache = Arc::new(FeePriceCache::new(
            fee_source,
            Duration::from_secs(config.cache.fee_price_ttl_secs),
        ));
        let result_ttl = Duration::from_secs(config.cache.result_ttl_secs);

        Ok(Self {
            dispatcher,
            builder: TxBuilder::new(
                client.clone(),
                fee_cache.clone(),
                config.blockchain.chain_id,
                config.blockchain.max_fee_price_gwei,
            ),
            broadcaster: Broadcaster::new(client.clone()),
            oracle: ConfirmationOracle::new(client.clone(), transfer_source),
            client,
            fee_cache,
            oracle_cache: ResultCache::new("oracle", result_ttl),
            create_cache: ResultCache::new("create", result_ttl),
        })
    }

    /// Resolve `symbol` to its rail.
    pub fn rail(&self, symbol: &str) -> GatewayResult<&AssetRail> {
        self.dispatcher.rail(symbol)
    }

    /// Finality-aware status of `reference` as a payment into `pool_address`.
    ///
    /// Only an unknown symbol is an `Err`; lookup failures come back as an
    /// `ERROR` result and are not cached.
    pub async fn get_transaction_information(
        &self,
        reference: &str,
        pool_address: &str,
        symbol: &str,
    ) -> GatewayResult<OracleResult> {
        let rail = self.dispatcher.rail(symbol)?;
        let key = oracle_key(rail, reference, pool_address);

        let result = self
            .oracle_cache
            .get_or_try_insert_with(key, || self.oracle.resolve(rail, reference, pool_address))
            .await;

        Ok(result.unwrap_or_else(|e| {
            tracing::warn!(symbol = %rail.symbol, reference = %reference, error = %e, "Transaction info unavailable");
            OracleResult::error()
        }))
    }

    /// Whether `signature` over the digest `message` recovers to one of `addresses`.
    pub fn validate_signature(
        &self,
        message: &str,
        addresses: &[String],
        signature: &str,
        symbol: &str,
    ) -> GatewayResult<bool> {
        self.dispatcher.rail(symbol)?;
        Ok(signature::validate_signature(message, addresses, signature))
    }

    /// Build unsigned transactions and their signing hashes.
    pub async fn create_transaction(
        &self,
        requests: &[TransferRequest],
        symbol: &str,
    ) -> CreateTransactionResponse {
        match self.try_create_transaction(requests, symbol).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(symbol = %symbol, error = %e, "Transaction creation failed");
                CreateTransactionResponse::status_only(e.status())
            }
        }
    }

    async fn try_create_transaction(
        &self,
        requests: &[TransferRequest],
        symbol: &str,
    ) -> GatewayResult<CreateTransactionResponse> {
        let rail = self.dispatcher.rail(symbol)?;
        let intents = parse_intents(requests)?;
        let key = creation_key(rail, &intents);

        self.create_cache
            .get_or_try_insert_with(key, || self.build_response(rail, &intents))
            .await
    }

    async fn build_response(
        &self,
        rail: &AssetRail,
        intents: &[TransferIntent],
    ) -> GatewayResult<CreateTransactionResponse> {
        let batch = self.builder.build(rail, intents).await?;
        metrics::record_transactions_created(&rail.symbol, batch.transactions.len());

        if batch.transactions.is_empty() {
            return Ok(CreateTransactionResponse {
                failed_indexes: batch.failed_indexes,
                ..CreateTransactionResponse::status_only(OperationStatus::InsufficientFunds)
            });
        }
        Ok(CreateTransactionResponse {
            status: OperationStatus::Ok,
            signing_hashes: Some(batch.signing_hashes.iter().map(|h| h.to_string()).collect()),
            partial_tx: Some(batch.transactions),
            failed_indexes: batch.failed_indexes,
        })
    }

    /// Reattach signatures and submit every transaction.
    pub async fn sign_and_send_transaction(
        &self,
        transactions: &[UnsignedTransaction],
        signing_hashes: &[String],
        signatures: &[String],
    ) -> SignAndSendResponse {
        let outcome = match self
            .broadcaster
            .broadcast(transactions, signing_hashes, signatures)
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(error = %e, "Signed bundle rejected");
                return SignAndSendResponse::status_only(e.status());
            }
        };

        let status = if outcome.all_submitted() {
            OperationStatus::Ok
        } else {
            OperationStatus::Error
        };
        SignAndSendResponse {
            status,
            references: Some(outcome.submitted()),
            failed_indexes: outcome.failed_indexes,
        }
    }

    /// Fee quote in the native asset: raw fee price × the rail's quote units.
    pub async fn get_transaction_fee(&self, symbol: &str) -> FeeQuote {
        let native_symbol = self.dispatcher.native().symbol.clone();
        match self.quote_fee(symbol).await {
            Ok(amount) => FeeQuote {
                status: OperationStatus::Ok,
                symbol: native_symbol,
                amount: Some(amount),
            },
            Err(e) => {
                tracing::warn!(symbol = %symbol, error = %e, "Fee quote unavailable");
                FeeQuote {
                    status: e.status(),
                    symbol: native_symbol,
                    amount: None,
                }
            }
        }
    }

    async fn quote_fee(&self, symbol: &str) -> GatewayResult<U256> {
        let rail = self.dispatcher.rail(symbol)?;
        let price = self.fee_cache.get().await.map_err(GatewayError::FeePriceUnavailable)?;
        U256::from(price)
            .checked_mul(U256::from(rail.policy.fee_quote_units))
            .ok_or(GatewayError::Overflow("fee quote"))
    }

    pub async fn health(&self) -> HealthReport {
        let chain_height = match self.client.get_chain_height().await {
            Ok(height) => Some(height),
            Err(e) => {
                tracing::warn!(error = %e, "Health probe failed");
                None
            }
        };
        metrics::record_rpc_health(chain_height.is_some());
        HealthReport {
            healthy: chain_height.is_some(),
            chain_height,
            fee_price_cache: self.fee_cache.stats().into(),
            oracle_cache: self.oracle_cache.stats().into(),
            create_cache: self.create_cache.stats().into(),
        }
    }
}

/// Parse caller requests, rejecting the batch on the first bad field.
pub fn parse_intents(requests: &[TransferRequest]) -> GatewayResult<Vec<TransferIntent>> {
    if requests.is_empty() {
        return Err(GatewayError::EmptyBatch);
    }
    requests
        .iter()
        .enumerate()
        .map(|(index, request)| {
            let from = Address::from_str(request.from_address.trim()).map_err(|_| {
                GatewayError::InvalidSenderAddress {
                    index,
                    value: request.from_address.clone(),
                }
            })?;
            let to = Address::from_str(request.to_address.trim()).map_err(|_| {
                GatewayError::InvalidReceiverAddress {
                    index,
                    value: request.to_address.clone(),
                }
            })?;
            let amount = U256::from_str(request.amount.trim()).map_err(|_| GatewayError::InvalidAmount {
                index,
                value: request.amount.clone(),
            })?;
            Ok(TransferIntent { from, to, amount })
        })
        .collect()
}

/// Cache identity of an oracle query. Parseable references and pool
/// addresses are keyed by value so that hex casing does not split entries.
fn oracle_key(rail: &AssetRail, reference: &str, pool_address: &str) -> String {
    let reference = TxHash::from_str(reference.trim())
        .map(|hash| hash.to_string())
        .unwrap_or_else(|_| reference.to_string());
    let pool = Address::from_str(pool_address.trim())
        .map(|address| address.to_string())
        .unwrap_or_else(|_| pool_address.to_string());
    format!("{}-{}-{}", rail.symbol, reference, pool)
}

/// Cache identity of a creation request, built from the parsed intents so
/// that address casing does not split entries.
fn creation_key(rail: &AssetRail, intents: &[TransferIntent]) -> String {
    let body: Vec<String> = intents
        .iter()
        .map(|i| format!("{}:{}:{}", i.from, i.to, i.amount))
        .collect();
    format!("{}-[{}]", rail.symbol, body.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(from: &str, to: &str, amount: &str) -> TransferRequest {
        TransferRequest {
            from_address: from.into(),
            to_address: to.into(),
            amount: amount.into(),
        }
    }

    const A: &str = "0x00000000000000000000000000000000000000f0";
    const B: &str = "0x00000000000000000000000000000000000000aa";

    #[test]
    fn test_parse_intents() {
        let intents = parse_intents(&[request(A, B, "100"), request(A, B, "0x10")]).unwrap();
        assert_eq!(intents[0].amount, U256::from(100u64));
        assert_eq!(intents[1].amount, U256::from(16u64));
    }

    #[test]
    fn test_parse_rejects_bad_fields() {
        assert!(matches!(
            parse_intents(&[request(A, B, "1"), request("0xzz", B, "1")]),
            Err(GatewayError::InvalidSenderAddress { index: 1, .. })
        ));
        assert!(matches!(
            parse_intents(&[request(A, "bob", "1")]),
            Err(GatewayError::InvalidReceiverAddress { index: 0, .. })
        ));
        assert!(matches!(
            parse_intents(&[request(A, B, "-5")]),
            Err(GatewayError::InvalidAmount { index: 0, .. })
        ));
        assert!(matches!(parse_intents(&[]), Err(GatewayError::EmptyBatch)));
    }

    #[test]
    fn test_oracle_key_ignores_hex_case() {
        let rail = AssetRail::native(
            "ETH",
            18,
            crate::rails::RailPolicy {
                fee_limit: 21_000,
                fee_price_multiplier_percent: 120,
                required_confirmations: 6,
                fee_quote_units: 27_300,
            },
        );
        let reference = "0x00000000000000000000000000000000000000000000000000000000000000ab";
        let upper_reference = "0x00000000000000000000000000000000000000000000000000000000000000AB";
        let upper_pool = B.to_uppercase().replace("0X", "0x");
        assert_eq!(
            oracle_key(&rail, reference, B),
            oracle_key(&rail, upper_reference, &upper_pool)
        );
        // unparseable input is keyed as given
        assert_eq!(oracle_key(&rail, "0xnope", "pool"), "ETH-0xnope-pool");
    }

    #[test]
    fn test_creation_key_ignores_address_case() {
        let rail = AssetRail::native(
            "ETH",
            18,
            crate::rails::RailPolicy {
                fee_limit: 21_000,
                fee_price_multiplier_percent: 120,
                required_confirmations: 6,
                fee_quote_units: 27_300,
            },
        );
        let lower = parse_intents(&[request(A, B, "1")]).unwrap();
        let upper = parse_intents(&[request(&A.to_uppercase().replace("0X", "0x"), B, "1")]).unwrap();
        assert_eq!(creation_key(&rail, &lower), creation_key(&rail, &upper));
    }
}
