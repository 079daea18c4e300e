//! Blockchain RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - Connect to JSON-RPC endpoint
//! - Query chain state (block number, nonces, transactions, receipts)
//! - Submit raw transactions
//! - Handle timeouts and network errors gracefully

use alloy::consensus::Transaction as _;
use alloy::network::TransactionResponse;
use alloy::primitives::{Address, Bytes, TxHash};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::Transaction;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::blockchain::rail::{FeePriceSource, RailClient};
use crate::blockchain::types::{
    BlockchainConfig, BlockchainError, BlockchainResult, ChainId, LedgerRecord,
};
use crate::observability::metrics;

/// Blockchain RPC client wrapper with failover support.
///
/// Reads fail over across every configured endpoint. Submission only ever
/// goes to the primary so a raw transaction is sent exactly once.
#[derive(Clone)]
pub struct BlockchainClient {
    /// List of providers (primary + failovers).
    providers: Vec<Arc<dyn Provider + Send + Sync>>,
    /// Configuration.
    config: BlockchainConfig,
    /// Request timeout duration.
    timeout_duration: Duration,
}

impl BlockchainClient {
    /// Create a new blockchain client.
    ///
    /// # Arguments
    /// * `config` - Blockchain configuration
    ///
    /// # Returns
    /// A new client or error if the primary URL is malformed
    pub async fn new(config: BlockchainConfig) -> BlockchainResult<Self> {
        let timeout_duration = Duration::from_secs(config.rpc_timeout_secs);
        let mut providers = Vec::new();

        // 1. Add primary provider
        let primary_url: url::Url = config.rpc_url.parse().map_err(|e| {
            BlockchainError::Rpc(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;
        providers.push(Arc::new(ProviderBuilder::new().connect_http(primary_url)) as Arc<dyn Provider + Send + Sync>);

        // 2. Add failover providers
        for url_str in &config.failover_urls {
            if let Ok(url) = url_str.parse() {
                providers.push(Arc::new(ProviderBuilder::new().connect_http(url)) as Arc<dyn Provider + Send + Sync>);
            } else {
                tracing::warn!(url = %url_str, "Ignoring invalid failover RPC URL");
            }
        }

        let client = Self {
            providers,
            config: config.clone(),
            timeout_duration,
        };

        // Verify chain ID matches configuration
        match client.verify_chain_id().await {
            Ok(()) => {
                tracing::info!(
                    rpc_url = %config.rpc_url,
                    chain_id = config.chain_id,
                    "Blockchain client initialized"
                );
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Blockchain client initialized but chain verification failed"
                );
                // Don't fail initialization - allow graceful degradation
            }
        }

        Ok(client)
    }

    /// Verify the connected chain ID matches configuration.
    ///
    /// A configured chain ID of 0 means "pre-EIP-155" and skips the check.
    pub async fn verify_chain_id(&self) -> BlockchainResult<()> {
        if self.config.chain_id == 0 {
            return Ok(());
        }
        let chain_id = self.get_chain_id().await?;
        if chain_id.0 != self.config.chain_id {
            return Err(BlockchainError::ChainMismatch {
                expected: self.config.chain_id,
                actual: chain_id.0,
            });
        }
        Ok(())
    }

    /// Get the chain ID from the RPC.
    pub async fn get_chain_id(&self) -> BlockchainResult<ChainId> {
        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.get_chain_id();
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(result)) => return Ok(ChainId(result)),
                Ok(Err(e)) => {
                    tracing::warn!(provider_idx = i, error = %e, "RPC error, trying next provider");
                }
                Err(_) => {
                    tracing::warn!(provider_idx = i, "RPC timeout, trying next provider");
                }
            }
        }
        Err(BlockchainError::Rpc("All RPC providers failed".to_string()))
    }

    /// Get the latest block number.
    pub async fn get_block_number(&self) -> BlockchainResult<u64> {
        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.get_block_number();
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => tracing::warn!(provider_idx = i, error = %e, "RPC error"),
                Err(_) => tracing::warn!(provider_idx = i, "RPC timeout"),
            }
        }
        Err(BlockchainError::Rpc("All providers failed to get block number".to_string()))
    }

    /// Get the transaction count (nonce) for an address.
    pub async fn get_transaction_count(&self, address: Address) -> BlockchainResult<u64> {
        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.get_transaction_count(address);
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => tracing::warn!(provider_idx = i, error = %e, "RPC error"),
                Err(_) => tracing::warn!(provider_idx = i, "RPC timeout"),
            }
        }
        Err(BlockchainError::Rpc("All providers failed to get transaction count".to_string()))
    }

    /// Get a transaction by hash.
    pub async fn get_transaction(&self, tx_hash: TxHash) -> BlockchainResult<Option<Transaction>> {
        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.get_transaction_by_hash(tx_hash);
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => tracing::warn!(provider_idx = i, error = %e, "RPC error"),
                Err(_) => tracing::warn!(provider_idx = i, "RPC timeout"),
            }
        }
        Err(BlockchainError::Rpc("All providers failed to get transaction".to_string()))
    }

    /// Get the receipt status of a mined transaction.
    pub async fn get_receipt_status(&self, tx_hash: TxHash) -> BlockchainResult<Option<bool>> {
        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.get_transaction_receipt(tx_hash);
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(result)) => return Ok(result.map(|r| r.status())),
                Ok(Err(e)) => tracing::warn!(provider_idx = i, error = %e, "RPC error"),
                Err(_) => tracing::warn!(provider_idx = i, "RPC timeout"),
            }
        }
        Err(BlockchainError::Rpc("All providers failed to get receipt".to_string()))
    }

    /// Get current gas price in wei.
    pub async fn get_gas_price(&self) -> BlockchainResult<u128> {
        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.get_gas_price();
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => tracing::warn!(provider_idx = i, error = %e, "RPC error"),
                Err(_) => tracing::warn!(provider_idx = i, "RPC timeout"),
            }
        }
        Err(BlockchainError::Rpc("All providers failed to get gas price".to_string()))
    }

    /// Send an encoded transaction through the primary provider.
    pub async fn send_raw_transaction(&self, raw: &[u8]) -> BlockchainResult<TxHash> {
        let fut = self.providers[0].send_raw_transaction(raw);
        match timeout(self.timeout_duration, fut).await {
            Ok(Ok(pending)) => Ok(*pending.tx_hash()),
            Ok(Err(e)) => Err(BlockchainError::Submission(e.to_string())),
            Err(_) => Err(BlockchainError::Timeout(self.config.rpc_timeout_secs)),
        }
    }
}

fn to_ledger_record(tx: &Transaction, succeeded: Option<bool>) -> LedgerRecord {
    LedgerRecord {
        from: TransactionResponse::from(tx),
        to: alloy::consensus::Transaction::to(tx),
        value: tx.value(),
        payload: tx.input().clone(),
        inclusion_height: tx.block_number,
        succeeded,
    }
}

#[async_trait]
impl RailClient for BlockchainClient {
    async fn get_nonce(&self, address: Address) -> BlockchainResult<u64> {
        let result = self.get_transaction_count(address).await;
        metrics::record_external_call("get_nonce", result.is_ok());
        result
    }

    async fn get_transaction_by_reference(
        &self,
        reference: TxHash,
    ) -> BlockchainResult<Option<LedgerRecord>> {
        let result = self.get_transaction(reference).await;
        metrics::record_external_call("get_transaction", result.is_ok());
        let Some(tx) = result? else {
            return Ok(None);
        };

        // Receipts only exist once mined
        let succeeded = if tx.block_number.is_some() {
            self.get_receipt_status(reference).await?
        } else {
            None
        };
        Ok(Some(to_ledger_record(&tx, succeeded)))
    }

    async fn get_chain_height(&self) -> BlockchainResult<u64> {
        let result = self.get_block_number().await;
        metrics::record_external_call("get_block_number", result.is_ok());
        result
    }

    async fn submit_raw_transaction(&self, raw: Bytes) -> BlockchainResult<TxHash> {
        let result = self.send_raw_transaction(&raw).await;
        metrics::record_external_call("send_raw_transaction", result.is_ok());
        result
    }
}

#[async_trait]
impl FeePriceSource for BlockchainClient {
    async fn get_current_fee_price(&self) -> BlockchainResult<u128> {
        let result = self.get_gas_price().await;
        metrics::record_external_call("get_gas_price", result.is_ok());
        result
    }
}

impl std::fmt::Debug for BlockchainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockchainClient")
            .field("rpc_url", &self.config.rpc_url)
            .field("chain_id", &self.config.chain_id)
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}
