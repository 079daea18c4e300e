//! Narrow interfaces the gateway core uses to reach a rail.
//!
//! Everything behind these traits is I/O: node RPC, a fee oracle, an
//! external transfer index. Implementations must bound every call with a
//! timeout and must not retry submissions on their own.

use alloy::primitives::{Address, Bytes, TxHash};
use async_trait::async_trait;

use crate::blockchain::types::{BlockchainResult, LedgerRecord, TransferRecord};

/// Per-chain RPC surface needed to build, submit and confirm transfers.
#[async_trait]
pub trait RailClient: Send + Sync {
    /// Next nonce for `address` (latest block).
    async fn get_nonce(&self, address: Address) -> BlockchainResult<u64>;

    /// Look a transaction up by hash. `Ok(None)` means the ledger does not know it.
    async fn get_transaction_by_reference(
        &self,
        reference: TxHash,
    ) -> BlockchainResult<Option<LedgerRecord>>;

    /// Latest block number.
    async fn get_chain_height(&self) -> BlockchainResult<u64>;

    /// Submit a signed, encoded transaction and return its hash.
    async fn submit_raw_transaction(&self, raw: Bytes) -> BlockchainResult<TxHash>;
}

/// Source of the current per-unit fee price, in wei.
#[async_trait]
pub trait FeePriceSource: Send + Sync {
    async fn get_current_fee_price(&self) -> BlockchainResult<u128>;
}

/// External index of token transfers, keyed by rail symbol and reference.
#[async_trait]
pub trait TransferSource: Send + Sync {
    async fn lookup_transfer(
        &self,
        symbol: &str,
        reference: &str,
    ) -> BlockchainResult<Option<TransferRecord>>;
}
