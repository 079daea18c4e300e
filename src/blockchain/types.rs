//! Chain-specific types and error definitions.

use alloy::primitives::{Address, Bytes, U256};
use thiserror::Error;

// Re-export BlockchainConfig from config module to avoid duplication
pub use crate::config::schema::BlockchainConfig;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

/// Errors that can occur while talking to a rail or one of its data sources.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// Raw transaction was rejected by the node.
    #[error("Submission rejected: {0}")]
    Submission(String),

    /// An external HTTP data source failed or answered garbage.
    #[error("Data source error: {0}")]
    DataSource(String),

    /// Fee price exceeded maximum allowed.
    #[error("Fee price {current_gwei} gwei exceeds maximum {max_gwei} gwei")]
    FeePriceTooHigh { current_gwei: u64, max_gwei: u64 },

    /// Chain configuration mismatch.
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

/// A transaction as the ledger reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerRecord {
    /// Sender.
    pub from: Address,
    /// Recipient; `None` for contract creation.
    pub to: Option<Address>,
    /// Native value moved.
    pub value: U256,
    /// Call data.
    pub payload: Bytes,
    /// Block the transaction was included in, if mined.
    pub inclusion_height: Option<u64>,
    /// Receipt status, if a receipt is available.
    pub succeeded: Option<bool>,
}

/// A token transfer as reported by an external transfer index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRecord {
    pub receiver: Address,
    pub amount: U256,
    pub sender: Address,
    pub block: Option<u64>,
    /// Token contract, when the source reports it.
    pub token: Option<Address>,
}
