//! Asset rails and the per-rail capabilities.
//!
//! # Data Flow
//! ```text
//! TransferIntent[]
//!     → builder.rs (fee price + base nonce once, encoder.rs per intent)
//!     → UnsignedTransaction[] + signing hashes      (caller signs externally)
//!     → broadcast.rs (reattach signatures, submit concurrently)
//!     → TxHash[]
//!
//! TxHash + pool address
//!     → oracle.rs (ledger or transfer index lookup, depth + destination check)
//!     → OracleResult
//! ```
//!
//! # Design Decisions
//! - Rails are a closed set (`RailKind`); behaviour differences are `match`es
//! - Policy (fee limit, multiplier, confirmations) is data, fixed at startup
//! - Amounts are `U256` end to end; no string arithmetic

pub mod broadcast;
pub mod builder;
pub mod encoder;
pub mod oracle;
pub mod transaction;

use alloy::primitives::{Address, U256};

pub use broadcast::{Broadcaster, BroadcastOutcome};
pub use builder::{BuiltBatch, TxBuilder};
pub use oracle::ConfirmationOracle;
pub use transaction::UnsignedTransaction;

/// How value moves on a rail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RailKind {
    /// Plain value transfer of the chain's coin.
    Native,
    /// ERC-20 style `transfer(address,uint256)` call against `contract`.
    ContractCall { contract: Address },
}

/// Pricing and finality policy of a rail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RailPolicy {
    pub fee_limit: u64,
    pub fee_price_multiplier_percent: u64,
    pub required_confirmations: u64,
    pub fee_quote_units: u64,
}

/// One supported asset rail. Immutable once configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRail {
    pub symbol: String,
    pub kind: RailKind,
    pub decimals: u8,
    pub policy: RailPolicy,
}

impl AssetRail {
    pub fn native(symbol: impl Into<String>, decimals: u8, policy: RailPolicy) -> Self {
        Self {
            symbol: symbol.into(),
            kind: RailKind::Native,
            decimals,
            policy,
        }
    }

    pub fn contract_call(
        symbol: impl Into<String>,
        contract: Address,
        decimals: u8,
        policy: RailPolicy,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            kind: RailKind::ContractCall { contract },
            decimals,
            policy,
        }
    }
}

/// A request to move `amount` from `from` to `to` on one rail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferIntent {
    pub from: Address,
    pub to: Address,
    pub amount: U256,
}
