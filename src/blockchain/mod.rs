//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! config (RPC URL, chain ID, transfer index URL)
//!     → client.rs (RPC connection with timeouts and read failover)
//!     → transfer_source.rs (external token-transfer index over HTTP)
//!     → rail.rs traits consumed by the gateway core
//! ```
//!
//! # Security Constraints
//! - No private keys: the gateway only produces signing hashes
//! - All RPC and HTTP calls have configurable timeouts
//! - Raw transactions are submitted once, never retried here

pub mod client;
pub mod rail;
pub mod transfer_source;
pub mod types;

pub use client::BlockchainClient;
pub use rail::{FeePriceSource, RailClient, TransferSource};
pub use transfer_source::HttpTransferSource;
pub use types::{BlockchainConfig, BlockchainError, ChainId, LedgerRecord, TransferRecord};
