//! Boundary of the gateway core.
//!
//! # Data Flow
//! ```text
//! symbol + caller input
//!     → dispatcher.rs (symbol → AssetRail, unknown symbols rejected here)
//!     → service.rs (parse, cache, call into rails/, map errors to statuses)
//!     → types.rs (response shapes)
//! ```

pub mod dispatcher;
pub mod service;
pub mod signature;
pub mod types;

pub use dispatcher::RailDispatcher;
pub use service::{Gateway, HealthReport};
pub use types::{
    ConfirmationStatus, CreateTransactionResponse, FeeQuote, OperationStatus, OracleResult,
    SignAndSendResponse, TransferRequest,
};
