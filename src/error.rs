//! Gateway error taxonomy and its mapping onto boundary statuses.

use thiserror::Error;

use crate::blockchain::types::BlockchainError;
use crate::gateway::types::OperationStatus;

/// Errors raised by the gateway core.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Symbol is neither the native rail nor an allow-listed token.
    #[error("Unsupported symbol: {0}")]
    UnsupportedSymbol(String),

    /// Create request without intents.
    #[error("No transfer intents supplied")]
    EmptyBatch,

    #[error("Invalid receiver address at index {index}: {value}")]
    InvalidReceiverAddress { index: usize, value: String },

    #[error("Invalid sender address at index {index}: {value}")]
    InvalidSenderAddress { index: usize, value: String },

    /// Nonces are sequenced per sender, so a batch must have exactly one.
    #[error("Intent {index} has a different sender than intent 0")]
    MixedSenders { index: usize },

    #[error("Invalid amount at index {index}: {value}")]
    InvalidAmount { index: usize, value: String },

    /// Signature bundle is malformed or does not match its transactions.
    #[error("Invalid signatures: {0}")]
    InvalidSignatures(String),

    #[error("Invalid pool address: {0}")]
    InvalidPoolAddress(String),

    #[error("Fee price unavailable: {0}")]
    FeePriceUnavailable(#[source] BlockchainError),

    #[error("Fee price rejected: {0}")]
    FeePriceRejected(#[source] BlockchainError),

    #[error("Nonce unavailable: {0}")]
    NonceUnavailable(#[source] BlockchainError),

    /// A transient lookup failure; the caller may retry.
    #[error("Lookup failed: {0}")]
    Lookup(#[source] BlockchainError),

    /// Fee or nonce arithmetic left the representable range.
    #[error("Arithmetic overflow computing {0}")]
    Overflow(&'static str),
}

impl GatewayError {
    /// Boundary status reported for this error.
    pub fn status(&self) -> OperationStatus {
        match self {
            GatewayError::UnsupportedSymbol(_) => OperationStatus::UnsupportedSymbol,
            GatewayError::InvalidReceiverAddress { .. } => OperationStatus::InvalidReceiverAddress,
            GatewayError::InvalidSenderAddress { .. } | GatewayError::MixedSenders { .. } => {
                OperationStatus::InvalidSenderAddress
            }
            GatewayError::InvalidSignatures(_) => OperationStatus::InvalidSignatures,
            GatewayError::EmptyBatch
            | GatewayError::InvalidAmount { .. }
            | GatewayError::InvalidPoolAddress(_)
            | GatewayError::FeePriceUnavailable(_)
            | GatewayError::FeePriceRejected(_)
            | GatewayError::NonceUnavailable(_)
            | GatewayError::Lookup(_)
            | GatewayError::Overflow(_) => OperationStatus::Error,
        }
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            GatewayError::UnsupportedSymbol("DOGE".into()).status(),
            OperationStatus::UnsupportedSymbol
        );
        assert_eq!(
            GatewayError::MixedSenders { index: 2 }.status(),
            OperationStatus::InvalidSenderAddress
        );
        assert_eq!(
            GatewayError::NonceUnavailable(BlockchainError::Timeout(5)).status(),
            OperationStatus::Error
        );
    }

    #[test]
    fn test_source_is_preserved() {
        use std::error::Error;
        let err = GatewayError::FeePriceUnavailable(BlockchainError::Rpc("down".into()));
        assert_eq!(err.source().unwrap().to_string(), "RPC error: down");
    }
}
