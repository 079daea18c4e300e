//! Boundary request and response types.
//!
//! Field names follow the gateway's published JSON contract (camelCase,
//! amounts as decimal strings, `partialTx`/`tosign` for unsigned bundles).

use alloy::primitives::{Address, TxHash, U256};
use serde::{Deserialize, Serialize};

use crate::rails::transaction::{dec_string, UnsignedTransaction};

/// Status of a create, send or fee operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationStatus {
    Ok,
    Error,
    InsufficientFunds,
    InvalidSignatures,
    UnsupportedSymbol,
    InvalidReceiverAddress,
    InvalidSenderAddress,
}

/// Status of a transfer as seen by the confirmation oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfirmationStatus {
    Accepted,
    Pending,
    NotAccepted,
    Error,
}

impl ConfirmationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfirmationStatus::Accepted => "ACCEPTED",
            ConfirmationStatus::Pending => "PENDING",
            ConfirmationStatus::NotAccepted => "NOT_ACCEPTED",
            ConfirmationStatus::Error => "ERROR",
        }
    }
}

/// Answer of `get_transaction_information`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OracleResult {
    pub status: ConfirmationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "opt_dec_string")]
    pub received_amount: Option<U256>,
    #[serde(rename = "sender", default, skip_serializing_if = "Option::is_none")]
    pub senders: Option<Vec<Address>>,
}

impl OracleResult {
    pub fn accepted(received_amount: U256, senders: Vec<Address>) -> Self {
        Self {
            status: ConfirmationStatus::Accepted,
            received_amount: Some(received_amount),
            senders: Some(senders),
        }
    }

    pub fn pending() -> Self {
        Self::bare(ConfirmationStatus::Pending)
    }

    pub fn not_accepted() -> Self {
        Self::bare(ConfirmationStatus::NotAccepted)
    }

    pub fn error() -> Self {
        Self::bare(ConfirmationStatus::Error)
    }

    fn bare(status: ConfirmationStatus) -> Self {
        Self {
            status,
            received_amount: None,
            senders: None,
        }
    }
}

/// One transfer as the caller submits it. Parsed into a `TransferIntent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub from_address: String,
    pub to_address: String,
    /// Base units, decimal (or `0x` hex) string.
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionResponse {
    pub status: OperationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partial_tx: Option<Vec<UnsignedTransaction>>,
    /// Signing hashes, one per `partial_tx` entry.
    #[serde(rename = "tosign", default, skip_serializing_if = "Option::is_none")]
    pub signing_hashes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_indexes: Vec<usize>,
}

impl CreateTransactionResponse {
    pub fn status_only(status: OperationStatus) -> Self {
        Self {
            status,
            partial_tx: None,
            signing_hashes: None,
            failed_indexes: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignAndSendResponse {
    pub status: OperationStatus,
    #[serde(rename = "hash", default, skip_serializing_if = "Option::is_none")]
    pub references: Option<Vec<TxHash>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_indexes: Vec<usize>,
}

impl SignAndSendResponse {
    pub fn status_only(status: OperationStatus) -> Self {
        Self {
            status,
            references: None,
            failed_indexes: Vec::new(),
        }
    }
}

/// Fee quote in the native asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeQuote {
    pub status: OperationStatus,
    pub symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "opt_dec_string")]
    pub amount: Option<U256>,
}

mod opt_dec_string {
    use alloy::primitives::U256;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<U256>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => super::dec_string::serialize(v, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<U256>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| raw.trim().parse().map_err(D::Error::custom))
            .transpose()
    }
}
