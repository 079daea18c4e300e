//! Confirmation oracle: reference → finality-aware status.
//!
//! # Resolution
//! ```text
//! reference ──parse──▶ ledger record / indexed transfer ──▶ (receiver, amount, height)
//!     malformed, unknown, reverted or wrong shape   → NOT_ACCEPTED
//!     lookup error or timeout                       → Err (reported as ERROR)
//!     no inclusion height                           → PENDING
//!     height - inclusion >= required confirmations  → ACCEPTED, else PENDING
//! ```
//!
//! The credited amount is the transferred amount only when the receiver is
//! the pool address; any other receiver is credited 0.

use alloy::primitives::{Address, TxHash, U256};
use std::str::FromStr;
use std::sync::Arc;

use crate::blockchain::rail::{RailClient, TransferSource};
use crate::error::{GatewayError, GatewayResult};
use crate::gateway::types::{ConfirmationStatus, OracleResult};
use crate::observability::metrics;
use crate::rails::encoder::decode_transfer_call;
use crate::rails::{AssetRail, RailKind};

/// What a transfer looked like on the ledger, independent of where it was read.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ObservedTransfer {
    sender: Address,
    receiver: Address,
    amount: U256,
    inclusion_height: Option<u64>,
}

/// Lookup result before the depth check.
enum Observation {
    Rejected(&'static str),
    Found(ObservedTransfer),
}

#[derive(Clone)]
pub struct ConfirmationOracle {
    client: Arc<dyn RailClient>,
    transfer_source: Option<Arc<dyn TransferSource>>,
}

impl ConfirmationOracle {
    pub fn new(client: Arc<dyn RailClient>, transfer_source: Option<Arc<dyn TransferSource>>) -> Self {
        Self {
            client,
            transfer_source,
        }
    }

    /// Resolve `reference` against `pool_address` on `rail`.
    ///
    /// `Err` is reserved for transient failures and a malformed pool address;
    /// every terminal answer is an `Ok`.
    pub async fn resolve(
        &self,
        rail: &AssetRail,
        reference: &str,
        pool_address: &str,
    ) -> GatewayResult<OracleResult> {
        let pool = Address::from_str(pool_address.trim())
            .map_err(|_| GatewayError::InvalidPoolAddress(pool_address.to_string()))?;

        let result = self.resolve_inner(rail, reference, pool).await;
        let status = match &result {
            Ok(r) => r.status,
            Err(_) => ConfirmationStatus::Error,
        };
        metrics::record_oracle_result(&rail.symbol, status.as_str());
        result
    }

    async fn resolve_inner(
        &self,
        rail: &AssetRail,
        reference: &str,
        pool: Address,
    ) -> GatewayResult<OracleResult> {
        let Ok(hash) = TxHash::from_str(reference.trim()) else {
            return Ok(not_accepted(rail, reference, "malformed reference"));
        };

        let observation = match (&rail.kind, &self.transfer_source) {
            (RailKind::ContractCall { contract }, Some(source)) => {
                self.observe_indexed(source.as_ref(), rail, *contract, reference).await?
            }
            _ => self.observe_ledger(rail, hash).await?,
        };

        let transfer = match observation {
            Observation::Rejected(reason) => return Ok(not_accepted(rail, reference, reason)),
            Observation::Found(transfer) => transfer,
        };

        let Some(inclusion_height) = transfer.inclusion_height else {
            tracing::debug!(symbol = %rail.symbol, reference = %reference, "Transaction not yet included");
            return Ok(OracleResult::pending());
        };

        let chain_height = self
            .client
            .get_chain_height()
            .await
            .map_err(GatewayError::Lookup)?;

        let required = rail.policy.required_confirmations;
        if !is_final(chain_height, inclusion_height, required) {
            tracing::debug!(
                symbol = %rail.symbol,
                reference = %reference,
                chain_height = chain_height,
                inclusion_height = inclusion_height,
                required = required,
                "Transaction below required depth"
            );
            return Ok(OracleResult::pending());
        }

        let credited = credited_amount(&transfer, pool);
        if transfer.receiver != pool {
            tracing::info!(
                symbol = %rail.symbol,
                reference = %reference,
                receiver = %transfer.receiver,
                pool = %pool,
                "Accepted transfer went to another destination"
            );
        }
        Ok(OracleResult::accepted(credited, vec![transfer.sender]))
    }

    /// Read the transaction from the node and decode it for the rail.
    async fn observe_ledger(&self, rail: &AssetRail, hash: TxHash) -> GatewayResult<Observation> {
        let record = self
            .client
            .get_transaction_by_reference(hash)
            .await
            .map_err(GatewayError::Lookup)?;

        let Some(record) = record else {
            return Ok(Observation::Rejected("unknown reference"));
        };
        if record.succeeded == Some(false) {
            return Ok(Observation::Rejected("transaction reverted"));
        }

        let (receiver, amount) = match rail.kind {
            RailKind::Native => match record.to {
                Some(to) => (to, record.value),
                None => return Ok(Observation::Rejected("contract creation")),
            },
            RailKind::ContractCall { contract } => {
                if record.to != Some(contract) {
                    return Ok(Observation::Rejected("different token contract"));
                }
                match decode_transfer_call(&record.payload) {
                    Some(decoded) => decoded,
                    None => return Ok(Observation::Rejected("not a transfer call")),
                }
            }
        };

        Ok(Observation::Found(ObservedTransfer {
            sender: record.from,
            receiver,
            amount,
            inclusion_height: record.inclusion_height,
        }))
    }

    /// Ask the external transfer index instead of decoding calldata.
    async fn observe_indexed(
        &self,
        source: &dyn TransferSource,
        rail: &AssetRail,
        contract: Address,
        reference: &str,
    ) -> GatewayResult<Observation> {
        let record = source
            .lookup_transfer(&rail.symbol, reference.trim())
            .await
            .map_err(GatewayError::Lookup)?;

        let Some(record) = record else {
            return Ok(Observation::Rejected("unknown reference"));
        };
        if record.token.is_some_and(|token| token != contract) {
            return Ok(Observation::Rejected("different token contract"));
        }

        Ok(Observation::Found(ObservedTransfer {
            sender: record.sender,
            receiver: record.receiver,
            amount: record.amount,
            inclusion_height: record.block,
        }))
    }
}

/// `true` once the inclusion block is buried `required` blocks deep.
pub fn is_final(chain_height: u64, inclusion_height: u64, required: u64) -> bool {
    chain_height.saturating_sub(inclusion_height) >= required
}

fn credited_amount(transfer: &ObservedTransfer, pool: Address) -> U256 {
    // Address equality is byte equality, so checksum casing never matters.
    if transfer.receiver == pool {
        transfer.amount
    } else {
        U256::ZERO
    }
}

fn not_accepted(rail: &AssetRail, reference: &str, reason: &'static str) -> OracleResult {
    tracing::info!(symbol = %rail.symbol, reference = %reference, reason = reason, "Transfer not accepted");
    OracleResult::not_accepted()
}
