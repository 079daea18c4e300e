//! Unsigned transaction construction.
//!
//! # Responsibilities
//! - Fetch one fee price and one base nonce per batch
//! - Price transactions with the rail's multiplier and fixed fee limit
//! - Assign contiguous nonces in caller order
//! - Isolate per-intent insufficient funds from the rest of the batch

use alloy::primitives::{B256, U256};
use std::sync::Arc;

use crate::blockchain::rail::RailClient;
use crate::blockchain::types::BlockchainError;
use crate::cache::FeePriceCache;
use crate::error::{GatewayError, GatewayResult};
use crate::rails::encoder::{encode_transfer, EncodedTransfer};
use crate::rails::transaction::UnsignedTransaction;
use crate::rails::{AssetRail, RailKind, TransferIntent};

const WEI_PER_GWEI: u128 = 1_000_000_000;

/// Result of building one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuiltBatch {
    /// One per non-failing intent, in caller order.
    pub transactions: Vec<UnsignedTransaction>,
    /// `signing_hashes[i]` belongs to `transactions[i]`.
    pub signing_hashes: Vec<B256>,
    /// Indexes (into the caller's intents) that could not cover their fee.
    pub failed_indexes: Vec<usize>,
}

/// Transaction builder shared by every rail.
#[derive(Clone)]
pub struct TxBuilder {
    client: Arc<dyn RailClient>,
    fee_cache: Arc<FeePriceCache>,
    chain_id: u64,
    max_fee_price_gwei: u64,
}

impl TxBuilder {
    pub fn new(
        client: Arc<dyn RailClient>,
        fee_cache: Arc<FeePriceCache>,
        chain_id: u64,
        max_fee_price_gwei: u64,
    ) -> Self {
        Self {
            client,
            fee_cache,
            chain_id,
            max_fee_price_gwei,
        }
    }

    /// Build unsigned transactions and signing hashes for `intents`.
    ///
    /// Batch-level failures (no intents, mixed senders, fee price or nonce
    /// unavailable) abort before any transaction is constructed. Failing
    /// intents are skipped before nonces are assigned, so the produced
    /// transactions always carry `base, base+1, ...` without gaps.
    pub async fn build(&self, rail: &AssetRail, intents: &[TransferIntent]) -> GatewayResult<BuiltBatch> {
        let first = intents.first().ok_or(GatewayError::EmptyBatch)?;
        if let Some(index) = intents.iter().position(|i| i.from != first.from) {
            return Err(GatewayError::MixedSenders { index });
        }

        let raw_price = self
            .fee_cache
            .get()
            .await
            .map_err(GatewayError::FeePriceUnavailable)?;
        let fee_price = self.adjust_fee_price(rail, raw_price)?;

        let base_nonce = self
            .client
            .get_nonce(first.from)
            .await
            .map_err(GatewayError::NonceUnavailable)?;

        let fee_cost = fee_cost(rail.policy.fee_limit, fee_price)?;

        let mut encoded = Vec::with_capacity(intents.len());
        let mut failed_indexes = Vec::new();
        for (index, intent) in intents.iter().enumerate() {
            match transfer_value(&rail.kind, intent.amount, fee_cost) {
                Some(value) => encoded.push(encode_transfer(&rail.kind, intent, value)),
                None => {
                    tracing::warn!(
                        symbol = %rail.symbol,
                        index = index,
                        amount = %intent.amount,
                        fee_cost = %fee_cost,
                        "Intent cannot cover its fee"
                    );
                    failed_indexes.push(index);
                }
            }
        }

        let mut batch = BuiltBatch {
            failed_indexes,
            ..Default::default()
        };
        for (offset, EncodedTransfer { to, value, payload }) in encoded.into_iter().enumerate() {
            let nonce = base_nonce
                .checked_add(offset as u64)
                .ok_or(GatewayError::Overflow("nonce"))?;
            let tx = UnsignedTransaction {
                to,
                nonce,
                fee_limit: rail.policy.fee_limit,
                fee_price,
                value,
                payload,
                chain_id: self.chain_id,
            };
            batch.signing_hashes.push(tx.signing_hash());
            batch.transactions.push(tx);
        }

        tracing::info!(
            symbol = %rail.symbol,
            base_nonce = base_nonce,
            fee_price = fee_price,
            built = batch.transactions.len(),
            failed = batch.failed_indexes.len(),
            "Built unsigned transactions"
        );
        Ok(batch)
    }

    /// Apply the ceiling and the rail's multiplier to a raw fee price.
    fn adjust_fee_price(&self, rail: &AssetRail, raw_price: u128) -> GatewayResult<u128> {
        let ceiling = (self.max_fee_price_gwei as u128).saturating_mul(WEI_PER_GWEI);
        if raw_price > ceiling {
            return Err(GatewayError::FeePriceRejected(BlockchainError::FeePriceTooHigh {
                current_gwei: u64::try_from(raw_price / WEI_PER_GWEI).unwrap_or(u64::MAX),
                max_gwei: self.max_fee_price_gwei,
            }));
        }

        raw_price
            .checked_mul(rail.policy.fee_price_multiplier_percent as u128)
            .map(|scaled| scaled / 100)
            .ok_or(GatewayError::Overflow("fee price"))
    }
}

/// Maximum fee a transaction can pay: `fee_limit * fee_price`.
pub fn fee_cost(fee_limit: u64, fee_price: u128) -> GatewayResult<U256> {
    U256::from(fee_limit)
        .checked_mul(U256::from(fee_price))
        .ok_or(GatewayError::Overflow("fee cost"))
}

/// Value attached to the transaction, or `None` when the amount cannot pay the fee.
///
/// Native transfers pay the fee out of the amount; token transfers pay it in
/// the native coin and move the full amount.
fn transfer_value(kind: &RailKind, amount: U256, fee_cost: U256) -> Option<U256> {
    match kind {
        RailKind::Native => amount.checked_sub(fee_cost),
        RailKind::ContractCall { .. } => Some(amount),
    }
}
