//! Payload encoding per rail kind.

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol;
use alloy::sol_types::SolCall;

use crate::rails::{RailKind, TransferIntent};

sol! {
    /// ERC-20 transfer, the only call token rails emit or accept.
    function transfer(address to, uint256 amount) returns (bool);
}

/// The call a transfer intent becomes on a given rail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedTransfer {
    /// Transaction recipient (the payee, or the token contract).
    pub to: Address,
    /// Native value attached.
    pub value: U256,
    pub payload: Bytes,
}

/// Encode `intent` for `kind`. `value` is what the native rail moves after fees.
pub fn encode_transfer(kind: &RailKind, intent: &TransferIntent, value: U256) -> EncodedTransfer {
    match kind {
        RailKind::Native => EncodedTransfer {
            to: intent.to,
            value,
            payload: Bytes::new(),
        },
        RailKind::ContractCall { contract } => EncodedTransfer {
            to: *contract,
            value: U256::ZERO,
            payload: transferCall {
                to: intent.to,
                amount: intent.amount,
            }
            .abi_encode()
            .into(),
        },
    }
}

/// Decode a `transfer(address,uint256)` payload into (receiver, amount).
///
/// Returns `None` when the selector differs or the arguments are malformed.
pub fn decode_transfer_call(payload: &[u8]) -> Option<(Address, U256)> {
    if payload.len() < 4 || payload[..4] != transferCall::SELECTOR {
        return None;
    }
    let call = transferCall::abi_decode_raw(&payload[4..]).ok()?;
    Some((call.to, call.amount))
}
