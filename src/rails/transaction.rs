//! Unsigned transactions, their signing hash, and signature reattachment.
//!
//! The signing hash is keccak-256 over the legacy RLP encoding (EIP-155 form
//! when `chain_id != 0`). It must stay bit-for-bit reproducible: callers sign
//! it out of band and hand it back with the signature.

use alloy::consensus::{SignableTransaction, TxEnvelope, TxLegacy};
use alloy::eips::eip2718::Encodable2718;
use alloy::primitives::{Address, Bytes, Signature, TxHash, TxKind, B256, U256};
use serde::{Deserialize, Serialize};

/// A transfer ready for external signing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnsignedTransaction {
    pub to: Address,
    pub nonce: u64,
    #[serde(rename = "gasLimit")]
    pub fee_limit: u64,
    #[serde(rename = "gasPrice", with = "dec_string")]
    pub fee_price: u128,
    #[serde(with = "dec_string")]
    pub value: U256,
    #[serde(rename = "data")]
    pub payload: Bytes,
    pub chain_id: u64,
}

/// An encoded, signed transaction and the reference it will have on chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub reference: TxHash,
    pub raw: Bytes,
}

impl UnsignedTransaction {
    /// The consensus form this transaction is hashed and encoded as.
    pub fn to_legacy(&self) -> TxLegacy {
        TxLegacy {
            chain_id: (self.chain_id != 0).then_some(self.chain_id),
            nonce: self.nonce,
            gas_price: self.fee_price,
            gas_limit: self.fee_limit,
            to: TxKind::Call(self.to),
            value: self.value,
            input: self.payload.clone(),
        }
    }

    /// Digest the external signer must sign.
    pub fn signing_hash(&self) -> B256 {
        self.to_legacy().signature_hash()
    }

    /// Reattach an externally produced signature and encode for submission.
    pub fn attach_signature(&self, signature: Signature) -> SignedTransaction {
        let signed = self.to_legacy().into_signed(signature);
        let reference = *signed.hash();
        let raw = TxEnvelope::from(signed).encoded_2718();
        SignedTransaction {
            reference,
            raw: Bytes::from(raw),
        }
    }
}

/// Parse a 65-byte `r || s || v` hex signature, with or without `0x`.
///
/// `v` may be a raw parity (0/1), Electrum style (27/28) or EIP-155 style (>= 35).
pub fn parse_signature(raw: &str) -> Option<Signature> {
    let bytes = alloy::hex::decode(raw.trim()).ok()?;
    if bytes.len() != 65 {
        return None;
    }

    let r = U256::from_be_slice(&bytes[..32]);
    let s = U256::from_be_slice(&bytes[32..64]);
    let y_parity = match bytes[64] {
        0 | 27 => false,
        1 | 28 => true,
        v if v >= 35 => (v - 35) % 2 == 1,
        _ => return None,
    };
    Some(Signature::new(r, s, y_parity))
}

/// Serde adapter writing numbers as decimal strings.
pub mod dec_string {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};
    use std::fmt::Display;
    use std::str::FromStr;

    pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Display,
        S: Serializer,
    {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.trim().parse().map_err(D::Error::custom)
    }
}
