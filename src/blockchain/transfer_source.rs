//! HTTP client for an external token-transfer index.
//!
//! The index answers `GET {base}/{symbol}/hash/{reference}` with
//! `{"transaction": {"receiver", "amount", "sender", "block", "token"?}}`,
//! or with a null/missing `transaction` (or a 404) when it does not know
//! the reference.

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::value::RawValue;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use crate::blockchain::rail::TransferSource;
use crate::blockchain::types::{BlockchainError, BlockchainResult, TransferRecord};
use crate::observability::metrics;

#[derive(Debug, Deserialize)]
struct LookupResponse {
    transaction: Option<TransferPayload>,
}

#[derive(Debug, Deserialize)]
struct TransferPayload {
    receiver: Address,
    #[serde(deserialize_with = "deserialize_amount")]
    amount: U256,
    sender: Address,
    #[serde(default, deserialize_with = "deserialize_block")]
    block: Option<u64>,
    #[serde(default)]
    token: Option<Address>,
}

/// Integers arrive either as JSON numbers of any width or as decimal strings.
///
/// The raw token is parsed directly so numbers wider than `u64` keep every digit.
fn integer_from_json<T>(raw: &RawValue) -> Result<T, String>
where
    T: FromStr,
    T::Err: Display,
{
    let text = raw.get().trim();
    let digits = if text.starts_with('"') {
        serde_json::from_str::<String>(text).map_err(|e| e.to_string())?
    } else {
        text.to_string()
    };
    digits
        .trim()
        .parse::<T>()
        .map_err(|e| format!("invalid integer {}: {}", text, e))
}

fn deserialize_amount<'de, D>(deserializer: D) -> Result<U256, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Box::<RawValue>::deserialize(deserializer)?;
    integer_from_json(&raw).map_err(serde::de::Error::custom)
}

fn deserialize_block<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Option::<Box<RawValue>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) => integer_from_json(&raw)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Transfer index reached over HTTP with a bounded per-request timeout.
#[derive(Debug, Clone)]
pub struct HttpTransferSource {
    base_url: String,
    client: reqwest::Client,
}

impl HttpTransferSource {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> BlockchainResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| BlockchainError::DataSource(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn lookup_url(&self, symbol: &str, reference: &str) -> String {
        format!("{}/{}/hash/{}", self.base_url, symbol, reference)
    }
}

#[async_trait]
impl TransferSource for HttpTransferSource {
    async fn lookup_transfer(
        &self,
        symbol: &str,
        reference: &str,
    ) -> BlockchainResult<Option<TransferRecord>> {
        let url = self.lookup_url(symbol, reference);
        let result = self.client.get(&url).send().await;
        metrics::record_external_call("transfer_lookup", result.is_ok());

        let response = result.map_err(|e| {
            if e.is_timeout() {
                BlockchainError::DataSource(format!("Transfer lookup timed out: {}", e))
            } else {
                BlockchainError::DataSource(e.to_string())
            }
        })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(BlockchainError::DataSource(format!(
                "Transfer index returned status {}",
                response.status()
            )));
        }

        let body: LookupResponse = response
            .json()
            .await
            .map_err(|e| BlockchainError::DataSource(format!("Malformed transfer response: {}", e)))?;

        Ok(body.transaction.map(|t| TransferRecord {
            receiver: t.receiver,
            amount: t.amount,
            sender: t.sender,
            block: t.block,
            token: t.token,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_url_trims_trailing_slash() {
        let source = HttpTransferSource::new("http://index.local/api/", 5).unwrap();
        assert_eq!(
            source.lookup_url("0xabc", "0x01"),
            "http://index.local/api/0xabc/hash/0x01"
        );
    }

    #[test]
    fn test_parse_string_and_number_amounts() {
        let json = r#"{"transaction":{
            "receiver":"0x00000000000000000000000000000000000000aa",
            "amount":"1000000000000000000000",
            "sender":"0x00000000000000000000000000000000000000bb",
            "block":120}}"#;
        let parsed: LookupResponse = serde_json::from_str(json).unwrap();
        let tx = parsed.transaction.unwrap();
        assert_eq!(tx.amount, U256::from(10u64).pow(U256::from(21u64)));
        assert_eq!(tx.block, Some(120));
        assert!(tx.token.is_none());

        let json = r#"{"transaction":{
            "receiver":"0x00000000000000000000000000000000000000aa",
            "amount":42,
            "sender":"0x00000000000000000000000000000000000000bb"}}"#;
        let parsed: LookupResponse = serde_json::from_str(json).unwrap();
        let tx = parsed.transaction.unwrap();
        assert_eq!(tx.amount, U256::from(42u64));
        assert_eq!(tx.block, None);
    }

    #[test]
    fn test_parse_wide_numeric_amount_and_string_block() {
        let json = r#"{"transaction":{
            "receiver":"0x00000000000000000000000000000000000000aa",
            "amount":100000000000000000000,
            "sender":"0x00000000000000000000000000000000000000bb",
            "block":"120"}}"#;
        let tx = serde_json::from_str::<LookupResponse>(json).unwrap().transaction.unwrap();
        assert_eq!(tx.amount, U256::from(10u64).pow(U256::from(20u64)));
        assert_eq!(tx.block, Some(120));

        let json = r#"{"transaction":{
            "receiver":"0x00000000000000000000000000000000000000aa",
            "amount":"5",
            "sender":"0x00000000000000000000000000000000000000bb",
            "block":null}}"#;
        let tx = serde_json::from_str::<LookupResponse>(json).unwrap().transaction.unwrap();
        assert_eq!(tx.block, None);
    }

    #[test]
    fn test_parse_rejects_fractional_amount() {
        let json = r#"{"transaction":{
            "receiver":"0x00000000000000000000000000000000000000aa",
            "amount":1.5,
            "sender":"0x00000000000000000000000000000000000000bb"}}"#;
        assert!(serde_json::from_str::<LookupResponse>(json).is_err());

        let json = r#"{"transaction":{
            "receiver":"0x00000000000000000000000000000000000000aa",
            "amount":"7",
            "sender":"0x00000000000000000000000000000000000000bb",
            "block":"tip"}}"#;
        assert!(serde_json::from_str::<LookupResponse>(json).is_err());
    }

    #[test]
    fn test_parse_missing_transaction() {
        let parsed: LookupResponse = serde_json::from_str(r#"{"transaction":null}"#).unwrap();
        assert!(parsed.transaction.is_none());
        let parsed: LookupResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.transaction.is_none());
    }
}
