//! Signature reattachment and concurrent submission.

use alloy::primitives::{Signature, TxHash, B256};
use futures_util::future::join_all;
use std::str::FromStr;
use std::sync::Arc;

use crate::blockchain::rail::RailClient;
use crate::error::{GatewayError, GatewayResult};
use crate::observability::metrics;
use crate::rails::transaction::{parse_signature, SignedTransaction, UnsignedTransaction};

/// Per-item result of a broadcast.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastOutcome {
    /// `references[i]` is `Some` when transaction `i` was accepted by the node.
    pub references: Vec<Option<TxHash>>,
    pub failed_indexes: Vec<usize>,
}

impl BroadcastOutcome {
    pub fn all_submitted(&self) -> bool {
        self.failed_indexes.is_empty()
    }

    /// References of the accepted submissions, in input order.
    pub fn submitted(&self) -> Vec<TxHash> {
        self.references.iter().flatten().copied().collect()
    }
}

/// Merges external signatures into unsigned transactions and submits them.
#[derive(Clone)]
pub struct Broadcaster {
    client: Arc<dyn RailClient>,
}

impl Broadcaster {
    pub fn new(client: Arc<dyn RailClient>) -> Self {
        Self { client }
    }

    /// Validate the whole bundle, then submit every transaction concurrently.
    ///
    /// Any malformed signature, unparseable hash, hash that does not match its
    /// transaction, or length mismatch rejects the bundle before anything is
    /// submitted. Submission failures are reported per item.
    pub async fn broadcast(
        &self,
        transactions: &[UnsignedTransaction],
        signing_hashes: &[String],
        signatures: &[String],
    ) -> GatewayResult<BroadcastOutcome> {
        let signed = prepare_bundle(transactions, signing_hashes, signatures)?;

        let submissions = signed.into_iter().map(|tx| {
            let client = self.client.clone();
            async move {
                let reference = tx.reference;
                client
                    .submit_raw_transaction(tx.raw)
                    .await
                    .map(|accepted| {
                        if accepted != reference {
                            tracing::warn!(
                                expected = %reference,
                                returned = %accepted,
                                "Node returned an unexpected transaction hash"
                            );
                        }
                        accepted
                    })
            }
        });

        let mut outcome = BroadcastOutcome::default();
        for (index, result) in join_all(submissions).await.into_iter().enumerate() {
            metrics::record_broadcast(result.is_ok());
            match result {
                Ok(reference) => {
                    tracing::info!(index = index, reference = %reference, "Transaction submitted");
                    outcome.references.push(Some(reference));
                }
                Err(e) => {
                    tracing::warn!(index = index, error = %e, "Transaction submission failed");
                    outcome.references.push(None);
                    outcome.failed_indexes.push(index);
                }
            }
        }
        Ok(outcome)
    }
}

/// Check a signing bundle and produce the encoded transactions to submit.
pub fn prepare_bundle(
    transactions: &[UnsignedTransaction],
    signing_hashes: &[String],
    signatures: &[String],
) -> GatewayResult<Vec<SignedTransaction>> {
    if transactions.len() != signing_hashes.len() || transactions.len() != signatures.len() {
        return Err(GatewayError::InvalidSignatures(format!(
            "length mismatch: {} transactions, {} hashes, {} signatures",
            transactions.len(),
            signing_hashes.len(),
            signatures.len()
        )));
    }
    if transactions.is_empty() {
        return Err(GatewayError::InvalidSignatures("empty bundle".into()));
    }

    transactions
        .iter()
        .zip(signing_hashes)
        .zip(signatures)
        .enumerate()
        .map(|(index, ((tx, hash), signature))| {
            let supplied = B256::from_str(hash.trim()).map_err(|_| {
                GatewayError::InvalidSignatures(format!("signing hash {index} is not 32 bytes of hex"))
            })?;
            if supplied != tx.signing_hash() {
                return Err(GatewayError::InvalidSignatures(format!(
                    "signing hash {index} does not match its transaction"
                )));
            }
            let signature: Signature = parse_signature(signature).ok_or_else(|| {
                GatewayError::InvalidSignatures(format!("signature {index} is malformed"))
            })?;
            Ok(tx.attach_signature(signature))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::types::{BlockchainError, BlockchainResult, LedgerRecord};
    use alloy::primitives::{address, keccak256, Address, Bytes, U256};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records submissions; rejects the transaction carrying `reject_nonce`.
    #[derive(Default)]
    struct RecordingRail {
        submitted: Mutex<Vec<Bytes>>,
        reject_nonce: Option<u64>,
    }

    #[async_trait]
    impl RailClient for RecordingRail {
        async fn get_nonce(&self, _address: Address) -> BlockchainResult<u64> {
            Ok(0)
        }
        async fn get_transaction_by_reference(&self, _r: TxHash) -> BlockchainResult<Option<LedgerRecord>> {
            Ok(None)
        }
        async fn get_chain_height(&self) -> BlockchainResult<u64> {
            Ok(0)
        }
        async fn submit_raw_transaction(&self, raw: Bytes) -> BlockchainResult<TxHash> {
            self.submitted.lock().unwrap().push(raw.clone());
            // two-byte list header, then small nonces encode as a single byte
            if let Some(nonce) = self.reject_nonce {
                if raw.get(2) == Some(&(nonce as u8)) {
                    return Err(BlockchainError::Submission("nonce too low".into()));
                }
            }
            Ok(keccak256(&raw))
        }
    }

    fn tx(nonce: u64) -> UnsignedTransaction {
        UnsignedTransaction {
            to: address!("3535353535353535353535353535353535353535"),
            nonce,
            fee_limit: 21_000,
            fee_price: 20_000_000_000,
            value: U256::from(1_000_000_000_000_000_000u64),
            payload: Bytes::new(),
            chain_id: 1,
        }
    }

    const SIGNATURE: &str = concat!(
        "28ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276",
        "67cbe9d8997f761aecb703304b3800ccf555c9f3dc64214b297fb1966a3b6d83",
        "25"
    );

    fn bundle(nonces: &[u64]) -> (Vec<UnsignedTransaction>, Vec<String>, Vec<String>) {
        let txs: Vec<_> = nonces.iter().map(|n| tx(*n)).collect();
        let hashes = txs.iter().map(|t| t.signing_hash().to_string()).collect();
        let sigs = nonces.iter().map(|_| SIGNATURE.to_string()).collect();
        (txs, hashes, sigs)
    }

    #[tokio::test]
    async fn test_length_mismatch_submits_nothing() {
        let rail = Arc::new(RecordingRail::default());
        let (txs, hashes, mut sigs) = bundle(&[9, 10, 11]);
        sigs.pop();

        let err = Broadcaster::new(rail.clone())
            .broadcast(&txs, &hashes, &sigs)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::InvalidSignatures(_)));
        assert!(rail.submitted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_tampered_hash_submits_nothing() {
        let rail = Arc::new(RecordingRail::default());
        let (txs, mut hashes, sigs) = bundle(&[9, 10]);
        hashes[1] = tx(99).signing_hash().to_string();

        let err = Broadcaster::new(rail.clone())
            .broadcast(&txs, &hashes, &sigs)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("signing hash 1"));
        assert!(rail.submitted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_signature_submits_nothing() {
        let rail = Arc::new(RecordingRail::default());
        let (txs, hashes, mut sigs) = bundle(&[9, 10]);
        sigs[0] = "0xdeadbeef".into();

        let err = Broadcaster::new(rail.clone())
            .broadcast(&txs, &hashes, &sigs)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("signature 0"));
        assert!(rail.submitted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_references_follow_input_order() {
        let rail = Arc::new(RecordingRail::default());
        let (txs, hashes, sigs) = bundle(&[9, 10, 11]);

        let outcome = Broadcaster::new(rail.clone())
            .broadcast(&txs, &hashes, &sigs)
            .await
            .unwrap();

        assert!(outcome.all_submitted());
        assert_eq!(outcome.references.len(), 3);
        for (tx, reference) in txs.iter().zip(&outcome.references) {
            let expected = tx.attach_signature(parse_signature(SIGNATURE).unwrap()).reference;
            assert_eq!(*reference, Some(expected));
        }
    }

    #[tokio::test]
    async fn test_one_failure_does_not_block_others() {
        let rail = Arc::new(RecordingRail {
            reject_nonce: Some(10),
            ..Default::default()
        });
        let (txs, hashes, sigs) = bundle(&[9, 10, 11]);

        let outcome = Broadcaster::new(rail.clone())
            .broadcast(&txs, &hashes, &sigs)
            .await
            .unwrap();

        assert_eq!(rail.submitted.lock().unwrap().len(), 3);
        assert_eq!(outcome.failed_indexes, vec![1]);
        assert!(outcome.references[0].is_some());
        assert!(outcome.references[1].is_none());
        assert_eq!(outcome.submitted().len(), 2);
    }
}
