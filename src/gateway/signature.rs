//! Signed-message validation against candidate signer addresses.

use alloy::primitives::{Address, B256};
use std::str::FromStr;

use crate::rails::transaction::parse_signature;

/// Recover the signer of the 32-byte digest `message` and check it against `candidates`.
///
/// Comparison is on address bytes, so candidate casing is irrelevant.
/// Malformed input of any kind yields `false`.
pub fn validate_signature(message: &str, candidates: &[String], signature: &str) -> bool {
    let Ok(digest) = B256::from_str(message.trim()) else {
        tracing::debug!(message = %message, "Message is not a 32-byte digest");
        return false;
    };
    let Some(signature) = parse_signature(signature) else {
        tracing::debug!("Malformed signature");
        return false;
    };
    let signer = match signature.recover_address_from_prehash(&digest) {
        Ok(signer) => signer,
        Err(e) => {
            tracing::warn!(error = %e, "Signer recovery failed");
            return false;
        }
    };

    candidates
        .iter()
        .filter_map(|candidate| Address::from_str(candidate.trim()).ok())
        .any(|candidate| candidate == signer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::hex;
    use alloy::primitives::b256;
    use alloy::signers::{local::PrivateKeySigner, SignerSync};

    const DIGEST: B256 = b256!("daf5a779ae972f972197303d7b574746c7ef83eadac0f2791ad23db92e4c8e53");

    fn signer() -> PrivateKeySigner {
        "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"
            .parse()
            .unwrap()
    }

    fn signed() -> String {
        hex::encode(signer().sign_hash_sync(&DIGEST).unwrap().as_bytes())
    }

    #[test]
    fn test_matching_candidate_in_any_case() {
        let candidates = vec![
            "0x0000000000000000000000000000000000000001".to_string(),
            "0xF39FD6E51AAD88F6F4CE6AB8827279CFFFB92266".to_string(),
        ];
        assert!(validate_signature(&DIGEST.to_string(), &candidates, &signed()));
    }

    #[test]
    fn test_wrong_signer() {
        let candidates = vec!["0x70997970c51812dc3a010c7d01b50e0d17dc79c8".to_string()];
        assert!(!validate_signature(&DIGEST.to_string(), &candidates, &signed()));
    }

    #[test]
    fn test_malformed_input_is_false() {
        let candidates = vec![signer().address().to_string()];
        assert!(!validate_signature("hello", &candidates, &signed()));
        assert!(!validate_signature(&DIGEST.to_string(), &candidates, "0x1234"));
        assert!(!validate_signature(&DIGEST.to_string(), &["nope".to_string()], &signed()));
        assert!(!validate_signature(&DIGEST.to_string(), &[], &signed()));
    }
}
