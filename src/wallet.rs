//! Vault account and request-authentication signer
//!
//! Two distinct capabilities live here and must never be confused:
//!
//! - [`VaultAccount`] is a reference-only handle to the custody-held fee
//!   payer. It can shape instructions and messages that reference the payer's
//!   address but holds no private key; the type deliberately offers no signing
//!   method.
//! - [`RequestSigner`] authenticates outbound custody API requests. It signs
//!   request payloads, never transactions.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use ed25519_dalek::{Signer as _, SigningKey};
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

use crate::errors::SwapError;

/// Reference-only handle to the custody-held vault account.
///
/// The custody service is the only party able to produce this account's
/// transaction signature; locally it exists purely as an address.
#[derive(Debug, Clone, Copy)]
pub struct VaultAccount {
    address: Pubkey,
}

impl VaultAccount {
    pub fn new(address: Pubkey) -> Self {
        Self { address }
    }

    /// Parse from a base58 address string
    pub fn from_str(address: &str) -> Result<Self, SwapError> {
        let address = Pubkey::from_str(address)
            .map_err(|e| SwapError::Config(format!("invalid vault address: {e}")))?;
        Ok(Self { address })
    }

    pub fn address(&self) -> Pubkey {
        self.address
    }
}

/// Capability for signing custody API request payloads
pub trait RequestSigner: Send + Sync {
    /// Sign a request payload and return the encoded signature string
    fn sign_payload(&self, payload: &str) -> Result<String, SwapError>;
}

/// Ed25519 request signer backed by a local key file
pub struct Ed25519RequestSigner {
    key: SigningKey,
}

impl Ed25519RequestSigner {
    /// Load the signing key from a file.
    ///
    /// Accepts a JSON byte array (64-byte keypair or 32-byte seed) or the
    /// same as raw bytes. All-zero keys are rejected.
    pub fn from_file(path: &str) -> Result<Self, SwapError> {
        let raw = std::fs::read(path)
            .map_err(|e| SwapError::Config(format!("failed to read signer key file {path}: {e}")))?;

        let bytes: Vec<u8> = match serde_json::from_slice::<Vec<u8>>(&raw) {
            Ok(json_bytes) => json_bytes,
            Err(_) => raw,
        };

        Self::from_bytes(&bytes)
    }

    /// Build a signer from 32 seed bytes or a 64-byte keypair (seed first)
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SwapError> {
        let seed: [u8; 32] = match bytes.len() {
            32 => bytes.try_into().expect("length checked"),
            64 => bytes[..32].try_into().expect("length checked"),
            len => {
                return Err(SwapError::Config(format!(
                    "invalid signer key length: expected 32 or 64 bytes, got {len}"
                )))
            }
        };
        if seed.iter().all(|&b| b == 0) {
            return Err(SwapError::Config(
                "invalid signer key: all-zero key rejected".to_string(),
            ));
        }
        Ok(Self {
            key: SigningKey::from_bytes(&seed),
        })
    }
}

impl RequestSigner for Ed25519RequestSigner {
    fn sign_payload(&self, payload: &str) -> Result<String, SwapError> {
        let signature = self.key.sign(payload.as_bytes());
        Ok(BASE64.encode(signature.to_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_signer() -> Ed25519RequestSigner {
        Ed25519RequestSigner::from_bytes(&[7u8; 32]).unwrap()
    }

    #[test]
    fn test_signing_is_deterministic() {
        let signer = test_signer();
        let a = signer.sign_payload("/api/v1/transactions|1700000000000|{}").unwrap();
        let b = signer.sign_payload("/api/v1/transactions|1700000000000|{}").unwrap();
        assert_eq!(a, b);
        assert!(!a.is_empty());
    }

    #[test]
    fn test_distinct_payloads_distinct_signatures() {
        let signer = test_signer();
        let a = signer.sign_payload("payload-a").unwrap();
        let b = signer.sign_payload("payload-b").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_all_zero_key_rejected() {
        assert!(Ed25519RequestSigner::from_bytes(&[0u8; 32]).is_err());
        assert!(Ed25519RequestSigner::from_bytes(&[0u8; 64]).is_err());
    }

    #[test]
    fn test_bad_key_length_rejected() {
        assert!(Ed25519RequestSigner::from_bytes(&[1u8; 33]).is_err());
    }

    #[test]
    fn test_keypair_file_json_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("key.json");
        let bytes: Vec<u8> = (1..=64).collect();
        std::fs::write(&path, serde_json::to_vec(&bytes).unwrap()).unwrap();
        let signer = Ed25519RequestSigner::from_file(path.to_str().unwrap()).unwrap();
        assert!(!signer.sign_payload("x").unwrap().is_empty());
    }

    #[test]
    fn test_vault_account_is_reference_only() {
        let vault =
            VaultAccount::from_str("So11111111111111111111111111111111111111112").unwrap();
        assert_eq!(
            vault.address().to_string(),
            "So11111111111111111111111111111111111111112"
        );
    }
}
