//! Partial signing and custody request packaging
//!
//! Signs the assembled message with every signer available locally, which
//! never includes the custody-held fee payer. The resulting envelope carries
//! the serialized message and a fixed two-slot signature array: slot 0 is the
//! custody account's and is always submitted as null for the custody service
//! to fill; slot 1 carries the locally produced signature when one exists.
//!
//! Slot order follows the transaction's account list, not submission order.
//! Swapping the slots or pre-filling slot 0 corrupts the on-chain
//! signature-account mapping.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use solana_sdk::{
    message::VersionedMessage,
    signature::{Keypair, Signature},
    signer::Signer,
};

use crate::errors::SwapError;
use crate::types::BroadcastMode;

const SIGNER_TYPE: &str = "api_signer";
const SIGN_MODE: &str = "auto";
const TRANSACTION_TYPE: &str = "solana_transaction";
const SERIALIZATION_TYPE: &str = "solana_serialized_transaction_message";
const CHAIN: &str = "solana_mainnet";
const WAIT_FOR_STATE: &str = "signed";

/// Serialized message bytes plus the locally produced signature, if any
#[derive(Debug, Clone)]
pub struct SignedEnvelope {
    /// Base64-encoded serialized message bytes
    pub message_b64: String,

    /// Base64-encoded signature from the second signature slot, when a local
    /// signer produced one
    pub local_signature_b64: Option<String>,
}

/// Sign the message with each ephemeral signer that the account list
/// requires. The fee-payer slot stays empty: no local capability can fill it.
pub fn partially_sign(
    message: &VersionedMessage,
    ephemeral_signers: &[Keypair],
) -> Result<SignedEnvelope, SwapError> {
    let serialized = message.serialize();
    let num_required = message.header().num_required_signatures as usize;
    let signer_keys = &message.static_account_keys()[..num_required];

    let mut slots: Vec<Option<Signature>> = vec![None; num_required];
    for signer in ephemeral_signers {
        let pubkey = signer.pubkey();
        if let Some(position) = signer_keys.iter().position(|key| *key == pubkey) {
            if position == 0 {
                // Slot 0 belongs to the custody account; a local signer
                // claiming it means the message was assembled wrong.
                return Err(SwapError::Internal(
                    "local signer occupies the custody signature slot".to_string(),
                ));
            }
            slots[position] = Some(signer.sign_message(&serialized));
        }
    }

    let local_signature_b64 = slots
        .get(1)
        .and_then(|slot| slot.as_ref())
        .map(|signature| BASE64.encode(signature.as_ref()));

    Ok(SignedEnvelope {
        message_b64: BASE64.encode(&serialized),
        local_signature_b64,
    })
}

/// One entry in the custody request's signature array
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignatureSlot {
    pub data: Option<String>,
}

/// Custody request body for create-and-wait transaction submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTransactionRequest {
    pub vault_id: String,
    pub signer_type: String,
    pub sign_mode: String,
    #[serde(rename = "type")]
    pub transaction_type: String,
    pub details: TransactionDetails,
    pub wait_for_state: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionDetails {
    #[serde(rename = "type")]
    pub serialization_type: String,
    pub push_mode: String,
    pub chain: String,
    pub data: String,
    pub signatures: Vec<SignatureSlot>,
}

impl CreateTransactionRequest {
    /// Package an envelope into the custody service's request shape.
    ///
    /// The signature array always has exactly two slots, slot 0 null.
    pub fn new(vault_id: &str, envelope: &SignedEnvelope, broadcast_mode: BroadcastMode) -> Self {
        Self {
            vault_id: vault_id.to_string(),
            signer_type: SIGNER_TYPE.to_string(),
            sign_mode: SIGN_MODE.to_string(),
            transaction_type: TRANSACTION_TYPE.to_string(),
            details: TransactionDetails {
                serialization_type: SERIALIZATION_TYPE.to_string(),
                push_mode: broadcast_mode.push_mode().to_string(),
                chain: CHAIN.to_string(),
                data: envelope.message_b64.clone(),
                signatures: vec![
                    SignatureSlot { data: None },
                    SignatureSlot {
                        data: envelope.local_signature_b64.clone(),
                    },
                ],
            },
            wait_for_state: WAIT_FOR_STATE.to_string(),
        }
    }
}
