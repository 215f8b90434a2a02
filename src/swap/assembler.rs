//! Versioned transaction message assembly
//!
//! Combines the fee payer, a recent-blockhash lifetime, and the built
//! instructions into a single v0 message. The blockhash binds the message to
//! a validity window; the message expires once the ledger advances past it.

use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    instruction::Instruction,
    message::{v0, VersionedMessage},
    pubkey::Pubkey,
};
use tracing::debug;

use crate::errors::SwapError;

/// Fetch the latest blockhash and compile a v0 message.
///
/// Pure assembly apart from the blockhash fetch, whose failure propagates as
/// a remote-service error.
pub async fn assemble_transaction_message(
    rpc: &RpcClient,
    fee_payer: &Pubkey,
    instructions: &[Instruction],
) -> Result<VersionedMessage, SwapError> {
    let blockhash = rpc
        .get_latest_blockhash()
        .await
        .map_err(|e| SwapError::RemoteService(format!("failed to fetch blockhash: {e}")))?;

    debug!(blockhash = %blockhash, fee_payer = %fee_payer, "Assembling transaction message");

    let message = v0::Message::try_compile(fee_payer, instructions, &[], blockhash)
        .map_err(|e| SwapError::Internal(format!("message compile failed: {e}")))?;

    Ok(VersionedMessage::V0(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::{hash::Hash, system_instruction};

    #[test]
    fn test_compiled_message_preserves_payer_and_order() {
        let payer = Pubkey::new_unique();
        let dest_a = Pubkey::new_unique();
        let dest_b = Pubkey::new_unique();
        let instructions = vec![
            system_instruction::transfer(&payer, &dest_a, 1),
            system_instruction::transfer(&payer, &dest_b, 2),
        ];

        let message =
            v0::Message::try_compile(&payer, &instructions, &[], Hash::new_unique()).unwrap();
        let versioned = VersionedMessage::V0(message);

        // Fee payer occupies the first required-signer slot
        assert_eq!(versioned.static_account_keys()[0], payer);
        assert_eq!(versioned.header().num_required_signatures, 1);
        // Instruction order is preserved
        let v0_message = match &versioned {
            VersionedMessage::V0(m) => m,
            _ => unreachable!(),
        };
        assert_eq!(v0_message.instructions.len(), 2);
    }
}
