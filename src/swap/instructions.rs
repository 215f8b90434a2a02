//! Swap instruction building against an Orca whirlpool
//!
//! Asks the Orca quoting service for executable instructions and a price
//! quote. The fee payer participates only as an address (the vault holds the
//! key); ephemeral signers created by the SDK (e.g. for native mint wrapping)
//! are returned alongside the instructions so the packager can apply them.

use orca_whirlpools::{
    set_funder, set_native_mint_wrapping_strategy, set_whirlpools_config_address,
    swap_instructions, NativeMintWrappingStrategy, SwapQuote, SwapType, WhirlpoolsConfigInput,
};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{instruction::Instruction, signature::Keypair};
use tracing::{debug, info};

use crate::errors::SwapError;
use crate::types::SwapRequest;
use crate::wallet::VaultAccount;

/// Instructions plus quote for one swap attempt. Owned by the caller for the
/// duration of a single construction; discarded after use.
#[derive(Debug)]
pub struct BuiltSwap {
    /// Ordered on-chain instructions
    pub instructions: Vec<Instruction>,

    /// Price quote; informational only, no minimum-output guard is enforced
    /// beyond the slippage baked into the instructions.
    pub quote: SwapQuote,

    /// Ephemeral signers created by the SDK during instruction shaping
    pub ephemeral_signers: Vec<Keypair>,
}

fn configure_orca(vault: &VaultAccount) -> Result<(), SwapError> {
    set_whirlpools_config_address(WhirlpoolsConfigInput::SolanaMainnet)
        .map_err(|e| SwapError::Config(e.to_string()))?;
    set_funder(vault.address()).map_err(|e| SwapError::Config(e.to_string()))?;
    set_native_mint_wrapping_strategy(NativeMintWrappingStrategy::Ata)
        .map_err(|e| SwapError::Config(e.to_string()))?;
    Ok(())
}

/// Build exact-in swap instructions for the request.
///
/// Zero input amount is a caller error. Remote quoting errors (pool not
/// found, insufficient liquidity) propagate unchanged; no retry here.
pub async fn build_swap_instructions(
    rpc: &RpcClient,
    vault: &VaultAccount,
    request: &SwapRequest,
) -> Result<BuiltSwap, SwapError> {
    if request.amount_in == 0 {
        return Err(SwapError::Config(
            "swap amount must be a positive integer".to_string(),
        ));
    }

    configure_orca(vault)?;

    let swap = swap_instructions(
        rpc,
        request.pool,
        request.amount_in,
        request.input_mint,
        SwapType::ExactIn,
        Some(request.slippage_bps),
        Some(vault.address()),
    )
    .await
    .map_err(|e| SwapError::RemoteService(e.to_string()))?;

    match &swap.quote {
        SwapQuote::ExactIn(quote) => {
            info!(
                amount_in = request.amount_in,
                est_out = quote.token_est_out,
                min_out = quote.token_min_out,
                pool = %request.pool,
                "Swap quote obtained"
            );
        }
        SwapQuote::ExactOut(_) => {
            debug!(pool = %request.pool, "Unexpected exact-out quote shape");
        }
    }

    Ok(BuiltSwap {
        instructions: swap.instructions,
        quote: swap.quote,
        ephemeral_signers: swap.additional_signers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::pubkey::Pubkey;

    use crate::types::BroadcastMode;

    #[tokio::test]
    async fn test_zero_amount_is_caller_error() {
        let rpc = RpcClient::new("http://localhost:8899".to_string());
        let vault = VaultAccount::new(Pubkey::new_unique());
        let request = SwapRequest {
            pool: Pubkey::new_unique(),
            input_mint: Pubkey::new_unique(),
            amount_in: 0,
            fee_payer: vault.address(),
            slippage_bps: 100,
            broadcast_mode: BroadcastMode::Direct,
        };

        let err = build_swap_instructions(&rpc, &vault, &request)
            .await
            .unwrap_err();
        assert_eq!(err.category(), "config");
    }
}
