//! Common types used throughout the application

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

/// How the custody-signed transaction reaches the network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BroadcastMode {
    /// The custody service broadcasts the transaction itself
    #[default]
    Direct,
    /// The signed transaction is forwarded to the low-latency relay instead
    Relay,
}

impl BroadcastMode {
    /// Custody `push_mode` wire value: the custody service must hold the
    /// signed transaction (`manual`) when we forward it ourselves.
    pub fn push_mode(&self) -> &'static str {
        match self {
            BroadcastMode::Direct => "auto",
            BroadcastMode::Relay => "manual",
        }
    }
}

/// One swap attempt. Immutable once constructed; created fresh per attempt.
#[derive(Debug, Clone)]
pub struct SwapRequest {
    /// Liquidity pool to swap against
    pub pool: Pubkey,

    /// Input token mint
    pub input_mint: Pubkey,

    /// Input amount in the token's smallest unit (must be positive)
    pub amount_in: u64,

    /// Custody-held fee payer address
    pub fee_payer: Pubkey,

    /// Slippage tolerance in basis points
    pub slippage_bps: u16,

    /// Broadcast path for the signed transaction
    pub broadcast_mode: BroadcastMode,
}

/// Outcome of a successful custody submission
#[derive(Debug, Clone)]
pub struct SubmissionResult {
    /// Transaction identifier assigned by the custody service
    pub transaction_id: String,

    /// Correlation id from the `x-request-id` response header, when present.
    /// Used only for log correlation.
    pub request_id: Option<String>,
}

impl SubmissionResult {
    /// Correlation id for log lines; absence is tolerated.
    pub fn request_id_or_na(&self) -> &str {
        self.request_id.as_deref().unwrap_or("N/A")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_mode_mapping() {
        assert_eq!(BroadcastMode::Direct.push_mode(), "auto");
        assert_eq!(BroadcastMode::Relay.push_mode(), "manual");
    }

    #[test]
    fn test_broadcast_mode_serde() {
        let direct: BroadcastMode = serde_json::from_str("\"direct\"").unwrap();
        let relay: BroadcastMode = serde_json::from_str("\"relay\"").unwrap();
        assert_eq!(direct, BroadcastMode::Direct);
        assert_eq!(relay, BroadcastMode::Relay);
    }

    #[test]
    fn test_request_id_fallback() {
        let result = SubmissionResult {
            transaction_id: "tx-1".to_string(),
            request_id: None,
        };
        assert_eq!(result.request_id_or_na(), "N/A");
    }
}
