//! Configuration module
//!
//! Handles configuration loading from TOML files and environment variables.
//! Swap parameters are fixed at startup; they are configuration, not runtime
//! arguments.

use serde::{Deserialize, Serialize};

use crate::errors::SwapError;
use crate::types::BroadcastMode;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Ledger RPC configuration
    #[serde(default)]
    pub rpc: RpcConfig,

    /// Custody service configuration
    #[serde(default)]
    pub custody: CustodyConfig,

    /// Swap parameters
    #[serde(default)]
    pub swap: SwapConfig,

    /// Relay (Jito) configuration
    #[serde(default)]
    pub jito: JitoConfig,

    /// Batch run configuration
    #[serde(default)]
    pub run: RunConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    /// RPC endpoint URL
    #[serde(default = "default_rpc_url")]
    pub url: String,

    /// Request timeout in seconds
    #[serde(default = "default_rpc_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustodyConfig {
    /// Custody API base URL
    #[serde(default = "default_custody_base_url")]
    pub api_base_url: String,

    /// Endpoint path for create-and-wait transaction submission
    #[serde(default = "default_create_path")]
    pub create_path: String,

    /// Custody vault identifier
    #[serde(default)]
    pub vault_id: String,

    /// Solana address of the custody-held vault (the fee payer)
    #[serde(default)]
    pub vault_address: String,

    /// Bearer token for the custody API (env `FORDEFI_API_TOKEN` overrides)
    #[serde(default)]
    pub access_token: String,

    /// Path to the API signer private key file
    #[serde(default = "default_api_signer_key_path")]
    pub api_signer_key_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapConfig {
    /// Whirlpool address to swap against
    #[serde(default)]
    pub pool: String,

    /// Input token mint address
    #[serde(default = "default_input_mint")]
    pub input_mint: String,

    /// Input amount in the token's smallest unit
    #[serde(default = "default_amount_in")]
    pub amount_in: u64,

    /// Slippage tolerance in basis points
    #[serde(default = "default_slippage_bps")]
    pub slippage_bps: u16,

    /// How the signed transaction reaches the network
    #[serde(default)]
    pub broadcast_mode: BroadcastMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JitoConfig {
    /// Block engine base URL
    #[serde(default = "default_block_engine_url")]
    pub block_engine_url: String,

    /// Tip amount in lamports
    #[serde(default = "default_tip_lamports")]
    pub tip_lamports: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Number of batch iterations
    #[serde(default = "default_iterations")]
    pub iterations: u32,

    /// Sequential swaps per batch
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,

    /// Pause between iterations in milliseconds (not applied after the last)
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Append-only execution log path
    #[serde(default = "default_log_path")]
    pub log_path: String,
}

// Default value functions
fn default_rpc_url() -> String {
    "https://api.mainnet-beta.solana.com".to_string()
}
fn default_rpc_timeout() -> u64 {
    30
}
fn default_custody_base_url() -> String {
    "https://api.fordefi.com".to_string()
}
fn default_create_path() -> String {
    "/api/v1/transactions/create-and-wait".to_string()
}
fn default_api_signer_key_path() -> String {
    "secret/api_signer.json".to_string()
}
fn default_input_mint() -> String {
    // WSOL
    "So11111111111111111111111111111111111111112".to_string()
}
fn default_amount_in() -> u64 {
    1_000
}
fn default_slippage_bps() -> u16 {
    100
}
fn default_block_engine_url() -> String {
    "https://mainnet.block-engine.jito.wtf".to_string()
}
fn default_tip_lamports() -> u64 {
    1_000
}
fn default_iterations() -> u32 {
    10
}
fn default_batch_size() -> u32 {
    3
}
fn default_delay_ms() -> u64 {
    1_000
}
fn default_log_path() -> String {
    "swap_execution.log".to_string()
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: default_rpc_url(),
            timeout_secs: default_rpc_timeout(),
        }
    }
}

impl Default for CustodyConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_custody_base_url(),
            create_path: default_create_path(),
            vault_id: String::new(),
            vault_address: String::new(),
            access_token: String::new(),
            api_signer_key_path: default_api_signer_key_path(),
        }
    }
}

impl Default for SwapConfig {
    fn default() -> Self {
        Self {
            pool: String::new(),
            input_mint: default_input_mint(),
            amount_in: default_amount_in(),
            slippage_bps: default_slippage_bps(),
            broadcast_mode: BroadcastMode::default(),
        }
    }
}

impl Default for JitoConfig {
    fn default() -> Self {
        Self {
            block_engine_url: default_block_engine_url(),
            tip_lamports: default_tip_lamports(),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
            batch_size: default_batch_size(),
            delay_ms: default_delay_ms(),
            log_path: default_log_path(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc: RpcConfig::default(),
            custody: CustodyConfig::default(),
            swap: SwapConfig::default(),
            jito: JitoConfig::default(),
            run: RunConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides for secrets
    pub fn from_file_with_env(path: &str) -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment overrides. Secrets always come from the environment
    /// when set, so config files can be committed without them.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("SOLANA_RPC_URL") {
            self.rpc.url = url;
        }
        if let Ok(token) = std::env::var("FORDEFI_API_TOKEN") {
            self.custody.access_token = token;
        }
        if let Ok(vault_id) = std::env::var("FORDEFI_VAULT_ID") {
            self.custody.vault_id = vault_id;
        }
        if let Ok(vault_address) = std::env::var("FORDEFI_VAULT_ADDRESS") {
            self.custody.vault_address = vault_address;
        }
    }

    /// Validate startup invariants. Failures here are startup-fatal.
    pub fn validate(&self) -> Result<(), SwapError> {
        if self.custody.access_token.is_empty() {
            return Err(SwapError::Config(
                "custody access token is not set (FORDEFI_API_TOKEN)".to_string(),
            ));
        }
        if self.custody.vault_id.is_empty() {
            return Err(SwapError::Config("custody vault_id is not set".to_string()));
        }
        if self.custody.vault_address.is_empty() {
            return Err(SwapError::Config(
                "custody vault_address is not set".to_string(),
            ));
        }
        if self.swap.pool.is_empty() {
            return Err(SwapError::Config("swap pool is not set".to_string()));
        }
        if self.swap.amount_in == 0 {
            return Err(SwapError::Config(
                "swap amount_in must be a positive integer".to_string(),
            ));
        }
        if self.swap.slippage_bps > 10_000 {
            return Err(SwapError::Config(format!(
                "slippage_bps {} exceeds maximum 10000",
                self.swap.slippage_bps
            )));
        }
        if self.run.iterations == 0 || self.run.batch_size == 0 {
            return Err(SwapError::Config(
                "run.iterations and run.batch_size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.custody.access_token = "token".to_string();
        config.custody.vault_id = "vault-id".to_string();
        config.custody.vault_address = "FvaultAddress111111111111111111111111111111".to_string();
        config.swap.pool = "Czfq3xZZDmsdGdUyrNLtRhGc47cXcZtLG4crryfu44zE".to_string();
        config
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.run.iterations, 10);
        assert_eq!(config.run.batch_size, 3);
        assert_eq!(config.run.delay_ms, 1_000);
        assert_eq!(config.swap.slippage_bps, 100);
        assert_eq!(config.swap.broadcast_mode, BroadcastMode::Direct);
    }

    #[test]
    fn test_missing_access_token_is_startup_error() {
        let mut config = valid_config();
        config.custody.access_token.clear();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("access token"));
    }

    #[test]
    fn test_zero_amount_rejected() {
        let mut config = valid_config();
        config.swap.amount_in = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_roundtrip_with_partial_file() {
        let toml_src = r#"
            [swap]
            pool = "Czfq3xZZDmsdGdUyrNLtRhGc47cXcZtLG4crryfu44zE"
            amount_in = 5000
            broadcast_mode = "relay"
        "#;
        let config: Config = toml::from_str(toml_src).unwrap();
        assert_eq!(config.swap.amount_in, 5_000);
        assert_eq!(config.swap.broadcast_mode, BroadcastMode::Relay);
        // Untouched sections fall back to defaults
        assert_eq!(
            config.custody.create_path,
            "/api/v1/transactions/create-and-wait"
        );
        assert_eq!(config.run.iterations, 10);
    }
}
