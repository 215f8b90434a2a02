//! Low-latency relay forwarding
//!
//! When the broadcast mode is relay, the custody service holds the signed
//! transaction instead of broadcasting it, and this module forwards it as a
//! tip-bearing bundle: fetch the relay's published tip-account set, pick one
//! uniformly at random, pull the custody-signed transaction by id, and submit
//! the bundle over the block engine's JSON-RPC endpoint.
//!
//! Forwarding is best-effort by policy: the caller logs failures and keeps
//! the swap counted as submitted to custody.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use rand::seq::SliceRandom;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::custody::CustodyClient;
use crate::errors::SwapError;

const BUNDLES_PATH: &str = "/api/v1/bundles";

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct RpcResponse<T> {
    #[serde(default)]
    result: Option<T>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

/// JSON-RPC client for the relay block engine
pub struct JitoClient {
    http: reqwest::Client,
    block_engine_url: String,
}

impl JitoClient {
    pub fn new(http: reqwest::Client, block_engine_url: String) -> Self {
        Self {
            http,
            block_engine_url,
        }
    }

    async fn rpc_call<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T, SwapError> {
        let url = format!("{}{}", self.block_engine_url, BUNDLES_PATH);
        let payload = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response = self
            .http
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| SwapError::relay(format!("{method} request failed: {e}")))?;

        let parsed: RpcResponse<T> = response
            .json()
            .await
            .map_err(|e| SwapError::relay(format!("{method} returned malformed response: {e}")))?;

        if let Some(error) = parsed.error {
            return Err(SwapError::relay(format!(
                "{method} failed: {} (code {})",
                error.message, error.code
            )));
        }
        parsed
            .result
            .ok_or_else(|| SwapError::relay(format!("{method} returned no result")))
    }

    /// Fetch the relay's current tip-account set. An empty set is an error:
    /// there is no local fallback list.
    pub async fn get_tip_accounts(&self) -> Result<Vec<String>, SwapError> {
        let accounts: Vec<String> = self.rpc_call("getTipAccounts", json!([])).await?;
        if accounts.is_empty() {
            return Err(SwapError::relay("relay returned no tip accounts"));
        }
        Ok(accounts)
    }

    /// Submit a bundle of base58-encoded signed transactions
    pub async fn send_bundle(&self, encoded_transactions: &[String]) -> Result<String, SwapError> {
        self.rpc_call("sendBundle", json!([encoded_transactions]))
            .await
    }
}

/// Select one tip account uniformly at random from the published set
pub fn select_tip_account(accounts: &[String]) -> Result<&String, SwapError> {
    accounts
        .choose(&mut rand::thread_rng())
        .ok_or_else(|| SwapError::relay("no tip accounts available"))
}

/// Forwards custody-signed transactions to the relay
pub struct RelayForwarder {
    jito: JitoClient,
    tip_lamports: u64,
}

impl RelayForwarder {
    pub fn new(jito: JitoClient, tip_lamports: u64) -> Self {
        Self { jito, tip_lamports }
    }

    /// Forward the custody-signed transaction as a bundle.
    ///
    /// Returns the relay's bundle id. Tip-account fetch failure and a missing
    /// signed payload fail fast; the caller decides whether that aborts
    /// anything (by policy it does not abort the swap).
    pub async fn forward(
        &self,
        custody: &CustodyClient,
        transaction_id: &str,
    ) -> Result<String, SwapError> {
        let tip_accounts = self.jito.get_tip_accounts().await?;
        let tip_account = select_tip_account(&tip_accounts)?;
        debug!(
            tip_account = %tip_account,
            candidates = tip_accounts.len(),
            "Selected relay tip account"
        );

        let record = custody.get_transaction(transaction_id).await?;
        let raw_b64 = record.raw_transaction.ok_or_else(|| {
            SwapError::relay(format!(
                "custody transaction {transaction_id} has no signed payload"
            ))
        })?;
        let raw = BASE64
            .decode(raw_b64)
            .map_err(|e| SwapError::relay(format!("signed payload is not valid base64: {e}")))?;
        let encoded_tx = bs58::encode(raw).into_string();

        let bundle_id = self.jito.send_bundle(&[encoded_tx]).await?;
        info!(
            transaction_id = %transaction_id,
            bundle_id = %bundle_id,
            tip_account = %tip_account,
            tip_lamports = self.tip_lamports,
            "Forwarded transaction to relay"
        );
        Ok(bundle_id)
    }
}
