//! Shared connection handles
//!
//! One long-lived ledger RPC client and one pooled HTTP client, constructed
//! once at process start and passed by reference to every component that
//! performs remote calls. Pooling parameters are fixed at construction.

use std::sync::Arc;
use std::time::Duration;

use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::commitment_config::CommitmentConfig;
use tracing::{debug, error};

use crate::config::RpcConfig;
use crate::errors::SwapError;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);
const HTTP_POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(60);
const HTTP_MAX_IDLE_PER_HOST: usize = 10;
const TCP_KEEPALIVE: Duration = Duration::from_secs(30);

/// Process-wide connection handles. Construction failure is startup-fatal;
/// after construction, accessors are pure lookups.
pub struct ConnectionManager {
    rpc: Arc<RpcClient>,
    http: reqwest::Client,
}

impl ConnectionManager {
    pub fn new(config: &RpcConfig) -> Result<Self, SwapError> {
        let rpc = RpcClient::new_with_timeout_and_commitment(
            config.url.clone(),
            Duration::from_secs(config.timeout_secs),
            CommitmentConfig::confirmed(),
        );

        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .pool_idle_timeout(HTTP_POOL_IDLE_TIMEOUT)
            .pool_max_idle_per_host(HTTP_MAX_IDLE_PER_HOST)
            .tcp_keepalive(TCP_KEEPALIVE)
            .build()
            .map_err(|e| SwapError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            rpc: Arc::new(rpc),
            http,
        })
    }

    /// The shared ledger RPC handle
    pub fn rpc(&self) -> &RpcClient {
        &self.rpc
    }

    /// Owned handle to the ledger RPC client
    pub fn rpc_arc(&self) -> Arc<RpcClient> {
        Arc::clone(&self.rpc)
    }

    /// The shared pooled HTTP client
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Issue a trivial ledger read and report success without propagating the
    /// error.
    pub async fn health_check(&self) -> bool {
        match self.rpc.get_slot().await {
            Ok(slot) => {
                debug!(slot = %slot, "Health check passed");
                true
            }
            Err(e) => {
                error!(error = %e, "Health check failed");
                false
            }
        }
    }
}
