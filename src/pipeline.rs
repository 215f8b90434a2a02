//! End-to-end swap execution pipeline
//!
//! One swap attempt: build instructions against the pool, assemble the
//! versioned message, partially sign, package for custody, submit with an
//! authenticated request, and — in relay mode — forward the custody-signed
//! transaction to the block engine. Relay forwarding is best-effort: its
//! failure is logged and the swap still counts as submitted.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::connection::ConnectionManager;
use crate::custody::CustodyClient;
use crate::errors::SwapError;
use crate::event_log::EventSink;
use crate::jito::RelayForwarder;
use crate::orchestrator::SwapExecutor;
use crate::swap::{
    assemble_transaction_message, build_swap_instructions, partially_sign,
    CreateTransactionRequest,
};
use crate::types::{BroadcastMode, SubmissionResult, SwapRequest};
use crate::wallet::VaultAccount;

/// The production swap executor
pub struct SwapPipeline {
    conn: Arc<ConnectionManager>,
    vault: VaultAccount,
    vault_id: String,
    custody: CustodyClient,
    relay: Option<RelayForwarder>,
    sink: Arc<dyn EventSink>,
}

impl SwapPipeline {
    pub fn new(
        conn: Arc<ConnectionManager>,
        vault: VaultAccount,
        vault_id: String,
        custody: CustodyClient,
        relay: Option<RelayForwarder>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            conn,
            vault,
            vault_id,
            custody,
            relay,
            sink,
        }
    }

    /// Best-effort relay hop after a successful custody submission. Errors
    /// are absorbed here by policy; there is no compensating action for the
    /// already-submitted transaction.
    async fn forward_to_relay(&self, result: &SubmissionResult) {
        let Some(relay) = &self.relay else {
            warn!("Relay broadcast requested but no forwarder is configured");
            return;
        };
        match relay.forward(&self.custody, &result.transaction_id).await {
            Ok(bundle_id) => {
                self.sink.record_event(
                    "relay_forwarded",
                    &format!(
                        "tx-id: {}, bundle: {}, x-request-id: {}",
                        result.transaction_id,
                        bundle_id,
                        result.request_id_or_na()
                    ),
                );
            }
            Err(e) => {
                warn!(
                    transaction_id = %result.transaction_id,
                    category = e.category(),
                    error = %e,
                    "Relay forwarding failed; transaction remains submitted to custody"
                );
                self.sink.record_event(
                    "relay_error",
                    &format!(
                        "tx-id: {}, x-request-id: {}: {}",
                        result.transaction_id,
                        result.request_id_or_na(),
                        e
                    ),
                );
            }
        }
    }
}

#[async_trait(?Send)]
impl SwapExecutor for SwapPipeline {
    async fn execute(&self, request: &SwapRequest) -> Result<SubmissionResult, SwapError> {
        let built = build_swap_instructions(self.conn.rpc(), &self.vault, request).await?;

        let message =
            assemble_transaction_message(self.conn.rpc(), &request.fee_payer, &built.instructions)
                .await?;

        let envelope = partially_sign(&message, &built.ephemeral_signers)?;
        let custody_request =
            CreateTransactionRequest::new(&self.vault_id, &envelope, request.broadcast_mode);

        let result = self.custody.create_and_wait(&custody_request).await?;
        info!(
            transaction_id = %result.transaction_id,
            request_id = result.request_id_or_na(),
            broadcast_mode = ?request.broadcast_mode,
            "Custody accepted transaction"
        );

        if request.broadcast_mode == BroadcastMode::Relay {
            self.forward_to_relay(&result).await;
        }

        Ok(result)
    }
}
