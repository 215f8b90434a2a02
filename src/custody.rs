//! Authenticated custody service client
//!
//! Submits packaged transactions to the custody API and fetches them back by
//! id. Every POST is authenticated twice: a bearer token identifies the
//! caller, and an `x-signature` header carries a signature over
//! `{path}|{timestamp}|{body}` with the exact body bytes that go on the wire.
//! The body is serialized once and reused for both signing and transmission;
//! re-serializing after signing would invalidate the signature.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::CustodyConfig;
use crate::errors::SwapError;
use crate::swap::envelope::CreateTransactionRequest;
use crate::types::SubmissionResult;
use crate::wallet::RequestSigner;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Response body for transaction creation; extra fields are ignored
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTransactionResponse {
    pub id: String,
    #[serde(default)]
    pub state: Option<String>,
}

/// Response body for fetching a transaction by id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: String,
    #[serde(default)]
    pub state: Option<String>,
    /// Base64 custody-signed transaction, present once the custody service
    /// has produced its signature
    #[serde(default)]
    pub raw_transaction: Option<String>,
}

/// Client for the custody signing-and-broadcast API
pub struct CustodyClient {
    http: reqwest::Client,
    base_url: String,
    create_path: String,
    access_token: String,
    signer: Arc<dyn RequestSigner>,
}

/// Deterministic signing payload: path, millisecond timestamp, and the
/// literal serialized body, joined by a fixed delimiter. One-shot; the
/// timestamp must be fresh per attempt.
fn build_signing_payload(path: &str, timestamp_ms: i64, body: &str) -> String {
    format!("{path}|{timestamp_ms}|{body}")
}

impl CustodyClient {
    pub fn new(
        http: reqwest::Client,
        config: &CustodyConfig,
        signer: Arc<dyn RequestSigner>,
    ) -> Self {
        Self {
            http,
            base_url: config.api_base_url.clone(),
            create_path: config.create_path.clone(),
            access_token: config.access_token.clone(),
            signer,
        }
    }

    /// Submit a packaged transaction and wait for the custody signature.
    ///
    /// Non-2xx responses become [`SwapError::HttpStatus`] with the status code
    /// and best-effort parsed body; transport failures with no response become
    /// [`SwapError::Network`].
    pub async fn create_and_wait(
        &self,
        request: &CreateTransactionRequest,
    ) -> Result<SubmissionResult, SwapError> {
        let body = serde_json::to_string(request)
            .map_err(|e| SwapError::internal(format!("request serialization failed: {e}")))?;
        let timestamp = Utc::now().timestamp_millis();
        let payload = build_signing_payload(&self.create_path, timestamp, &body);
        let signature = self.signer.sign_payload(&payload)?;

        let url = format!("{}{}", self.base_url, self.create_path);
        debug!(url = %url, timestamp = timestamp, "Submitting transaction to custody");

        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.access_token))
            .header("x-signature", signature)
            .header("x-timestamp", timestamp.to_string())
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| SwapError::network(e))?;

        let status = response.status();
        let request_id = response
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(String::from);

        if !status.is_success() {
            return Err(Self::status_error(status.as_u16(), response).await);
        }

        let parsed: CreateTransactionResponse = response
            .json()
            .await
            .map_err(|e| SwapError::internal(format!("malformed custody response: {e}")))?;

        info!(
            transaction_id = %parsed.id,
            request_id = request_id.as_deref().unwrap_or("N/A"),
            "Transaction submitted to custody"
        );

        Ok(SubmissionResult {
            transaction_id: parsed.id,
            request_id,
        })
    }

    /// Fetch a transaction by id (bearer auth only)
    pub async fn get_transaction(&self, transaction_id: &str) -> Result<TransactionRecord, SwapError> {
        let url = format!("{}/api/v1/transactions/{}", self.base_url, transaction_id);

        let response = self
            .http
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.access_token))
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| SwapError::network(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::status_error(status.as_u16(), response).await);
        }

        response
            .json()
            .await
            .map_err(|e| SwapError::internal(format!("malformed custody response: {e}")))
    }

    /// Build an HTTP-status error with the body as structured detail when it
    /// parses as JSON, raw text otherwise.
    async fn status_error(status: u16, response: reqwest::Response) -> SwapError {
        let text = response.text().await.unwrap_or_default();
        let body = match serde_json::from_str::<serde_json::Value>(&text) {
            Ok(value) => value.to_string(),
            Err(_) => text,
        };
        SwapError::HttpStatus { status, body }
    }
}
