//! Error types for the swap submission pipeline
//!
//! The taxonomy separates "the remote service rejected us" from "we could not
//! reach the remote service" so callers can branch on kind instead of parsing
//! message text.

use thiserror::Error;

/// Error type covering the full swap lifecycle: quoting, assembly, signing,
/// custody submission, and relay forwarding.
#[derive(Error, Debug)]
pub enum SwapError {
    /// A remote collaborator (quoting service, ledger RPC) returned an error.
    /// Propagated unchanged; no retry at this layer.
    #[error("Remote service error: {0}")]
    RemoteService(String),

    /// The custody service answered with a non-2xx status.
    ///
    /// `body` is the best-effort parsed error detail, falling back to the raw
    /// response text.
    #[error("HTTP error occurred: status = {status}\nError details: {body}")]
    HttpStatus { status: u16, body: String },

    /// No response was received at all (connect failure, timeout).
    #[error("Network error occurred: {0}")]
    Network(String),

    /// Relay (bundle forwarding) failure. Best-effort: callers log this and
    /// keep the swap counted as submitted.
    #[error("Relay error: {0}")]
    Relay(String),

    /// Request-authentication signing failed.
    #[error("Signing failed: {0}")]
    Signing(String),

    /// Invalid configuration or caller input (e.g. zero swap amount).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal invariant violation or serialization failure. Should be rare.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SwapError {
    /// Error category for log fields and event records.
    pub fn category(&self) -> &'static str {
        match self {
            Self::RemoteService(_) => "remote_service",
            Self::HttpStatus { .. } => "http_status",
            Self::Network(_) => "network",
            Self::Relay(_) => "relay",
            Self::Signing(_) => "signing",
            Self::Config(_) => "config",
            Self::Internal(_) => "internal",
        }
    }

    /// True when the failure means we never reached the remote service, as
    /// opposed to the service answering with an error status.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

// Convenience constructors for common failure sites
impl SwapError {
    pub fn remote(err: impl std::fmt::Display) -> Self {
        Self::RemoteService(err.to_string())
    }

    pub fn network(err: impl std::fmt::Display) -> Self {
        Self::Network(err.to_string())
    }

    pub fn relay(err: impl std::fmt::Display) -> Self {
        Self::Relay(err.to_string())
    }

    pub fn internal(err: impl std::fmt::Display) -> Self {
        Self::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_display_contains_status_and_body() {
        let err = SwapError::HttpStatus {
            status: 503,
            body: r#"{"error":"service unavailable"}"#.to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("503"));
        assert!(msg.contains(r#"{"error":"service unavailable"}"#));
    }

    #[test]
    fn test_network_error_distinct_from_status_error() {
        let net = SwapError::network("connection refused");
        let status = SwapError::HttpStatus {
            status: 503,
            body: "oops".to_string(),
        };
        assert!(net.is_network());
        assert!(!status.is_network());
        assert_ne!(net.category(), status.category());
    }

    #[test]
    fn test_categories() {
        assert_eq!(SwapError::remote("x").category(), "remote_service");
        assert_eq!(SwapError::relay("x").category(), "relay");
        assert_eq!(SwapError::Config("x".into()).category(), "config");
    }
}
