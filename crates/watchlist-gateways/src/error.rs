use std::time::Duration;
use thiserror::Error;

/// Why a single request/reply exchange failed.
///
/// Gateways log these and fold every variant into "unavailable"; callers above
/// the gateway boundary never see them.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("could not connect to {endpoint}: {reason}")]
    Connection { endpoint: String, reason: String },

    #[error("no reply within {0:?}")]
    Timeout(Duration),

    #[error("malformed reply: {0}")]
    MalformedReply(String),

    #[error("request rejected by service (status \"{0}\")")]
    Rejected(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),
}

impl GatewayError {
    /// Short label for structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::Connection { .. } => "connection",
            GatewayError::Timeout(_) => "timeout",
            GatewayError::MalformedReply(_) => "malformed_reply",
            GatewayError::Rejected(_) => "rejected",
            GatewayError::Transport(_) => "transport",
            GatewayError::Encode(_) => "encode",
        }
    }
}
