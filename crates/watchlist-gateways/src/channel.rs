use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{trace, warn};
use watchlist_config::ChannelConfig;
use crate::error::GatewayError;
use crate::protocol::{Reply, Request};
use crate::transport::{Transport, ZmqTransport};

/// Process-wide channel settings. Built once at startup and handed to every gateway.
#[derive(Debug, Clone)]
pub struct ChannelContext {
    request_timeout: Duration,
    protocol_version: u32,
}

impl ChannelContext {
    pub fn new(request_timeout: Duration, protocol_version: u32) -> Self {
        Self {
            request_timeout,
            protocol_version,
        }
    }

    pub fn from_config(config: &ChannelConfig) -> Self {
        Self::new(config.request_timeout(), config.protocol_version)
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn protocol_version(&self) -> u32 {
        self.protocol_version
    }

    /// Connect a ZeroMQ REQ socket to `endpoint` and wrap it in a channel
    pub async fn open(&self, service: &'static str, endpoint: &str) -> Result<RequestChannel, GatewayError> {
        let transport = ZmqTransport::connect(endpoint, self.request_timeout).await?;
        Ok(self.channel(service, Box::new(transport)))
    }

    /// Wrap an already-connected transport
    pub fn channel(&self, service: &'static str, transport: Box<dyn Transport>) -> RequestChannel {
        RequestChannel {
            service,
            transport,
            timeout: self.request_timeout,
            version: self.protocol_version,
            awaiting_reply: false,
        }
    }
}

impl Default for ChannelContext {
    fn default() -> Self {
        Self::from_config(&ChannelConfig::default())
    }
}

/// A transport plus the bound on every exchange made through it
pub struct RequestChannel {
    service: &'static str,
    transport: Box<dyn Transport>,
    timeout: Duration,
    version: u32,
    // Set when a request timed out; the REQ socket still owes us that reply
    awaiting_reply: bool,
}

impl RequestChannel {
    pub fn service(&self) -> &'static str {
        self.service
    }

    pub fn endpoint(&self) -> &str {
        self.transport.endpoint()
    }

    /// Send one request and wait at most the configured timeout for its reply
    pub async fn call(&mut self, request: &Request) -> Result<Reply, GatewayError> {
        if self.awaiting_reply {
            return Err(GatewayError::Transport(
                "an earlier request timed out and its reply is still outstanding".to_string(),
            ));
        }

        let payload = request.encode(self.version)?;
        trace!(service = self.service, action = request.action(), %payload, "Sending request");

        let raw = match tokio::time::timeout(self.timeout, self.transport.round_trip(payload)).await {
            Ok(result) => result?,
            Err(_) => {
                self.awaiting_reply = true;
                return Err(GatewayError::Timeout(self.timeout));
            }
        };

        trace!(service = self.service, action = request.action(), reply = %raw, "Received reply");
        Reply::parse(&raw)
    }

    /// [`call`](Self::call) and decode the payload
    pub async fn call_for<T: DeserializeOwned>(&mut self, request: &Request) -> Result<T, GatewayError> {
        self.call(request).await?.payload()
    }

    pub async fn close(&mut self) {
        self.transport.close().await;
    }
}

pub(crate) fn report_failure(service: &str, action: &str, error: &GatewayError) {
    warn!(
        service,
        operation = action,
        kind = error.kind(),
        error = %error,
        "Remote call failed"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedTransport;
    use serde_json::json;

    fn context() -> ChannelContext {
        ChannelContext::new(Duration::from_millis(50), 1)
    }

    #[tokio::test]
    async fn test_call_stamps_version() {
        let transport = ScriptedTransport::new().reply(json!({"status": "success"}));
        let log = transport.log();
        let mut channel = ChannelContext::new(Duration::from_millis(50), 3).channel("test", Box::new(transport));

        channel.call(&Request::Load).await.unwrap();

        assert_eq!(log.requests(), vec![json!({"action": "load", "version": 3})]);
    }

    #[tokio::test]
    async fn test_timeout_blocks_further_calls() {
        let transport = ScriptedTransport::new()
            .hang()
            .reply(json!({"status": "success"}));
        let log = transport.log();
        let mut channel = context().channel("test", Box::new(transport));

        assert!(matches!(channel.call(&Request::Load).await, Err(GatewayError::Timeout(_))));
        assert!(matches!(channel.call(&Request::Load).await, Err(GatewayError::Transport(_))));
        assert_eq!(log.len(), 1);
    }

    #[tokio::test]
    async fn test_transport_error_passes_through() {
        let transport = ScriptedTransport::new()
            .fail("connection reset")
            .reply(json!({"status": "success"}));
        let mut channel = context().channel("test", Box::new(transport));

        assert!(matches!(channel.call(&Request::Load).await, Err(GatewayError::Transport(_))));
        assert!(channel.call(&Request::Load).await.is_ok());
    }

    #[tokio::test]
    async fn test_close_releases_transport() {
        let transport = ScriptedTransport::new();
        let closed = transport.closed_flag();
        let mut channel = context().channel("test", Box::new(transport));

        channel.close().await;
        assert!(closed.load(std::sync::atomic::Ordering::SeqCst));
    }
}
