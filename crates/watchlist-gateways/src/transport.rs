use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;
use zeromq::{ReqSocket, Socket, SocketRecv, SocketSend, ZmqMessage};
use crate::error::GatewayError;

/// One outbound request/reply connection.
///
/// A transport carries exactly one request at a time and returns exactly one reply.
/// It does not bound the wait; [`crate::RequestChannel`] does.
#[async_trait]
pub trait Transport: Send {
    fn endpoint(&self) -> &str;

    async fn round_trip(&mut self, request: String) -> Result<String, GatewayError>;

    /// Release the underlying connection. Further round trips fail.
    async fn close(&mut self);
}

/// ZeroMQ REQ socket transport
pub struct ZmqTransport {
    endpoint: String,
    socket: Option<ReqSocket>,
}

impl ZmqTransport {
    pub async fn connect(endpoint: &str, timeout: Duration) -> Result<Self, GatewayError> {
        let mut socket = ReqSocket::new();

        match tokio::time::timeout(timeout, socket.connect(endpoint)).await {
            Ok(Ok(())) => {
                debug!(endpoint, "Connected REQ socket");
                Ok(Self {
                    endpoint: endpoint.to_string(),
                    socket: Some(socket),
                })
            }
            Ok(Err(e)) => Err(GatewayError::Connection {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            }),
            Err(_) => Err(GatewayError::Connection {
                endpoint: endpoint.to_string(),
                reason: format!("connect timed out after {:?}", timeout),
            }),
        }
    }
}

#[async_trait]
impl Transport for ZmqTransport {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn round_trip(&mut self, request: String) -> Result<String, GatewayError> {
        let socket = self
            .socket
            .as_mut()
            .ok_or_else(|| GatewayError::Transport("socket already closed".to_string()))?;

        socket
            .send(ZmqMessage::from(request))
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let reply = socket
            .recv()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        String::try_from(reply).map_err(|e| GatewayError::MalformedReply(e.to_string()))
    }

    async fn close(&mut self) {
        if let Some(socket) = self.socket.take() {
            let errors = socket.close().await;
            for error in errors {
                debug!(endpoint = %self.endpoint, error = %error, "Error while closing REQ socket");
            }
            debug!(endpoint = %self.endpoint, "Closed REQ socket");
        }
    }
}
