use serde::de::DeserializeOwned;
use tracing::{info, warn};
use crate::channel::{ChannelContext, RequestChannel};
use crate::error::GatewayError;
use crate::health::ServiceHealth;
use crate::protocol::Request;

/// A gateway's exclusive link to its service, together with the probed health.
///
/// A connection that could not be established at construction has no channel and is
/// `Unavailable` from the start.
pub struct ServiceConnection {
    service: &'static str,
    channel: Option<RequestChannel>,
    health: ServiceHealth,
}

impl ServiceConnection {
    pub async fn open(context: &ChannelContext, service: &'static str, endpoint: &str) -> Self {
        match context.open(service, endpoint).await {
            Ok(channel) => Self::from_channel(channel),
            Err(e) => {
                warn!(
                    service,
                    endpoint,
                    operation = "connect",
                    error = %e,
                    "Could not connect, service will be unavailable for this session"
                );
                let mut health = ServiceHealth::Unprobed;
                health.resolve(false);
                Self {
                    service,
                    channel: None,
                    health,
                }
            }
        }
    }

    pub fn from_channel(channel: RequestChannel) -> Self {
        Self {
            service: channel.service(),
            channel: Some(channel),
            health: ServiceHealth::Unprobed,
        }
    }

    pub fn service(&self) -> &'static str {
        self.service
    }

    pub fn health(&self) -> ServiceHealth {
        self.health
    }

    pub fn is_available(&self) -> bool {
        self.health.is_available()
    }

    /// Fix the health from the probe outcome; later calls have no effect
    pub(crate) fn record_probe(&mut self, succeeded: bool) -> ServiceHealth {
        if self.health == ServiceHealth::Unprobed {
            let endpoint = self.channel.as_ref().map(|c| c.endpoint().to_string()).unwrap_or_default();
            if succeeded {
                info!(service = self.service, endpoint = %endpoint, operation = "probe", "Service available");
            } else {
                warn!(
                    service = self.service,
                    endpoint = %endpoint,
                    operation = "probe",
                    "Service unavailable, continuing without it for this session"
                );
            }
        }
        self.health.resolve(succeeded)
    }

    /// Send a request regardless of health. Gateways check health first for
    /// everything except the probe itself.
    pub(crate) async fn request<T: DeserializeOwned>(&mut self, request: Request) -> Result<T, GatewayError> {
        match self.channel.as_mut() {
            Some(channel) => channel.call_for(&request).await,
            None => Err(GatewayError::Transport("not connected".to_string())),
        }
    }

    pub async fn close(&mut self) {
        if let Some(channel) = self.channel.as_mut() {
            channel.close().await;
        }
    }
}
