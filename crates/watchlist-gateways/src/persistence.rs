use serde::Deserialize;
use tracing::{debug, warn};
use crate::channel::{report_failure, ChannelContext, RequestChannel};
use crate::connection::ServiceConnection;
use crate::health::ServiceHealth;
use crate::outcome::Outcome;
use crate::protocol::Request;

const SERVICE: &str = "persistence";

#[derive(Deserialize)]
struct LoadReply {
    #[serde(default)]
    items: Vec<String>,
}

#[derive(Deserialize)]
struct Ack {}

/// Client for the list store that keeps the watchlist between sessions.
///
/// Construction probes the service with a `load`. If that probe fails in any way
/// (unreachable, slow, garbage) the gateway is unavailable for the rest of the
/// process and whatever the service holds is not used this session.
pub struct PersistenceGateway {
    connection: ServiceConnection,
    probed_items: Option<Vec<String>>,
}

impl PersistenceGateway {
    pub async fn connect(context: &ChannelContext, endpoint: &str) -> Self {
        let connection = ServiceConnection::open(context, SERVICE, endpoint).await;
        Self::probe(connection).await
    }

    /// Build over an existing channel (custom transports, tests)
    pub async fn with_channel(channel: RequestChannel) -> Self {
        Self::probe(ServiceConnection::from_channel(channel)).await
    }

    async fn probe(mut connection: ServiceConnection) -> Self {
        if connection.health() != ServiceHealth::Unprobed {
            return Self {
                connection,
                probed_items: None,
            };
        }

        let probed_items = match connection.request::<LoadReply>(Request::Load).await {
            Ok(reply) => {
                debug!(service = SERVICE, items = reply.items.len(), "Loaded saved watchlist");
                Some(reply.items)
            }
            Err(e) => {
                report_failure(SERVICE, "load", &e);
                None
            }
        };
        connection.record_probe(probed_items.is_some());

        Self {
            connection,
            probed_items,
        }
    }

    pub fn health(&self) -> ServiceHealth {
        self.connection.health()
    }

    pub fn is_available(&self) -> bool {
        self.connection.is_available()
    }

    /// Hand over the list read by the startup probe. Empty when the probe failed
    /// or the items were already taken.
    pub fn take_probed_items(&mut self) -> Vec<String> {
        self.probed_items.take().unwrap_or_default()
    }

    /// Fetch the stored list again
    pub async fn load(&mut self) -> Outcome<Vec<String>> {
        if !self.is_available() {
            return Outcome::Unavailable;
        }

        match self.connection.request::<LoadReply>(Request::Load).await {
            Ok(reply) => Outcome::Success(reply.items),
            Err(e) => {
                report_failure(SERVICE, "load", &e);
                Outcome::Unavailable
            }
        }
    }

    /// Replace the stored list with `items`. Returns whether the service confirmed it.
    pub async fn save(&mut self, items: &[String]) -> bool {
        if !self.is_available() {
            debug!(service = SERVICE, "Skipping save, service unavailable this session");
            return false;
        }

        let request = Request::Save {
            items: items.to_vec(),
        };
        match self.connection.request::<Ack>(request).await {
            Ok(Ack {}) => true,
            Err(e) => {
                report_failure(SERVICE, "save", &e);
                warn!(
                    service = SERVICE,
                    operation = "save",
                    items = items.len(),
                    "Watchlist changes are kept for this session only"
                );
                false
            }
        }
    }

    pub async fn close(&mut self) {
        self.connection.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemoryPersistenceService, ScriptedTransport};
    use serde_json::json;
    use std::time::Duration;

    fn context() -> ChannelContext {
        ChannelContext::new(Duration::from_millis(50), 1)
    }

    async fn gateway_over(transport: ScriptedTransport) -> PersistenceGateway {
        PersistenceGateway::with_channel(context().channel(SERVICE, Box::new(transport))).await
    }

    #[tokio::test]
    async fn test_probe_success_keeps_items() {
        let mut gateway = gateway_over(
            ScriptedTransport::new().reply(json!({"status": "success", "items": ["Alien", "Heat"]})),
        )
        .await;

        assert_eq!(gateway.health(), ServiceHealth::Available);
        assert_eq!(gateway.take_probed_items(), vec!["Alien", "Heat"]);
        assert!(gateway.take_probed_items().is_empty());
    }

    #[tokio::test]
    async fn test_probe_missing_items_means_empty_list() {
        let mut gateway = gateway_over(ScriptedTransport::new().reply(json!({"status": "success"}))).await;
        assert!(gateway.is_available());
        assert!(gateway.take_probed_items().is_empty());
    }

    #[tokio::test]
    async fn test_probe_malformed_replies_mark_unavailable() {
        let replies = [
            json!({"items": ["Alien"]}),
            json!({"status": "error", "items": ["Alien"]}),
            json!({"status": "success", "items": "Alien"}),
        ];

        for reply in replies {
            let mut gateway = gateway_over(ScriptedTransport::new().reply(reply)).await;
            assert_eq!(gateway.health(), ServiceHealth::Unavailable);
            assert!(gateway.take_probed_items().is_empty());
        }
    }

    #[tokio::test]
    async fn test_probe_timeout_discards_remote_data() {
        // The service does hold a list, it is just too slow to hand it over.
        let service = MemoryPersistenceService::with_items(["Alien", "Heat"]).with_delay(Duration::from_millis(200));
        let mut gateway = PersistenceGateway::with_channel(context().channel(SERVICE, Box::new(service.clone()))).await;

        assert_eq!(gateway.health(), ServiceHealth::Unavailable);
        assert!(gateway.take_probed_items().is_empty());
        assert_eq!(service.items(), vec!["Alien", "Heat"]);
    }

    #[tokio::test]
    async fn test_unavailable_gateway_sends_nothing() {
        let transport = ScriptedTransport::new()
            .fail("connection refused")
            .reply(json!({"status": "success"}));
        let log = transport.log();
        let mut gateway = gateway_over(transport).await;

        assert!(!gateway.save(&["Alien".to_string()]).await);
        assert_eq!(gateway.load().await, Outcome::Unavailable);
        assert_eq!(log.actions(), vec!["load"]);
    }

    #[tokio::test]
    async fn test_save_requires_success_status() {
        let transport = ScriptedTransport::new()
            .reply(json!({"status": "success", "items": []}))
            .reply(json!({"status": "success"}))
            .reply(json!({"status": "error"}));
        let log = transport.log();
        let mut gateway = gateway_over(transport).await;
        let items = vec!["Alien".to_string(), "Heat".to_string()];

        assert!(gateway.save(&items).await);
        assert!(!gateway.save(&items).await);

        let sent = log.requests();
        assert_eq!(sent[1], json!({"action": "save", "version": 1, "items": ["Alien", "Heat"]}));
    }

    #[tokio::test]
    async fn test_save_timeout_reports_false_and_blocks_later_saves() {
        let transport = ScriptedTransport::new()
            .reply(json!({"status": "success", "items": []}))
            .hang()
            .reply(json!({"status": "success"}));
        let log = transport.log();
        let mut gateway = gateway_over(transport).await;
        assert!(gateway.is_available());
        let items = vec!["Alien".to_string()];

        assert!(!gateway.save(&items).await);
        assert_eq!(log.actions(), vec!["load", "save"]);

        // the socket still owes the timed-out reply, so nothing else is sent
        assert!(!gateway.save(&items).await);
        assert_eq!(log.len(), 2);
        assert_eq!(gateway.load().await, Outcome::Unavailable);
        assert_eq!(log.len(), 2);
    }

    #[tokio::test]
    async fn test_save_then_load_round_trip() {
        let service = MemoryPersistenceService::new();
        let mut gateway = PersistenceGateway::with_channel(context().channel(SERVICE, Box::new(service.clone()))).await;
        let items: Vec<String> = ["A", "B", "C"].iter().map(|s| s.to_string()).collect();

        assert!(gateway.save(&items).await);
        assert_eq!(gateway.load().await, Outcome::Success(items));
    }

    #[tokio::test]
    async fn test_connect_failure_is_unavailable() {
        let context = ChannelContext::new(Duration::from_millis(200), 1);
        let mut gateway = PersistenceGateway::connect(&context, "tcp://not a valid endpoint").await;

        assert_eq!(gateway.health(), ServiceHealth::Unavailable);
        assert!(!gateway.save(&[]).await);
    }
}
