use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use watchlist_gateways::{ChannelContext, Outcome, PersistenceGateway, ServiceHealth};
use zeromq::{RepSocket, Socket, SocketRecv, SocketSend, ZmqMessage};

/// Bind a REP socket on an ephemeral port and serve the persistence protocol from memory
async fn spawn_persistence_server(store: Arc<Mutex<Vec<String>>>) -> String {
    let mut socket = RepSocket::new();
    let endpoint = socket.bind("tcp://127.0.0.1:0").await.unwrap().to_string();

    tokio::spawn(async move {
        while let Ok(message) = socket.recv().await {
            let request: Value = serde_json::from_str(&String::try_from(message).unwrap()).unwrap();
            let reply = match request["action"].as_str() {
                Some("load") => json!({"status": "success", "items": store.lock().unwrap().clone()}),
                Some("save") => {
                    let items = request["items"]
                        .as_array()
                        .unwrap()
                        .iter()
                        .map(|v| v.as_str().unwrap().to_string())
                        .collect();
                    *store.lock().unwrap() = items;
                    json!({"status": "success"})
                }
                _ => json!({"status": "error"}),
            };
            if socket.send(ZmqMessage::from(reply.to_string())).await.is_err() {
                break;
            }
        }
    });

    endpoint
}

/// A REP socket that reads requests and never answers
async fn spawn_silent_server() -> String {
    let mut socket = RepSocket::new();
    let endpoint = socket.bind("tcp://127.0.0.1:0").await.unwrap().to_string();

    tokio::spawn(async move {
        let _ = socket.recv().await;
        tokio::time::sleep(Duration::from_secs(30)).await;
    });

    endpoint
}

#[tokio::test]
async fn test_save_then_load_over_zmq() {
    let store = Arc::new(Mutex::new(vec!["Solaris".to_string()]));
    let endpoint = spawn_persistence_server(store.clone()).await;
    let context = ChannelContext::new(Duration::from_millis(1500), 1);

    let mut gateway = PersistenceGateway::connect(&context, &endpoint).await;
    assert_eq!(gateway.health(), ServiceHealth::Available);
    assert_eq!(gateway.take_probed_items(), vec!["Solaris"]);

    let items: Vec<String> = ["A", "B", "C"].iter().map(|s| s.to_string()).collect();
    assert!(gateway.save(&items).await);
    assert_eq!(gateway.load().await, Outcome::Success(items.clone()));
    assert_eq!(*store.lock().unwrap(), items);

    gateway.close().await;
}

#[tokio::test]
async fn test_silent_server_fails_probe_within_timeout() {
    let endpoint = spawn_silent_server().await;
    let context = ChannelContext::new(Duration::from_millis(200), 1);

    let started = std::time::Instant::now();
    let mut gateway = PersistenceGateway::connect(&context, &endpoint).await;

    assert_eq!(gateway.health(), ServiceHealth::Unavailable);
    assert!(gateway.take_probed_items().is_empty());
    // connect and probe are each bounded by the request timeout
    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(!gateway.save(&["Solaris".to_string()]).await);
}
