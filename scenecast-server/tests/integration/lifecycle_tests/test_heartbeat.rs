use futures::StreamExt;
use scenecast_server::{AcceptAll, Dispatcher, Hub, HubConfig, HubState, host_router};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use crate::integration::init_tracing;

const KEEP_ALIVE: Duration = Duration::from_millis(200);

async fn spawn_host_endpoint() -> anyhow::Result<String> {
    let config = HubConfig {
        keep_alive_ms: KEEP_ALIVE.as_millis() as u64,
        ..HubConfig::default()
    };
    let hub = Arc::new(Hub::new(config, Arc::new(AcceptAll)));
    let (dispatcher, events) = Dispatcher::new(hub.clone());
    tokio::spawn(dispatcher.run());

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let router = host_router(HubState { hub, events });
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Ok(format!("ws://{addr}/"))
}

#[tokio::test]
async fn test_one_missed_pong_ends_connection() {
    init_tracing();
    let url = spawn_host_endpoint().await.expect("endpoint");
    let (mut ws, _) = connect_async(url.as_str()).await.expect("connect");

    // Not polling the stream means the ping sent after one period is never answered,
    // so the hub hangs up on its second tick.
    tokio::time::sleep(KEEP_ALIVE * 5 / 2).await;

    let ended = tokio::time::timeout(Duration::from_millis(50), async {
        while let Some(msg) = ws.next().await {
            if msg.is_err() || matches!(msg, Ok(Message::Close(_))) {
                return;
            }
        }
    })
    .await;

    assert!(ended.is_ok(), "connection still open after a missed pong");
}

#[tokio::test]
async fn test_answered_pings_keep_connection_open() {
    init_tracing();
    let url = spawn_host_endpoint().await.expect("endpoint");
    let (mut ws, _) = connect_async(url.as_str()).await.expect("connect");

    // Polling answers each ping with a pong.
    let outcome = tokio::time::timeout(KEEP_ALIVE * 4, async {
        while let Some(msg) = ws.next().await {
            if msg.is_err() || matches!(msg, Ok(Message::Close(_))) {
                return;
            }
        }
    })
    .await;

    assert!(outcome.is_err(), "hub closed a responsive connection");
}
