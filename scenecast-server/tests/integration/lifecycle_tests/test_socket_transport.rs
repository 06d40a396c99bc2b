use futures::{SinkExt, StreamExt};
use scenecast_core::CloseCode;
use scenecast_server::{AcceptAll, Dispatcher, Hub, HubConfig, HubState, viewer_router};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use crate::integration::init_tracing;

async fn spawn_viewer_endpoint() -> anyhow::Result<String> {
    let hub = Arc::new(Hub::new(HubConfig::default(), Arc::new(AcceptAll)));
    let (dispatcher, events) = Dispatcher::new(hub.clone());
    tokio::spawn(dispatcher.run());

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let router = viewer_router(HubState { hub, events });
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Ok(format!("ws://{addr}/"))
}

#[tokio::test]
async fn test_viewer_socket_closed_with_host_not_found() {
    init_tracing();
    let url = spawn_viewer_endpoint().await.expect("endpoint");

    let (mut ws, _) = connect_async(url.as_str()).await.expect("connect");
    ws.send(Message::Text(r#"{"type":"ping"}"#.to_string().into()))
        .await
        .ok();

    let close = tokio::time::timeout(Duration::from_secs(5), async {
        while let Some(msg) = ws.next().await {
            if let Ok(Message::Close(frame)) = msg {
                return frame.map(|f| u16::from(f.code));
            }
        }
        None
    })
    .await
    .expect("timed out waiting for close");

    assert_eq!(close, Some(CloseCode::HostNotFound.code()));
}
