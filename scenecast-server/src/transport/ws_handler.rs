use crate::hub::{Hub, HubEvent, Party};
use crate::registry::{ConnectionHandle, Outbound};
use axum::extract::State;
use axum::extract::ws::{CloseFrame, Message, Utf8Bytes, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use scenecast_core::{CloseCode, ConnectionId};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

#[derive(Clone)]
pub struct HubState {
    pub hub: Arc<Hub>,
    pub events: mpsc::UnboundedSender<HubEvent>,
}

pub async fn host_ws(ws: WebSocketUpgrade, State(state): State<HubState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, Party::Host, state))
}

pub async fn viewer_ws(ws: WebSocketUpgrade, State(state): State<HubState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, Party::Viewer, state))
}

pub async fn relay_ws(ws: WebSocketUpgrade, State(state): State<HubState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, Party::Relay, state))
}

async fn handle_socket(mut socket: WebSocket, party: Party, state: HubState) {
    let conn = ConnectionId::new();
    info!("New {:?} WebSocket connection: {}", party, conn);

    let (tx, mut outbound_rx) = mpsc::unbounded_channel();
    let connected = HubEvent::Connected {
        party,
        handle: ConnectionHandle::new(conn, tx),
    };
    if state.events.send(connected).is_err() {
        error!("Hub dispatcher is gone, dropping {}", conn);
        return;
    }

    // Ping every keep-alive period. No pong by the next tick ends the connection.
    let mut heartbeat = tokio::time::interval(state.hub.config.keep_alive());
    heartbeat.reset();
    let mut alive = true;
    let mut close_code = None;

    loop {
        tokio::select! {
            _ = heartbeat.tick() => {
                if !alive {
                    warn!("Heartbeat timeout for {}, disconnecting", conn);
                    close_code = Some(CloseCode::AbnormalClose);
                    break;
                }
                alive = false;
                if socket.send(Message::Ping(Vec::new().into())).await.is_err() {
                    break;
                }
            }

            outbound = outbound_rx.recv() => match outbound {
                Some(Outbound::Frame(json)) => {
                    if socket.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Some(Outbound::Close(code)) => {
                    let frame = CloseFrame {
                        code: code.code(),
                        reason: Utf8Bytes::from_static(code.reason()),
                    };
                    let _ = socket.send(Message::Close(Some(frame))).await;
                    close_code = Some(code);
                    break;
                }
                None => break,
            },

            inbound = socket.recv() => match inbound {
                Some(Ok(Message::Text(text))) => {
                    let frame = HubEvent::Frame {
                        conn,
                        text: text.as_str().to_owned(),
                    };
                    if state.events.send(frame).is_err() {
                        break;
                    }
                }
                Some(Ok(Message::Pong(_))) => alive = true,
                Some(Ok(Message::Close(frame))) => {
                    close_code = frame.and_then(|f| CloseCode::from_code(f.code));
                    break;
                }
                Some(Ok(Message::Binary(_))) => debug!("Ignoring binary frame from {}", conn),
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!("WebSocket error on {}: {}", conn, e);
                    break;
                }
                None => break,
            },
        }
    }

    let _ = state.events.send(HubEvent::Disconnected {
        conn,
        code: close_code,
    });
    info!("WebSocket disconnected: {}", conn);
}
