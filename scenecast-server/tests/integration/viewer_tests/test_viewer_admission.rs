use scenecast_core::{CloseCode, Envelope, PlayerId};
use scenecast_server::{HubConfig, Party, TokenList};
use serde_json::json;
use std::sync::Arc;

use crate::integration::init_tracing;
use crate::utils::TestHub;

#[tokio::test]
async fn test_viewer_without_host_is_refused() {
    init_tracing();
    let mut hub = TestHub::new();

    let mut viewer = hub.connect(Party::Viewer).await;

    assert_eq!(viewer.close_code(), Some(CloseCode::HostNotFound));
}

#[tokio::test]
async fn test_admitted_viewer_gets_config_and_id() {
    init_tracing();
    let mut hub = TestHub::new();
    let mut host = hub.host("plaza", "Fixed", None).await;

    let mut viewer = hub.connect(Party::Viewer).await;
    hub.send(&viewer, json!({"type": "userInfo", "cameraMode": "Fixed"}))
        .await;

    let received = viewer.received();
    assert!(matches!(received[0], Envelope::Config { .. }));
    assert_eq!(
        received[1],
        Envelope::AssignedId {
            player_id: PlayerId(0)
        }
    );
    assert_eq!(received[2], Envelope::PlayerCount { count: 1 });

    assert_eq!(
        host.received(),
        vec![Envelope::PlayerConnected {
            player_id: PlayerId(0),
            data_channel: true,
            sfu: true,
        }]
    );
}

#[tokio::test]
async fn test_capacity_full_is_explicit() {
    init_tracing();
    let config = HubConfig {
        max_player_controllers: 1,
        ..HubConfig::default()
    };
    let mut hub = TestHub::with(config, Arc::new(scenecast_server::AcceptAll));
    let _host = hub.host("plaza", "Fixed", None).await;

    let (_first, player) = hub.viewer("Fixed", None).await.unwrap();
    assert_eq!(player, PlayerId(0));

    let mut second = hub.connect(Party::Viewer).await;
    hub.send(&second, json!({"type": "userInfo", "cameraMode": "Fixed"}))
        .await;

    assert_eq!(second.close_code(), Some(CloseCode::CapacityFull));
    assert_eq!(hub.hub.viewers.len(), 1);
}

#[tokio::test]
async fn test_free_camera_viewer_takes_host_slot() {
    init_tracing();
    let mut hub = TestHub::new();
    let _host = hub.host("plaza", "3rdPerson", Some(7)).await;

    let (_viewer, player) = hub.viewer("3rdPerson", None).await.unwrap();
    assert_eq!(player, PlayerId(7));

    let mut late = hub.connect(Party::Viewer).await;
    hub.send(&late, json!({"type": "userInfo", "cameraMode": "3rdPerson"}))
        .await;
    assert_eq!(late.close_code(), Some(CloseCode::CapacityFull));
}

#[tokio::test]
async fn test_rejected_credential_closes_viewer() {
    init_tracing();
    let verifier = Arc::new(TokenList::new(["letmein".to_string()]));
    let mut hub = TestHub::with(HubConfig::default(), verifier);
    let _host = hub.host("plaza", "Fixed", None).await;

    let mut denied = hub.connect(Party::Viewer).await;
    hub.send(
        &denied,
        json!({"type": "userInfo", "cameraMode": "Fixed", "token": "guess"}),
    )
    .await;
    assert_eq!(denied.close_code(), Some(CloseCode::CredentialError));
    assert!(hub.hub.viewers.is_empty());

    let mut allowed = hub.connect(Party::Viewer).await;
    hub.send(
        &allowed,
        json!({"type": "userInfo", "cameraMode": "Fixed", "token": "letmein"}),
    )
    .await;
    assert_eq!(allowed.close_code(), None);
    assert_eq!(hub.hub.viewers.len(), 1);
}
