use crate::transport::{HubState, host_ws, relay_ws, viewer_ws};
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use scenecast_core::SceneListing;

/// Viewer socket plus the scene listing, served on the public HTTP port.
pub fn viewer_router(state: HubState) -> Router {
    Router::new()
        .route("/", get(viewer_ws))
        .route("/sceneList", get(scene_list))
        .with_state(state)
}

pub fn host_router(state: HubState) -> Router {
    Router::new().route("/", get(host_ws)).with_state(state)
}

pub fn relay_router(state: HubState) -> Router {
    Router::new().route("/", get(relay_ws)).with_state(state)
}

async fn scene_list(State(state): State<HubState>) -> Json<SceneListing> {
    Json(state.hub.scene_listing())
}
