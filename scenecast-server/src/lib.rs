pub mod config;
pub mod error;
pub mod hub;
pub mod identity;
pub mod registry;
pub mod transport;

pub use config::*;
pub use error::*;
pub use hub::*;
pub use identity::*;
pub use registry::*;
pub use transport::*;

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

pub fn verifier_for(config: &HubConfig) -> Arc<dyn CredentialVerifier> {
    if config.access_tokens.is_empty() {
        Arc::new(AcceptAll)
    } else {
        Arc::new(TokenList::new(config.access_tokens.iter().cloned()))
    }
}

async fn bind(address: &str, port: u16) -> Result<TcpListener, HubError> {
    let addr = format!("{address}:{port}");
    TcpListener::bind(&addr)
        .await
        .map_err(|source| HubError::Bind { addr, source })
}

/// Binds the viewer, render-host and relay listeners and runs the hub until one of them fails.
pub async fn serve(config: HubConfig, verifier: Arc<dyn CredentialVerifier>) -> Result<(), HubError> {
    config.validate()?;

    let viewer_listener = bind(&config.bind_address, config.http_port).await?;
    let host_listener = bind(&config.bind_address, config.streamer_port).await?;
    let relay_listener = bind(&config.bind_address, config.relay_port).await?;

    info!(
        "Hub listening: viewers on {}, render hosts on {}, relay on {}",
        config.http_port, config.streamer_port, config.relay_port
    );

    let hub = Arc::new(Hub::new(config, verifier));
    let (dispatcher, events) = Dispatcher::new(hub.clone());
    tokio::spawn(dispatcher.run());

    let state = HubState { hub, events };

    let viewers = async { axum::serve(viewer_listener, viewer_router(state.clone())).await };
    let hosts = async { axum::serve(host_listener, host_router(state.clone())).await };
    let relays = async { axum::serve(relay_listener, relay_router(state.clone())).await };

    tokio::try_join!(viewers, hosts, relays).map_err(HubError::Serve)?;
    Ok(())
}
