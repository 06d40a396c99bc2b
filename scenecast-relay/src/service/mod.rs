mod hub_client;
mod hub_notifier;
mod relay_service;

pub use hub_client::*;
pub use hub_notifier::*;
pub use relay_service::*;
