pub mod config;
pub mod engine;
pub mod error;
pub mod room;
pub mod service;
pub mod slots;

pub use config::*;
pub use engine::*;
pub use error::*;
pub use room::*;
pub use service::*;
pub use slots::*;
