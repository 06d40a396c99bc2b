pub mod config;
pub mod connector;
pub mod error;
pub mod events;
pub mod framing;
pub mod handoff;

pub use config::*;
pub use connector::*;
pub use error::*;
pub use events::*;
pub use framing::*;
pub use handoff::*;
