mod connection;
mod host;
mod relay;
mod viewer;

pub use connection::*;
pub use host::*;
pub use relay::*;
pub use viewer::*;
