mod routes;
mod ws_handler;

pub use routes::*;
pub use ws_handler::*;
