mod data_channel;
mod peer;
mod room;
mod room_command;
mod room_manager;
mod room_observer;
mod worker;

pub use data_channel::*;
pub use peer::*;
pub use room::*;
pub use room_command::*;
pub use room_manager::*;
pub use room_observer::*;
pub use worker::*;
