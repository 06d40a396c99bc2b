pub mod test_relay;

pub use recording_observer::*;
pub use test_relay::*;
