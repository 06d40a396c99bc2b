pub mod test_hub;

pub use test_hub::*;
pub use test_peer::*;
