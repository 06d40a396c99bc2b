mod allocator;
mod credentials;

pub use allocator::*;
pub use credentials::*;
