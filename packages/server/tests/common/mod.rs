// Common test utilities

pub mod api;
pub mod harness;

#[allow(unused_imports)]
pub use api::*;
#[allow(unused_imports)]
pub use harness::*;
