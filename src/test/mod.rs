//! Shared fixtures for the unit tests.


pub use records::*;
pub use targets::FailingTarget;
