//! Test support utilities and fixtures for itemforge integration tests

pub mod harness;
pub mod helpers;

pub use harness::TestWorkspace;
pub use helpers::{basic_item_descriptor, mighty_blade_descriptor};
