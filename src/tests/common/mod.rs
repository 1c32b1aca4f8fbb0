//! Common Test Utilities
//!
//! Shared fixtures for building catalog products and client configs
//! pointed at a mock server.

pub mod fixtures;

pub use fixtures::*;
