//! Crate-level tests that cut across modules.
//!
//! - `integration`: HTTP clients against a local wiremock server
//! - `property`: proptest invariants for the order draft and chart board

mod common;
mod integration;
mod property;
