//! HTTP client integration tests.
//!
//! Each test starts a wiremock server and points the real reqwest clients
//! at it, covering request shape, decoding and failure mapping.

mod backend_client;
mod postal_client;
