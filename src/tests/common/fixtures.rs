//! Test Fixtures

use crate::config::ApiConfig;
use crate::core::api::Product;

// =============================================================================
// Catalog Fixtures
// =============================================================================

/// A catalog product with round numbers.
pub fn product(id: i64, name: &str, price: f64, weight: f64, available: i64) -> Product {
    Product {
        id,
        name: name.to_string(),
        price,
        weight,
        available_quantity: available,
    }
}

// =============================================================================
// Config Fixtures
// =============================================================================

/// Client config with both the backend and the postal lookup at `base`.
pub fn api_config(base: &str) -> ApiConfig {
    ApiConfig {
        backend_url: base.to_string(),
        postal_lookup_url: base.to_string(),
        request_timeout_secs: 5,
        session_cookie: None,
    }
}
