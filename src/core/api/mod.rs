//! Inventory backend access.
//!
//! Views talk to the backend through [`InventoryApi`] so tests can swap in
//! a mock; [`BackendClient`] is the reqwest implementation.

pub(crate) mod client;
pub mod models;

use async_trait::async_trait;

pub use client::BackendClient;
pub use models::{
    CourierService, DateRange, InventoryReport, Product, StockLevels, SupplierDistribution,
};

use crate::core::error::Result;

/// Read-only REST endpoints consumed by the dashboard.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InventoryApi: Send + Sync {
    /// `GET /api/inventory-reports?startDate&endDate`
    async fn inventory_report(&self, range: DateRange) -> Result<InventoryReport>;

    /// `GET /api/stocks`
    async fn products(&self) -> Result<Vec<Product>>;

    /// `GET /api/couriers-services`
    async fn courier_services(&self) -> Result<Vec<CourierService>>;
}
