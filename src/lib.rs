/// Stockdesk - Inventory & Ordering Dashboard (TUI Edition)
///
/// Core library providing the backend API client, postal PIN-code lookup,
/// chart lifecycle management and draft-order state for the dashboard views.

pub mod config;
pub mod core;
pub mod tui;

#[cfg(test)]
mod tests;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
