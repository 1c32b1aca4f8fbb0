pub mod analytics;
pub mod order_preview;
pub mod products;
