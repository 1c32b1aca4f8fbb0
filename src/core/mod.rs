pub mod logging;
pub mod error;

// Backend REST client + wire models
pub mod api;

// External postal PIN-code lookup
pub mod postal;

// Chart slots and the analytics refresh cycle
pub mod analytics;

// Draft order state and submission
pub mod order;
