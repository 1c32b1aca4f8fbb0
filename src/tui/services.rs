use std::sync::Arc;

use tokio::sync::mpsc;

use crate::config::AppConfig;
use crate::core::api::{BackendClient, InventoryApi};
use crate::core::error::Result;
use crate::core::postal::{PinCodeValidator, PostalPincodeClient};

use super::events::{AppEvent, Notification, NotificationLevel};

/// Handle to the backend clients, shared by every view.
///
/// Built once at startup. The clients sit behind trait objects so tests can
/// hand views a mock backend.
#[derive(Clone)]
pub struct Services {
    pub api: Arc<dyn InventoryApi>,
    pub postal: Arc<dyn PinCodeValidator>,
    pub event_tx: mpsc::UnboundedSender<AppEvent>,
    /// Customer the order drafts are placed for.
    pub customer_id: i64,
}

impl Services {
    /// Build the HTTP clients from config. Fails only on an unusable base URL
    /// or TLS setup; nothing is contacted here.
    pub fn init(config: &AppConfig, event_tx: mpsc::UnboundedSender<AppEvent>) -> Result<Self> {
        let backend = BackendClient::new(&config.api)?;
        log::info!("Inventory backend: {}", backend.base_url());

        let postal = PostalPincodeClient::new(&config.api)?;
        log::info!("PIN lookup service: {}", config.api.postal_lookup_url);

        Ok(Self::new(
            Arc::new(backend),
            Arc::new(postal),
            event_tx,
            config.order.customer_id,
        ))
    }

    pub fn new(
        api: Arc<dyn InventoryApi>,
        postal: Arc<dyn PinCodeValidator>,
        event_tx: mpsc::UnboundedSender<AppEvent>,
        customer_id: i64,
    ) -> Self {
        Self {
            api,
            postal,
            event_tx,
            customer_id,
        }
    }

    /// Queue a notification for the overlay.
    pub fn notify(&self, level: NotificationLevel, message: impl Into<String>) {
        let _ = self
            .event_tx
            .send(AppEvent::Notification(Notification::new(level, message)));
    }
}
