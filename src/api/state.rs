use crate::config::settings::Settings;
use crate::core::notify::{DeliveryMode, Notifier};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    /// Connection pool
    pub db: DatabaseConnection,
    /// Booking confirmation channel
    pub notifier: Arc<dyn Notifier>,
    /// How confirmations are handed to the notifier
    pub delivery: DeliveryMode,
    /// Hex SHA-256 digest of the admin token; `None` locks every admin route
    pub admin_token_sha256: Option<Arc<str>>,
}

impl AppState {
    /// Assembles the state from loaded settings.
    pub fn new(db: DatabaseConnection, notifier: Arc<dyn Notifier>, settings: &Settings) -> Self {
        Self {
            db,
            notifier,
            delivery: settings.notifications.delivery,
            admin_token_sha256: settings
                .auth
                .admin_token_sha256
                .as_deref()
                .map(|digest| Arc::from(digest.trim())),
        }
    }
}
