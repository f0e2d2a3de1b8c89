use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use tokio::sync::broadcast;

use crate::config::AppConfig;
use crate::services::catalog::ServiceCatalog;
use crate::services::notify::{Envelope, NotificationPort};
use crate::services::places::PlacesProvider;

pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub config: AppConfig,
    pub catalog: ServiceCatalog,
    pub notifier: Box<dyn NotificationPort>,
    pub places: Box<dyn PlacesProvider>,
    /// Feed behind the SSE endpoint; the default notifier publishes here.
    pub events_tx: broadcast::Sender<Envelope>,
}
