use std::sync::Arc;

use dealping_events::ReminderNotifier;

use crate::config::ServerConfig;
use crate::extraction::ContractExtractor;
use crate::storage::FileStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything is behind `Arc` or is already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: dealping_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Delivery channel used by the dispatch endpoint.
    pub notifier: Arc<dyn ReminderNotifier>,
    /// Document extraction service client.
    pub extractor: Arc<dyn ContractExtractor>,
    /// Storage for uploaded contract documents.
    pub files: FileStore,
}
