//! Application state shared across all request handlers.

use gianhang_core::store::{CatalogStore, OrderStore};
use gianhang_core::workflow::PurchaseWorkflow;
use std::sync::Arc;

/// Application state that is shared across all request handlers.
///
/// Cloneable and cheap to pass around (everything is behind Arc).
#[derive(Clone)]
pub struct AppState {
    /// The purchase workflow, wired to the store and the supplier gateway.
    pub workflow: Arc<PurchaseWorkflow>,
    /// Catalog reads for the public product endpoints.
    pub catalog: Arc<dyn CatalogStore>,
    /// Order reads for the status-polling endpoint.
    pub orders: Arc<dyn OrderStore>,
}
