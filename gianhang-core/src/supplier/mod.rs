//! Supplier gateway.
//!
//! Wraps the upstream reseller's two-step buy/fetch protocol behind a stable
//! interface:
//!
//! - [`SupplierGateway::place_order`] buys N units under a kiosk token and
//!   returns the upstream order id.
//! - [`SupplierGateway::fetch_order`] polls that order id until the raw
//!   credential lines are delivered.
//!
//! The upstream's string-tagged success flags are converted into sum types
//! at this boundary; nothing string-typed leaks into the purchase workflow.

pub mod credential;
pub mod taphoammo;

pub use credential::{Credential, parse_credential};
pub use taphoammo::TapHoaMmoClient;

use async_trait::async_trait;
use thiserror::Error;

/// A successfully placed upstream order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedOrder {
    /// Identifier assigned by the supplier, used to poll for fulfillment.
    pub upstream_order_id: String,
}

/// Result of one fulfillment poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// One raw credential line per purchased unit.
    Delivered(Vec<String>),
    /// The supplier is still fulfilling asynchronously; poll again later.
    Processing,
}

/// Errors surfaced by a supplier gateway.
#[derive(Debug, Error)]
pub enum SupplierError {
    /// The supplier answered but rejected the request.
    #[error("supplier rejected the request: {0}")]
    Rejected(String),

    /// The request never completed.
    #[error("supplier request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The supplier answered with a body the gateway cannot interpret.
    #[error("malformed supplier response: {0}")]
    Malformed(String),
}

/// Stateless client for the upstream reseller; one implementation per
/// supplier, mocked in workflow tests.
#[async_trait]
pub trait SupplierGateway: Send + Sync {
    /// Buy `quantity` units of the catalog item identified by `kiosk_token`.
    async fn place_order(
        &self,
        kiosk_token: &str,
        quantity: u32,
        promotion: Option<&str>,
    ) -> Result<PlacedOrder, SupplierError>;

    /// Poll a placed order for its delivered credential lines.
    async fn fetch_order(&self, upstream_order_id: &str) -> Result<FetchOutcome, SupplierError>;
}
