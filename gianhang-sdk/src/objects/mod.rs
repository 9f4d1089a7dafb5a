pub mod catalog;
pub mod order;
pub mod purchase;

pub use catalog::{ProductOptionView, ProductView};
pub use order::OrderStatusData;
pub use purchase::{DeliveredCredential, PurchaseData, PurchaseRequest};

use serde::{Deserialize, Serialize};

/// Header carrying the buyer's identity, filled in by the session layer in
/// front of the storefront.
pub const USER_HEADER: &str = "X-User-Id";

/// Response envelope used by every storefront endpoint.
///
/// Success carries `data`, failure carries a short localized `error`
/// message; the two are never set together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Order states as exposed by the API.
///
/// This is the API/DTO version; the storage enum lives in the core crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Completed,
    Cancelled,
}
