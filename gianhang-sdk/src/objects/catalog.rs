use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Public view of a catalog product.
///
/// Supplier kiosk tokens are intentionally absent from these types; they
/// never leave the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    /// Absent when the product is priced through its options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
    pub currency: String,
    /// Absent when stock is not tracked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<i32>,
    pub sold: i32,
    #[serde(default)]
    pub options: Vec<ProductOptionView>,
}

/// Public view of a product option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductOptionView {
    pub id: Uuid,
    pub label: String,
    pub price: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<i32>,
}
