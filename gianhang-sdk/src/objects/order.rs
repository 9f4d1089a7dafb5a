use crate::objects::purchase::DeliveredCredential;
use crate::objects::OrderStatus;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Response payload for `GET /api/orders/{order_id}`, the endpoint the
/// storefront polls while an order is still `pending`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusData {
    pub order_id: Uuid,
    pub status: OrderStatus,
    pub quantity: u32,
    pub unit_price: i64,
    pub total_amount: i64,
    /// Unix timestamp of when the order was created.
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
    /// Present once the order is completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Vec<DeliveredCredential>>,
}
