use crate::objects::OrderStatus;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request payload for `POST /api/orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    pub product_id: Uuid,
    pub quantity: u32,
    /// Mandatory when the product defines options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_option_id: Option<Uuid>,
    /// Optional promotion code forwarded to the supplier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<String>,
}

/// Success payload for `POST /api/orders`.
///
/// Either `credentials` is present (delivered within the request) or
/// `status` is `pending` and `attempts` reports how many fulfillment polls
/// ran before the shop gave the upstream more time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseData {
    pub order_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Vec<DeliveredCredential>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempts: Option<u32>,
}

/// One delivered account credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveredCredential {
    pub user: String,
    pub pass: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::ApiResponse;

    #[test]
    fn request_uses_camel_case_keys() {
        let parsed: PurchaseRequest = serde_json::from_str(
            r#"{"productId":"a9f3b9a0-0000-0000-0000-000000000001","quantity":2,"selectedOptionId":"a9f3b9a0-0000-0000-0000-000000000002"}"#,
        )
        .unwrap();
        assert_eq!(parsed.quantity, 2);
        assert!(parsed.selected_option_id.is_some());
        assert!(parsed.promotion.is_none());
    }

    #[test]
    fn failure_envelope_omits_data() {
        let body = serde_json::to_string(&ApiResponse::<PurchaseData>::error("Sản phẩm đã hết hàng"))
            .unwrap();
        assert_eq!(body, r#"{"success":false,"error":"Sản phẩm đã hết hàng"}"#);
    }
}
