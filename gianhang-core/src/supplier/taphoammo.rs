//! TapHoaMMO client.
//!
//! The reseller exposes two GET endpoints keyed by an account-level user
//! token plus a per-product kiosk token:
//!
//! - `api/buyProducts` places an order and returns the upstream order id.
//! - `api/getProducts` polls an order; while the reseller is still
//!   fulfilling it answers a failure whose description carries a
//!   "processing" marker.
//!
//! Responses tag success as the strings `"true"`/`"false"`; they are mapped
//! to [`PlacedOrder`]/[`FetchOutcome`] here and never escape this module.

use super::{FetchOutcome, PlacedOrder, SupplierError, SupplierGateway};
use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

/// Case-insensitive substring marking an order the reseller is still
/// fulfilling.
const PROCESSING_MARKER: &str = "processing";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct BuyProductsResponse {
    success: String,
    order_id: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct GetProductsResponse {
    success: String,
    data: Option<Vec<DeliveredItem>>,
    description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct DeliveredItem {
    product: String,
}

impl BuyProductsResponse {
    fn into_outcome(self) -> Result<PlacedOrder, SupplierError> {
        if self.success != "true" {
            return Err(SupplierError::Rejected(
                self.description
                    .unwrap_or_else(|| "order was not accepted".to_owned()),
            ));
        }
        match self.order_id {
            Some(upstream_order_id) => Ok(PlacedOrder { upstream_order_id }),
            None => Err(SupplierError::Malformed(
                "accepted order without an order_id".to_owned(),
            )),
        }
    }
}

impl GetProductsResponse {
    fn into_outcome(self) -> Result<FetchOutcome, SupplierError> {
        if self.success == "true" {
            let items = self.data.unwrap_or_default();
            if items.is_empty() {
                return Err(SupplierError::Malformed(
                    "delivered order without credential data".to_owned(),
                ));
            }
            return Ok(FetchOutcome::Delivered(
                items.into_iter().map(|item| item.product).collect(),
            ));
        }
        let description = self.description.unwrap_or_default();
        if description.to_lowercase().contains(PROCESSING_MARKER) {
            Ok(FetchOutcome::Processing)
        } else {
            Err(SupplierError::Rejected(description))
        }
    }
}

/// HTTP client for the TapHoaMMO reseller API.
#[derive(Debug, Clone)]
pub struct TapHoaMmoClient {
    http: reqwest::Client,
    base_url: Url,
    user_token: String,
}

impl TapHoaMmoClient {
    pub fn new(base_url: Url, user_token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            base_url,
            user_token: user_token.into(),
        }
    }

    /// Replace the default `reqwest::Client` (e.g. to configure a proxy).
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    fn endpoint(&self, path: &str) -> Result<Url, SupplierError> {
        self.base_url
            .join(path)
            .map_err(|e| SupplierError::Malformed(format!("invalid endpoint url: {e}")))
    }
}

#[async_trait]
impl SupplierGateway for TapHoaMmoClient {
    async fn place_order(
        &self,
        kiosk_token: &str,
        quantity: u32,
        promotion: Option<&str>,
    ) -> Result<PlacedOrder, SupplierError> {
        let quantity = quantity.to_string();
        let mut query = vec![
            ("kioskToken", kiosk_token),
            ("userToken", self.user_token.as_str()),
            ("quantity", quantity.as_str()),
        ];
        if let Some(promotion) = promotion {
            query.push(("promotion", promotion));
        }

        let response: BuyProductsResponse = self
            .http
            .get(self.endpoint("api/buyProducts")?)
            .query(&query)
            .send()
            .await?
            .json()
            .await?;
        response.into_outcome()
    }

    async fn fetch_order(&self, upstream_order_id: &str) -> Result<FetchOutcome, SupplierError> {
        let response: GetProductsResponse = self
            .http
            .get(self.endpoint("api/getProducts")?)
            .query(&[
                ("orderId", upstream_order_id),
                ("userToken", self.user_token.as_str()),
            ])
            .send()
            .await?
            .json()
            .await?;
        response.into_outcome()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buy(raw: &str) -> Result<PlacedOrder, SupplierError> {
        let response: BuyProductsResponse =
            serde_json::from_str(raw).map_err(|e| SupplierError::Malformed(e.to_string()))?;
        response.into_outcome()
    }

    fn fetch(raw: &str) -> Result<FetchOutcome, SupplierError> {
        let response: GetProductsResponse =
            serde_json::from_str(raw).map_err(|e| SupplierError::Malformed(e.to_string()))?;
        response.into_outcome()
    }

    #[test]
    fn accepted_buy_yields_upstream_order_id() {
        let placed = buy(r#"{"success":"true","order_id":"MMO-123"}"#);
        assert!(matches!(placed, Ok(PlacedOrder { upstream_order_id }) if upstream_order_id == "MMO-123"));
    }

    #[test]
    fn rejected_buy_carries_description() {
        let placed = buy(r#"{"success":"false","description":"Kiosk out of stock"}"#);
        assert!(matches!(placed, Err(SupplierError::Rejected(d)) if d == "Kiosk out of stock"));
    }

    #[test]
    fn accepted_buy_without_order_id_is_malformed() {
        let placed = buy(r#"{"success":"true"}"#);
        assert!(matches!(placed, Err(SupplierError::Malformed(_))));
    }

    #[test]
    fn delivered_fetch_yields_raw_lines() {
        let outcome = fetch(
            r#"{"success":"true","data":[{"product":"a|b|c@d.e"},{"product":"x|y"}]}"#,
        );
        assert_eq!(
            outcome.ok(),
            Some(FetchOutcome::Delivered(vec![
                "a|b|c@d.e".to_owned(),
                "x|y".to_owned()
            ]))
        );
    }

    #[test]
    fn processing_marker_matches_case_insensitively() {
        let outcome = fetch(r#"{"success":"false","description":"Order in PROCESSING!"}"#);
        assert_eq!(outcome.ok(), Some(FetchOutcome::Processing));
    }

    #[test]
    fn other_fetch_failures_are_terminal() {
        let outcome = fetch(r#"{"success":"false","description":"Order not found"}"#);
        assert!(matches!(outcome, Err(SupplierError::Rejected(d)) if d == "Order not found"));
    }

    #[test]
    fn delivered_fetch_without_data_is_malformed() {
        assert!(matches!(
            fetch(r#"{"success":"true"}"#),
            Err(SupplierError::Malformed(_))
        ));
        assert!(matches!(
            fetch(r#"{"success":"true","data":[]}"#),
            Err(SupplierError::Malformed(_))
        ));
    }
}
