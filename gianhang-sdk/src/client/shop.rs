use super::ClientError;
use crate::objects::{
    ApiResponse, OrderStatusData, ProductView, PurchaseData, PurchaseRequest, USER_HEADER,
};
use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;
use uuid::Uuid;

/// Typed client for the Gian Hàng storefront API.
#[derive(Debug, Clone)]
pub struct ShopClient {
    http: Client,
    base_url: Url,
    user_id: Option<Uuid>,
}

impl ShopClient {
    /// Create a new `ShopClient`.
    ///
    /// * `base_url` – root URL of the storefront server.
    pub fn new(base_url: Url) -> Self {
        Self {
            http: Client::new(),
            base_url,
            user_id: None,
        }
    }

    /// Act as the given buyer for endpoints that need an account.
    pub fn with_user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Replace the default `reqwest::Client` (e.g. to configure timeouts or
    /// a proxy).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// `GET /api/products` – list the public catalog.
    pub async fn list_products(&self) -> Result<Vec<ProductView>, ClientError> {
        let url = self.base_url.join("/api/products")?;
        parse_response(self.http.get(url).send().await?).await
    }

    /// `GET /api/products/{product_id}` – one product with its options.
    pub async fn product(&self, product_id: Uuid) -> Result<ProductView, ClientError> {
        let url = self.base_url.join(&format!("/api/products/{product_id}"))?;
        parse_response(self.http.get(url).send().await?).await
    }

    /// `POST /api/orders` – purchase a product and wait for delivery.
    pub async fn purchase(&self, request: &PurchaseRequest) -> Result<PurchaseData, ClientError> {
        let url = self.base_url.join("/api/orders")?;
        let mut builder = self.http.post(url).json(request);
        if let Some(user_id) = self.user_id {
            builder = builder.header(USER_HEADER, user_id.to_string());
        }
        parse_response(builder.send().await?).await
    }

    /// `GET /api/orders/{order_id}` – poll an order for completion.
    pub async fn order_status(&self, order_id: Uuid) -> Result<OrderStatusData, ClientError> {
        let url = self.base_url.join(&format!("/api/orders/{order_id}"))?;
        let mut builder = self.http.get(url);
        if let Some(user_id) = self.user_id {
            builder = builder.header(USER_HEADER, user_id.to_string());
        }
        parse_response(builder.send().await?).await
    }
}

/// Unwrap the storefront envelope, turning failure bodies into
/// [`ClientError::Api`].
async fn parse_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ClientError> {
    let status = response.status();
    let body: ApiResponse<T> = response.json().await?;
    if body.success {
        body.data.ok_or(ClientError::MissingData)
    } else {
        Err(ClientError::Api {
            status: status.as_u16(),
            message: body.error.unwrap_or_default(),
        })
    }
}
