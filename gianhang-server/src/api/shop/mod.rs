//! Storefront API handlers.
//!
//! These endpoints are called by the shop frontend. The buyer's account id
//! arrives in the `X-User-Id` header (see [`crate::api::extractors`]).
//!
//! # Endpoints
//!
//! - `GET  /products`              – public catalog listing
//! - `GET  /products/{product_id}` – one product with its options
//! - `POST /orders`                – purchase a product, wait for delivery
//! - `GET  /orders/{order_id}`     – poll order status / fetch credentials

use axum::{
    Json, Router,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use gianhang_core::entities::order::{Order, OrderStatus as DbOrderStatus};
use gianhang_core::entities::product::Product;
use gianhang_core::store::StoreError;
use gianhang_core::supplier::credential::Credential;
use gianhang_core::workflow::PurchaseError;
use gianhang_sdk::objects::{
    ApiResponse, DeliveredCredential, OrderStatus, OrderStatusData, ProductOptionView, ProductView,
};

use crate::state::AppState;

mod order_status;
mod products;
mod purchase;

/// Build the storefront API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::list_products))
        .route("/products/{product_id}", get(products::get_product))
        .route("/orders", post(purchase::create_order))
        .route("/orders/{order_id}", get(order_status::get_order_status))
}

/// Convert a `Product` (DB model) into a `ProductView` (API model).
///
/// Kiosk tokens stay server-side.
fn to_product_view(product: &Product) -> ProductView {
    ProductView {
        id: product.id,
        title: product.title.clone(),
        description: product.description.clone(),
        price: product.price,
        currency: product.currency.clone(),
        stock: product.stock,
        sold: product.sold,
        options: product
            .options
            .iter()
            .map(|option| ProductOptionView {
                id: option.id,
                label: option.label.clone(),
                price: option.price,
                stock: option.stock,
            })
            .collect(),
    }
}

/// Convert an `Order` (DB model) into an `OrderStatusData` (API model).
fn to_order_data(order: &Order) -> OrderStatusData {
    OrderStatusData {
        order_id: order.id,
        status: to_api_status(order.status),
        quantity: order.quantity.max(0) as u32,
        unit_price: order.unit_price,
        total_amount: order.total_amount,
        created_at: order.created_at.assume_utc().unix_timestamp(),
        completed_at: order
            .completed_at
            .map(|at| at.assume_utc().unix_timestamp()),
        credentials: order
            .delivery_info
            .as_ref()
            .map(|delivery| delivery.iter().map(to_delivered).collect()),
    }
}

fn to_api_status(status: DbOrderStatus) -> OrderStatus {
    match status {
        DbOrderStatus::Pending => OrderStatus::Pending,
        DbOrderStatus::Completed => OrderStatus::Completed,
        DbOrderStatus::Cancelled => OrderStatus::Cancelled,
    }
}

fn to_delivered(credential: &Credential) -> DeliveredCredential {
    DeliveredCredential {
        user: credential.user.clone(),
        pass: credential.pass.clone(),
        email: credential.email.clone(),
    }
}

// ---------------------------------------------------------------------------
// Error handling
// ---------------------------------------------------------------------------

/// Errors that can occur in storefront API handlers.
#[derive(Debug)]
enum ShopApiError {
    /// The purchase workflow rejected or failed the request.
    Purchase(PurchaseError),
    /// A read outside the workflow failed.
    Store(StoreError),
    ProductNotFound,
    OrderNotFound,
}

impl From<StoreError> for ShopApiError {
    fn from(error: StoreError) -> Self {
        ShopApiError::Store(error)
    }
}

impl IntoResponse for ShopApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ShopApiError::Purchase(error) => {
                let status = match &error {
                    PurchaseError::Supplier(_) => {
                        tracing::warn!(error = %error, "purchase failed at the supplier");
                        StatusCode::BAD_GATEWAY
                    }
                    PurchaseError::Store(inner) => {
                        tracing::error!(error = %inner, "purchase failed on the store");
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                    _ => StatusCode::BAD_REQUEST,
                };
                (status, error.user_message())
            }
            ShopApiError::Store(error) => {
                tracing::error!(error = %error, "storefront store error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Đã xảy ra lỗi hệ thống, vui lòng thử lại sau",
                )
            }
            ShopApiError::ProductNotFound => {
                (StatusCode::NOT_FOUND, "Không tìm thấy sản phẩm")
            }
            ShopApiError::OrderNotFound => (StatusCode::NOT_FOUND, "Không tìm thấy đơn hàng"),
        };
        (status, Json(ApiResponse::<()>::error(message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::build_router;
    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use gianhang_core::entities::now_utc;
    use gianhang_core::entities::product::ProductOption;
    use gianhang_core::entities::user::{User, UserStatus};
    use gianhang_core::store::MemoryStore;
    use gianhang_core::supplier::{
        FetchOutcome, PlacedOrder, SupplierError, SupplierGateway,
    };
    use gianhang_core::workflow::PurchaseWorkflow;
    use gianhang_sdk::objects::{PurchaseData, PurchaseRequest, USER_HEADER};
    use sqlx::types::Json as DbJson;
    use std::sync::Arc;
    use tower::ServiceExt;
    use uuid::Uuid;

    /// Accepts every order and delivers on the first poll.
    struct InstantSupplier;

    #[async_trait]
    impl SupplierGateway for InstantSupplier {
        async fn place_order(
            &self,
            _kiosk_token: &str,
            _quantity: u32,
            _promotion: Option<&str>,
        ) -> Result<PlacedOrder, SupplierError> {
            Ok(PlacedOrder {
                upstream_order_id: "UP-1".to_owned(),
            })
        }

        async fn fetch_order(
            &self,
            _upstream_order_id: &str,
        ) -> Result<FetchOutcome, SupplierError> {
            Ok(FetchOutcome::Delivered(vec![
                "alice|pw123|alice@mail.test".to_owned(),
            ]))
        }
    }

    /// Rejects every order at placement.
    struct RefusingSupplier;

    #[async_trait]
    impl SupplierGateway for RefusingSupplier {
        async fn place_order(
            &self,
            _kiosk_token: &str,
            _quantity: u32,
            _promotion: Option<&str>,
        ) -> Result<PlacedOrder, SupplierError> {
            Err(SupplierError::Rejected("Kiosk out of stock".to_owned()))
        }

        async fn fetch_order(
            &self,
            _upstream_order_id: &str,
        ) -> Result<FetchOutcome, SupplierError> {
            Ok(FetchOutcome::Processing)
        }
    }

    fn sample_product() -> Product {
        Product {
            id: Uuid::new_v4(),
            title: "Premium Pack".to_owned(),
            description: "Tài khoản premium 1 tháng".to_owned(),
            price: Some(50_000),
            currency: "VND".to_owned(),
            stock: Some(10),
            sold: 0,
            kiosk_token: Some("KIOSK-1".to_owned()),
            is_active: true,
            options: DbJson(Vec::<ProductOption>::new()),
            created_at: now_utc(),
            updated_at: now_utc(),
        }
    }

    fn sample_user(balance: i64) -> User {
        User {
            id: Uuid::new_v4(),
            email: "buyer@example.test".to_owned(),
            balance,
            total_orders: 0,
            total_spent: 0,
            status: UserStatus::Active,
            created_at: now_utc(),
        }
    }

    async fn app_with(
        product: &Product,
        user: &User,
        supplier: Arc<dyn SupplierGateway>,
    ) -> axum::Router {
        let store = Arc::new(MemoryStore::new());
        store.insert_product(product.clone()).await;
        store.insert_user(user.clone()).await;
        let workflow = Arc::new(PurchaseWorkflow::new(
            store.clone(),
            store.clone(),
            store.clone(),
            supplier,
        ));
        build_router(AppState {
            workflow,
            catalog: store.clone(),
            orders: store,
        })
    }

    fn purchase_request(product: &Product, user: &User, quantity: u32) -> Request<Body> {
        let body = PurchaseRequest {
            product_id: product.id,
            quantity,
            selected_option_id: None,
            promotion: None,
        };
        Request::builder()
            .method("POST")
            .uri("/api/orders")
            .header("content-type", "application/json")
            .header(USER_HEADER, user.id.to_string())
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap()
    }

    async fn read_body<T: serde::de::DeserializeOwned>(
        response: axum::response::Response,
    ) -> ApiResponse<T> {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn purchase_delivers_credentials() {
        let product = sample_product();
        let user = sample_user(100_000);
        let app = app_with(&product, &user, Arc::new(InstantSupplier)).await;

        let response = app
            .oneshot(purchase_request(&product, &user, 1))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body: ApiResponse<PurchaseData> = read_body(response).await;
        assert!(body.success);
        let data = body.data.unwrap();
        let credentials = data.credentials.unwrap();
        assert_eq!(credentials.len(), 1);
        assert_eq!(credentials[0].user, "alice");
        assert_eq!(credentials[0].email.as_deref(), Some("alice@mail.test"));
    }

    #[tokio::test]
    async fn purchase_without_user_header_is_unauthorized() {
        let product = sample_product();
        let user = sample_user(100_000);
        let app = app_with(&product, &user, Arc::new(InstantSupplier)).await;

        let mut request = purchase_request(&product, &user, 1);
        request.headers_mut().remove(USER_HEADER);
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body: ApiResponse<PurchaseData> = read_body(response).await;
        assert!(!body.success);
    }

    #[tokio::test]
    async fn insufficient_balance_maps_to_bad_request() {
        let product = sample_product();
        let user = sample_user(10_000);
        let app = app_with(&product, &user, Arc::new(InstantSupplier)).await;

        let response = app
            .oneshot(purchase_request(&product, &user, 1))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: ApiResponse<PurchaseData> = read_body(response).await;
        assert_eq!(
            body.error.as_deref(),
            Some("Số dư không đủ, vui lòng nạp thêm tiền")
        );
    }

    #[tokio::test]
    async fn supplier_refusal_maps_to_bad_gateway() {
        let product = sample_product();
        let user = sample_user(100_000);
        let app = app_with(&product, &user, Arc::new(RefusingSupplier)).await;

        let response = app
            .oneshot(purchase_request(&product, &user, 1))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body: ApiResponse<PurchaseData> = read_body(response).await;
        assert!(!body.success);
    }

    #[tokio::test]
    async fn order_status_is_scoped_to_its_buyer() {
        let product = sample_product();
        let user = sample_user(100_000);
        let app = app_with(&product, &user, Arc::new(InstantSupplier)).await;

        let response = app
            .clone()
            .oneshot(purchase_request(&product, &user, 1))
            .await
            .unwrap();
        let body: ApiResponse<PurchaseData> = read_body(response).await;
        let order_id = body.data.unwrap().order_id;

        // The buyer sees the completed order with its credentials.
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/api/orders/{order_id}"))
                    .header(USER_HEADER, user.id.to_string())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: ApiResponse<OrderStatusData> = read_body(response).await;
        let data = body.data.unwrap();
        assert_eq!(data.status, OrderStatus::Completed);
        assert!(data.credentials.is_some());

        // Anyone else gets a not-found.
        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/api/orders/{order_id}"))
                    .header(USER_HEADER, Uuid::new_v4().to_string())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn catalog_never_exposes_kiosk_tokens() {
        let product = sample_product();
        let user = sample_user(100_000);
        let app = app_with(&product, &user, Arc::new(InstantSupplier)).await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/products")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let raw = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(raw.contains("Premium Pack"));
        assert!(!raw.to_lowercase().contains("kiosk"));
    }
}
