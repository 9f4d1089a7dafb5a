use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use gianhang_sdk::objects::ApiResponse;
use uuid::Uuid;

use super::{ShopApiError, to_product_view};
use crate::state::AppState;

/// `GET /products` — list the public catalog.
pub(super) async fn list_products(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ShopApiError> {
    let products = state.catalog.list_active().await?;
    let views: Vec<_> = products.iter().map(to_product_view).collect();
    Ok(Json(ApiResponse::ok(views)))
}

/// `GET /products/{product_id}` — one product with its options.
pub(super) async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, ShopApiError> {
    let product = state
        .catalog
        .product(product_id)
        .await?
        .filter(|product| product.is_active)
        .ok_or(ShopApiError::ProductNotFound)?;

    Ok(Json(ApiResponse::ok(to_product_view(&product))))
}
