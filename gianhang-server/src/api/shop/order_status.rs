use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use gianhang_sdk::objects::ApiResponse;
use uuid::Uuid;

use super::{ShopApiError, to_order_data};
use crate::api::extractors::CurrentUser;
use crate::state::AppState;

/// `GET /orders/{order_id}` — poll order status.
///
/// Returns the current state of the order, including the delivered
/// credentials once it completed. Orders are only visible to their buyer.
pub(super) async fn get_order_status(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, ShopApiError> {
    let order = state
        .orders
        .order(order_id)
        .await?
        .filter(|order| order.user_id == user_id)
        .ok_or(ShopApiError::OrderNotFound)?;

    Ok(Json(ApiResponse::ok(to_order_data(&order))))
}
