use axum::{Json, extract::State, response::IntoResponse};
use gianhang_core::workflow::{PurchaseOutcome, PurchaseRequest as WorkflowRequest};
use gianhang_sdk::objects::{ApiResponse, OrderStatus, PurchaseData, PurchaseRequest};

use super::{ShopApiError, to_delivered};
use crate::api::extractors::CurrentUser;
use crate::state::AppState;

/// `POST /orders` — purchase a product.
///
/// Runs the full purchase workflow: validation, wallet debit, upstream
/// placement and the bounded fulfillment poll. Answers either with the
/// delivered credentials or with a `pending` marker the frontend should
/// follow up on via the status endpoint.
pub(super) async fn create_order(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(body): Json<PurchaseRequest>,
) -> Result<impl IntoResponse, ShopApiError> {
    let outcome = state
        .workflow
        .execute(WorkflowRequest {
            user_id,
            product_id: body.product_id,
            quantity: body.quantity,
            selected_option_id: body.selected_option_id,
            promotion_code: body.promotion,
        })
        .await
        .map_err(ShopApiError::Purchase)?;

    let data = match outcome {
        PurchaseOutcome::Delivered {
            order_id,
            credentials,
        } => PurchaseData {
            order_id,
            credentials: Some(credentials.iter().map(to_delivered).collect()),
            status: None,
            attempts: None,
        },
        PurchaseOutcome::Processing { order_id, attempts } => PurchaseData {
            order_id,
            credentials: None,
            status: Some(OrderStatus::Pending),
            attempts: Some(attempts),
        },
    };

    Ok(Json(ApiResponse::ok(data)))
}
