//! Custom Axum extractors.
//!
//! Provides `CurrentUser`: the buyer's account id taken from the
//! `X-User-Id` header. The header is filled in by the session layer that
//! fronts this service; the storefront itself does not authenticate.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use gianhang_sdk::objects::{ApiResponse, USER_HEADER};
use uuid::Uuid;

/// The buyer making the request.
pub struct CurrentUser(pub Uuid);

/// Errors that can occur while resolving the current user.
#[derive(Debug, thiserror::Error)]
pub enum CurrentUserError {
    #[error("missing X-User-Id header")]
    Missing,
    #[error("invalid X-User-Id header")]
    Invalid,
}

impl IntoResponse for CurrentUserError {
    fn into_response(self) -> Response {
        let message = match self {
            CurrentUserError::Missing => "Vui lòng đăng nhập để tiếp tục",
            CurrentUserError::Invalid => "Phiên đăng nhập không hợp lệ",
        };
        (
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::<()>::error(message)),
        )
            .into_response()
    }
}

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = CurrentUserError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(USER_HEADER)
            .ok_or(CurrentUserError::Missing)?
            .to_str()
            .map_err(|_| CurrentUserError::Invalid)?;
        let user_id: Uuid = value.parse().map_err(|_| CurrentUserError::Invalid)?;
        Ok(CurrentUser(user_id))
    }
}
