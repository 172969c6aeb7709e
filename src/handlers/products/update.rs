// handlers/products/update.rs - PUT|PATCH /api/products/:product handler

use axum::{
    extract::{rejection::JsonRejection, Extension, State},
    Json,
};
use serde_json::Value;

use super::{request_body, BoundProduct, NOT_FOUND_MESSAGE};
use crate::app::AppState;
use crate::authz::Capability;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, Caller};
use crate::validation::validate_update;

/// Partial update: only the keys present in the body are validated and written.
/// PUT and PATCH behave the same. The response carries no `data`.
pub async fn update(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    BoundProduct(product): BoundProduct,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<()> {
    state.authorize(&caller, Capability::EditProducts).await?;

    let input = request_body(body)?;
    let patch = validate_update(&input)?;

    if !patch.is_empty() {
        state
            .store
            .update(product.id, patch)
            .await?
            .ok_or_else(|| ApiError::not_found(NOT_FOUND_MESSAGE))?;

        tracing::info!(user_id = caller.id, product_id = product.id, "Product updated");
    }

    Ok(ApiResponse::message("Product updated successfully"))
}
