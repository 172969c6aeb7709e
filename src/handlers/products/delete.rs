// handlers/products/delete.rs - DELETE /api/products/:product handler

use axum::extract::{Extension, State};

use super::{BoundProduct, NOT_FOUND_MESSAGE};
use crate::app::AppState;
use crate::authz::Capability;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, Caller};

/// Hard delete; there is no trash or restore for products
pub async fn destroy(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    BoundProduct(product): BoundProduct,
) -> ApiResult<()> {
    state.authorize(&caller, Capability::DeleteProducts).await?;

    if !state.store.delete(product.id).await? {
        // Removed by a concurrent request after binding
        return Err(ApiError::not_found(NOT_FOUND_MESSAGE));
    }

    tracing::info!(user_id = caller.id, product_id = product.id, "Product deleted");

    Ok(ApiResponse::message("Product deleted successfully"))
}
