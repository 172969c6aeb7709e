// handlers/products/create.rs - POST /api/products handler

use axum::{
    extract::{rejection::JsonRejection, Extension, State},
    Json,
};
use serde_json::Value;

use super::request_body;
use crate::app::AppState;
use crate::authz::Capability;
use crate::database::Product;
use crate::middleware::{ApiResponse, ApiResult, Caller};
use crate::validation::validate_create;

/**
 * POST /api/products - Create a product
 *
 * Expected Input:
 * ```json
 * {
 *   "name": "string",         // Required, at most 255 characters
 *   "description": "string",  // Optional, nullable
 *   "price": 9.99,            // Required, >= 0
 *   "stock": 10               // Required integer, >= 0
 * }
 * ```
 *
 * Responds 201 with the stored product.
 */
pub async fn create(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Product> {
    state.authorize(&caller, Capability::CreateProducts).await?;

    let input = request_body(body)?;
    let new_product = validate_create(&input)?;
    let product = state.store.create(new_product).await?;

    tracing::info!(user_id = caller.id, product_id = product.id, "Product created");

    Ok(ApiResponse::created(product, "Product created successfully"))
}
