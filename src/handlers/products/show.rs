// handlers/products/show.rs - GET /api/products/:product handler

use axum::extract::{Extension, State};

use super::BoundProduct;
use crate::app::AppState;
use crate::authz::Capability;
use crate::database::Product;
use crate::middleware::{ApiResponse, ApiResult, Caller};

pub async fn show(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    BoundProduct(product): BoundProduct,
) -> ApiResult<Product> {
    state.authorize(&caller, Capability::ViewProducts).await?;

    Ok(ApiResponse::ok(product, "Product retrieved successfully"))
}
