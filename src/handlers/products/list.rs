// handlers/products/list.rs - GET /api/products handler

use axum::extract::{Extension, State};

use crate::app::AppState;
use crate::authz::Capability;
use crate::database::Product;
use crate::middleware::{ApiResponse, ApiResult, Caller};

/// Every stored product. Not scoped to the caller: holders of "view products"
/// see the whole catalogue and everyone else gets a 403.
pub async fn list(State(state): State<AppState>, Extension(caller): Extension<Caller>) -> ApiResult<Vec<Product>> {
    state.authorize(&caller, Capability::ViewProducts).await?;

    let products = state.store.all().await?;

    Ok(ApiResponse::ok(products, "Products retrieved successfully"))
}
