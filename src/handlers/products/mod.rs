// handlers/products/mod.rs - Product resource handlers
//
// Each handler checks its capability, then validates, then touches the store.
// Item routes resolve `:product` through `BoundProduct` before the handler body
// runs, so an unknown id is a 404 regardless of the caller's grants.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequestParts, Path},
    http::request::Parts,
    Json,
};
use serde_json::Value;

use crate::app::AppState;
use crate::database::Product;
use crate::error::ApiError;

pub mod create;  // POST /api/products
pub mod delete;  // DELETE /api/products/:product
pub mod list;    // GET /api/products
pub mod show;    // GET /api/products/:product
pub mod update;  // PUT|PATCH /api/products/:product

pub use create::create;
pub use delete::destroy;
pub use list::list;
pub use show::show;
pub use update::update;

pub const NOT_FOUND_MESSAGE: &str = "Product not found";

/// The product named by the `:product` path segment
#[derive(Debug, Clone)]
pub struct BoundProduct(pub Product);

#[async_trait]
impl FromRequestParts<AppState> for BoundProduct {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::not_found(NOT_FOUND_MESSAGE))?;

        let id: i64 = raw
            .parse()
            .map_err(|_| ApiError::not_found(NOT_FOUND_MESSAGE))?;

        state
            .store
            .find(id)
            .await?
            .map(BoundProduct)
            .ok_or_else(|| ApiError::not_found(NOT_FOUND_MESSAGE))
    }
}

/// Turn the JSON extractor result into the value the validator sees.
///
/// A request without a JSON content type is treated as an empty payload so it
/// fails field validation; unparsable JSON is a 400.
pub(crate) fn request_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, ApiError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(Value::Null),
        Err(rejection) => {
            tracing::debug!("Rejected request body: {}", rejection);
            Err(ApiError::bad_request(format!("Malformed JSON body: {}", rejection.body_text())))
        }
    }
}
