use async_trait::async_trait;

use crate::database::manager::DatabaseError;
use crate::database::models::{NewProduct, Product, ProductPatch};

/// Persistence seam for products. Handlers only ever talk to this trait.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Every product, ordered by id
    async fn all(&self) -> Result<Vec<Product>, DatabaseError>;

    async fn find(&self, id: i64) -> Result<Option<Product>, DatabaseError>;

    /// Insert and return the stored row with its assigned id and timestamps
    async fn create(&self, product: NewProduct) -> Result<Product, DatabaseError>;

    /// Apply `patch` to an existing row. `None` when the id is unknown.
    async fn update(&self, id: i64, patch: ProductPatch) -> Result<Option<Product>, DatabaseError>;

    /// Returns whether a row was removed
    async fn delete(&self, id: i64) -> Result<bool, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;
}
