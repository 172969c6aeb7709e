use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::models::{NewProduct, Product, ProductPatch, PRICE_SCALE};
use crate::database::store::ProductStore;

/// Process-local product store for development and tests
#[derive(Default)]
pub struct MemoryProductStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    last_id: i64,
    rows: BTreeMap<i64, Product>,
}

impl MemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn all(&self) -> Result<Vec<Product>, DatabaseError> {
        Ok(self.inner.read().await.rows.values().cloned().collect())
    }

    async fn find(&self, id: i64) -> Result<Option<Product>, DatabaseError> {
        Ok(self.inner.read().await.rows.get(&id).cloned())
    }

    async fn create(&self, product: NewProduct) -> Result<Product, DatabaseError> {
        let mut inner = self.inner.write().await;
        inner.last_id += 1;
        let now = Utc::now();
        let row = Product {
            id: inner.last_id,
            name: product.name,
            description: product.description,
            price: product.price.round_dp(PRICE_SCALE),
            stock: product.stock,
            created_at: now,
            updated_at: now,
        };
        inner.rows.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update(&self, id: i64, patch: ProductPatch) -> Result<Option<Product>, DatabaseError> {
        let mut inner = self.inner.write().await;
        let Some(row) = inner.rows.get_mut(&id) else {
            return Ok(None);
        };
        patch.apply_to(row);
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, DatabaseError> {
        Ok(self.inner.write().await.rows.remove(&id).is_some())
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
