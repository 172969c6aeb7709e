use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{NewProduct, Product, ProductPatch, PRICE_SCALE};
use crate::database::store::ProductStore;

const PRODUCT_COLUMNS: &str = "id, name, description, price, stock, created_at, updated_at";

/// Product store backed by the `products` table
#[derive(Clone)]
pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn all(&self) -> Result<Vec<Product>, DatabaseError> {
        let sql = format!("SELECT {} FROM products ORDER BY id", PRODUCT_COLUMNS);
        let rows = sqlx::query_as::<_, Product>(&sql).fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn find(&self, id: i64) -> Result<Option<Product>, DatabaseError> {
        let sql = format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS);
        let row = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn create(&self, product: NewProduct) -> Result<Product, DatabaseError> {
        let sql = format!(
            "INSERT INTO products (name, description, price, stock) VALUES ($1, $2, $3, $4) RETURNING {}",
            PRODUCT_COLUMNS
        );
        let row = sqlx::query_as::<_, Product>(&sql)
            .bind(&product.name)
            .bind(&product.description)
            .bind(product.price.round_dp(PRICE_SCALE))
            .bind(product.stock)
            .fetch_one(&self.pool)
            .await?;
        debug!(id = row.id, "Inserted product");
        Ok(row)
    }

    async fn update(&self, id: i64, patch: ProductPatch) -> Result<Option<Product>, DatabaseError> {
        // NULL parameters keep the current value; description needs an explicit flag
        // because NULL is also a legal new value for it.
        let sql = format!(
            r#"
            UPDATE products SET
                name = COALESCE($2, name),
                description = CASE WHEN $3 THEN $4 ELSE description END,
                price = COALESCE($5, price),
                stock = COALESCE($6, stock),
                updated_at = now()
            WHERE id = $1
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        );
        let (set_description, description) = match patch.description {
            Some(value) => (true, value),
            None => (false, None),
        };
        let row = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .bind(patch.name)
            .bind(set_description)
            .bind(description)
            .bind(patch.price.map(|p| p.round_dp(PRICE_SCALE)))
            .bind(patch.stock)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn delete(&self, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}
