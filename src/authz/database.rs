use async_trait::async_trait;
use sqlx::PgPool;

use super::{Authorizer, Capability};
use crate::database::DatabaseError;
use crate::middleware::Caller;

/// Direct grants, or grants through any role the user holds
const HAS_PERMISSION_SQL: &str = r#"
    SELECT EXISTS (
        SELECT 1
        FROM permissions p
        JOIN user_has_permissions up ON up.permission_id = p.id
        WHERE p.name = $1 AND up.user_id = $2
        UNION ALL
        SELECT 1
        FROM permissions p
        JOIN role_has_permissions rp ON rp.permission_id = p.id
        JOIN user_has_roles ur ON ur.role_id = rp.role_id
        WHERE p.name = $1 AND ur.user_id = $2
    )
"#;

/// Resolves grants from the permission tables on every check
#[derive(Clone)]
pub struct PgAuthorizer {
    pool: PgPool,
}

impl PgAuthorizer {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Authorizer for PgAuthorizer {
    async fn can(&self, caller: &Caller, capability: Capability) -> Result<bool, DatabaseError> {
        let granted: bool = sqlx::query_scalar(HAS_PERMISSION_SQL)
            .bind(capability.as_str())
            .bind(caller.id)
            .fetch_one(&self.pool)
            .await?;

        tracing::debug!(user_id = caller.id, %capability, granted, "Permission lookup");
        Ok(granted)
    }
}
