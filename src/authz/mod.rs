// authz/mod.rs - Capability checks
//
// Handlers never inspect grants directly; they ask an `Authorizer` whether the
// caller holds a named capability. The implementation is chosen at startup.

use std::fmt;

use async_trait::async_trait;

use crate::database::DatabaseError;
use crate::middleware::Caller;

pub mod database;

pub use database::PgAuthorizer;

/// Named permissions understood by the product endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    ViewProducts,
    CreateProducts,
    EditProducts,
    DeleteProducts,
}

impl Capability {
    pub const ALL: [Capability; 4] = [
        Capability::ViewProducts,
        Capability::CreateProducts,
        Capability::EditProducts,
        Capability::DeleteProducts,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::ViewProducts => "view products",
            Capability::CreateProducts => "create products",
            Capability::EditProducts => "edit products",
            Capability::DeleteProducts => "delete products",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == name)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn can(&self, caller: &Caller, capability: Capability) -> Result<bool, DatabaseError>;
}

/// Trusts the capability names carried in the caller's token
#[derive(Debug, Default, Clone, Copy)]
pub struct GrantedCapabilities;

#[async_trait]
impl Authorizer for GrantedCapabilities {
    async fn can(&self, caller: &Caller, capability: Capability) -> Result<bool, DatabaseError> {
        Ok(caller.capabilities.contains(capability.as_str()))
    }
}
