// handlers/mod.rs - HTTP handlers
//
// Every route under /api/* runs behind `require_caller`, so handlers receive an
// authenticated `Caller` through request extensions.

pub mod products; // /api/products[/:product]
