//! Business operations against the Emporia API endpoints.
//!
//! Each function takes the shared request executor plus the endpoint table,
//! so tests can point the same code at a mock server.

pub mod charger;
pub mod devices;
pub mod preferences;
pub mod rates;
pub mod usage;
