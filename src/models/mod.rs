//! Data models for the Emporia gateway.

pub mod auth;
pub mod device;
pub mod stream;
