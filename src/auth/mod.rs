//! Authentication: Cognito SRP login, token refresh, credential lifecycle.

mod cognito;
mod manager;
mod srp;

pub use manager::{AuthConfig, EmporiaAuthManager};
