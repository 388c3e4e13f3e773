//! # emporia-gateway
//!
//! Rust client library for the Emporia Vue cloud API.
//!
//! Handles the full Cognito session lifecycle (SRP login, token refresh,
//! expiry tracking) and exposes the device, EV charger, rate, and usage
//! endpoints plus the real-time device-status event stream.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use emporia_gateway::{EmporiaClient, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = EmporiaClient::builder()
//!         .username("you@example.com")
//!         .password("password")
//!         .client_id("4qte47jbstod8apnfic0bunmrq")
//!         .user_pool_id("us-east-2_ghlOXVLi1")
//!         .build()?;
//!
//!     // Authentication happens lazily on the first call.
//!     let devices = client.devices().await?;
//!     for device in &devices.devices {
//!         println!("device {}", device.device_gid);
//!     }
//!
//!     // Stream real-time device status until cancelled.
//!     let cancel = tokio_util::sync::CancellationToken::new();
//!     client
//!         .stream_device_status(|event| println!("{:?}", event.data), cancel)
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod stream;
pub mod transport;

// Re-exports for ergonomic usage
pub use client::{EmporiaClient, EmporiaClientBuilder};
pub use config::Endpoints;
pub use error::{Error, Result};
pub use models::auth::Credentials;
pub use models::device::{
    ChartUsage, Device, DeviceList, DeviceStatusDetail, DevicesStatus, EvCharger,
    LocationProperties,
};
pub use models::stream::StreamEvent;
pub use stream::{HttpStreamTransport, StreamClient, StreamTransport};
