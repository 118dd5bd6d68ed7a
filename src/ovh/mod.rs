//! OVHcloud API interaction module
//!
//! Transport used by every command: a `reqwest` wrapper that decodes JSON
//! answers and turns failures into [`crate::Error::Transport`].
//!
//! # Module Structure
//!
//! - [`auth`] - Optional bearer access token
//! - [`client`] - Main client joining the configured endpoint and API paths
//! - [`http`] - HTTP utilities for REST API calls
//!
//! # Example
//!
//! ```ignore
//! use ovhcloud::ovh::client::OvhClient;
//!
//! async fn example(config: &ovhcloud::config::Config) -> ovhcloud::Result<()> {
//!     let client = OvhClient::new(config)?;
//!     let regions = client.get("/1.0/cloud/project/my-project/region").await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod http;

pub use client::{format_api_error, path_segment, OvhClient};
