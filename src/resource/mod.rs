//! Resource abstraction layer
//!
//! Resources are described in JSON files under `src/resources/` and
//! compiled into the binary. Each definition names its endpoint, the verbs
//! it supports, the flags of its create and edit operations and whether it
//! lives in a region of a project, so adding a resource needs no code.
//!
//! - [`registry`] - Loads and caches resource definitions and API schemas
//! - [`actions`] - Runs a verb of a resource against the API
//!
//! # Example
//!
//! ```ignore
//! use ovhcloud::resource::{actions, get_resource, Context};
//!
//! async fn list_rancher(ctx: &Context<'_>) -> ovhcloud::Result<Vec<serde_json::Value>> {
//!     let rancher = get_resource("cloud", "rancher").unwrap();
//!     actions::list(ctx, rancher).await
//! }
//! ```

pub mod actions;
mod registry;

pub use actions::{fill_message, Context};
pub use registry::*;
