//! ovhcloud - command line client for OVHcloud
//!
//! Library half of the `ovhcloud` binary: a generic resource engine driven
//! by embedded resource definitions and API schemas.
//!
//! # Module Structure
//!
//! - [`schema`] - Example request bodies out of the embedded API schemas
//! - [`params`] - Flags, parameter files and editor sessions merged into payloads
//! - [`region`] - Region discovery, locate scans and concurrent fan-out
//! - [`filter`] - `--filter` / `--format` expression engine
//! - [`bulk`] - Paginated object listing and batch deletion
//! - [`resource`] - Resource registry and per-verb actions
//! - [`commands`] - Command line tree built from the registry
//! - [`output`] - Tables, JSON, YAML and projections
//! - [`ovh`] - HTTP transport

pub mod bulk;
pub mod commands;
pub mod config;
pub mod error;
pub mod filter;
pub mod interaction;
pub mod output;
pub mod ovh;
pub mod params;
pub mod record;
pub mod region;
pub mod resource;
pub mod schema;
pub mod version;

pub use error::{Error, Result};
