//! Region discovery and fan-out
//!
//! Many resources live in one region of a project. This module finds the
//! regions offering a service, locates a resource by scanning them in
//! order, and lists resources of every region concurrently.
//!
//! - [`descriptor`] - Region descriptors and the capability predicate
//! - [`discovery`] - Region enumeration and locate scans
//! - [`fanout`] - One task per URL, results in submission order

pub mod descriptor;
pub mod discovery;
pub mod fanout;

pub use descriptor::{RegionDescriptor, RegionService};
pub use discovery::{describe_regions, list_region_names, locate, regions_with_capability};
pub use fanout::{fetch_all, fetch_in_regions};
