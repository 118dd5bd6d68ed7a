//! Region descriptors

use serde::{Deserialize, Serialize};

/// Status advertised by a running service
pub const SERVICE_UP: &str = "UP";

/// Service entry of a region (`octavialoadbalancer`, `storage-s3-standard`...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionService {
    pub name: String,
    #[serde(default)]
    pub status: String,
}

/// A region as returned by `GET .../region/{region}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionDescriptor {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub services: Vec<RegionService>,
}

impl RegionDescriptor {
    /// Whether the region runs `capability` with status `UP`
    pub fn offers(&self, capability: &str) -> bool {
        self.services
            .iter()
            .any(|s| s.name == capability && s.status == SERVICE_UP)
    }
}
