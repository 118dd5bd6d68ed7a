//! Bulk object deletion
//!
//! Object keys of a storage container are listed page by page until the API
//! answers with an empty page, then removed with a single batch call.

use crate::error::{Error, Result};
use crate::ovh::OvhClient;
use serde_json::{json, Value};

/// Which objects of the container are targeted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkScope {
    /// Keys starting with the given prefix
    Prefix(String),
    All,
}

impl BulkScope {
    /// Exactly one of `--prefix` and `--all` must be given
    pub fn from_flags(prefix: Option<String>, all: bool) -> Result<Self> {
        match (prefix, all) {
            (Some(_), true) => Err(Error::config("--prefix and --all cannot be used together")),
            (Some(prefix), false) => Ok(Self::Prefix(prefix)),
            (None, true) => Ok(Self::All),
            (None, false) => Err(Error::config(
                "either --prefix or --all is required to select the objects to delete",
            )),
        }
    }

    fn prefix(&self) -> Option<&str> {
        match self {
            Self::Prefix(prefix) => Some(prefix),
            Self::All => None,
        }
    }
}

fn page_path(container_path: &str, scope: &BulkScope, marker: Option<&str>) -> String {
    let mut query = Vec::new();
    if let Some(prefix) = scope.prefix() {
        query.push(format!("prefix={}", urlencoding::encode(prefix)));
    }
    if let Some(marker) = marker {
        query.push(format!("keyMarker={}", urlencoding::encode(marker)));
    }

    if query.is_empty() {
        format!("{}/object", container_path)
    } else {
        format!("{}/object?{}", container_path, query.join("&"))
    }
}

/// List every object key of the container matching `scope`
///
/// Pages are requested with the last key of the previous page as marker;
/// an empty page ends the listing.
pub async fn collect_object_keys(
    client: &OvhClient,
    container_path: &str,
    scope: &BulkScope,
) -> Result<Vec<String>> {
    let mut keys: Vec<String> = Vec::new();

    loop {
        let path = page_path(container_path, scope, keys.last().map(String::as_str));
        let page = client.get(&path).await?;

        let page_keys: Vec<String> = page
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.get("key").and_then(|k| k.as_str()))
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        if page_keys.is_empty() {
            break;
        }
        tracing::debug!("Listed {} object keys from {}", page_keys.len(), path);
        keys.extend(page_keys);
    }

    Ok(keys)
}

/// Delete `keys` with one batch request
pub async fn delete_objects(
    client: &OvhClient,
    container_path: &str,
    keys: &[String],
) -> Result<Value> {
    let objects: Vec<Value> = keys.iter().map(|key| json!({ "key": key })).collect();
    let body = json!({ "objects": objects });
    client
        .post(&format!("{}/bulkDeleteObjects", container_path), Some(&body))
        .await
}

/// List then delete the objects selected by `scope`; returns how many
///
/// Nothing is sent when no object matches.
pub async fn bulk_delete(
    client: &OvhClient,
    container_path: &str,
    scope: &BulkScope,
) -> Result<usize> {
    let keys = collect_object_keys(client, container_path, scope).await?;
    if keys.is_empty() {
        tracing::info!("No object to delete in {}", container_path);
        return Ok(0);
    }

    delete_objects(client, container_path, &keys).await?;
    tracing::info!("Deleted {} objects from {}", keys.len(), container_path);
    Ok(keys.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_from_flags() {
        assert_eq!(
            BulkScope::from_flags(Some("logs/".into()), false).unwrap(),
            BulkScope::Prefix("logs/".into())
        );
        assert_eq!(BulkScope::from_flags(None, true).unwrap(), BulkScope::All);
        assert!(BulkScope::from_flags(None, false).is_err());
        assert!(BulkScope::from_flags(Some("x".into()), true).is_err());
    }

    #[test]
    fn test_page_path() {
        let scope = BulkScope::Prefix("logs/".into());
        assert_eq!(
            page_path("/v1/c/storage/bucket", &scope, None),
            "/v1/c/storage/bucket/object?prefix=logs%2F"
        );
        assert_eq!(
            page_path("/v1/c/storage/bucket", &scope, Some("logs/a b")),
            "/v1/c/storage/bucket/object?prefix=logs%2F&keyMarker=logs%2Fa%20b"
        );
        assert_eq!(
            page_path("/v1/c/storage/bucket", &BulkScope::All, None),
            "/v1/c/storage/bucket/object"
        );
    }
}
