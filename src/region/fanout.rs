//! Concurrent fetches
//!
//! One Tokio task per URL. Results are collected by awaiting the handles in
//! submission order, so the output order never depends on which request
//! finished first.

use crate::error::{Error, Result};
use crate::ovh::{path_segment, OvhClient};
use serde_json::Value;
use tokio::task::JoinHandle;

/// GET every path concurrently, answers in the order of `paths`
///
/// With `ignore_errors` a failed path is logged and skipped, otherwise the
/// first failure (in path order) aborts the remaining requests and is
/// returned.
pub async fn fetch_all(
    client: &OvhClient,
    paths: Vec<String>,
    ignore_errors: bool,
) -> Result<Vec<Value>> {
    let handles: Vec<(String, JoinHandle<Result<Value>>)> = paths
        .into_iter()
        .map(|path| {
            let client = client.clone();
            let task_path = path.clone();
            let handle = tokio::spawn(async move { client.get(&task_path).await });
            (path, handle)
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    let mut pending = handles.into_iter();

    while let Some((path, handle)) = pending.next() {
        let outcome = match handle.await {
            Ok(result) => result,
            Err(e) => Err(Error::Task(e.to_string())),
        };

        match outcome {
            Ok(value) => results.push(value),
            Err(e) if ignore_errors => {
                tracing::warn!("Skipping {}: {}", path, e);
            }
            Err(e) => {
                for (_, remaining) in pending {
                    remaining.abort();
                }
                return Err(e);
            }
        }
    }

    Ok(results)
}

/// Fetch `template` (containing `{region}`) in every region and flatten
///
/// Each region answers with a list; lists are concatenated in region order.
pub async fn fetch_in_regions(
    client: &OvhClient,
    template: &str,
    regions: &[String],
    ignore_errors: bool,
) -> Result<Vec<Value>> {
    let paths = regions
        .iter()
        .map(|region| template.replace("{region}", &path_segment(region)))
        .collect();

    let answers = fetch_all(client, paths, ignore_errors).await?;

    let mut records = Vec::new();
    for answer in answers {
        match answer {
            Value::Array(items) => records.extend(items),
            Value::Null => {}
            other => records.push(other),
        }
    }

    tracing::debug!(
        "Fetched {} records from {} regions",
        records.len(),
        regions.len()
    );
    Ok(records)
}
