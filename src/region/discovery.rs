//! Region discovery
//!
//! Lists the regions of a service, keeps those offering a capability, and
//! scans them in order to locate a region-scoped resource.

use super::descriptor::RegionDescriptor;
use super::fanout::fetch_all;
use crate::error::{Error, Result};
use crate::ovh::{path_segment, OvhClient};
use serde_json::Value;

/// Region names of a service (`GET {service}/region`), in API order
pub async fn list_region_names(client: &OvhClient, service_path: &str) -> Result<Vec<String>> {
    let endpoint = format!("{}/region", service_path);
    let answer = client.get(&endpoint).await?;

    match answer {
        Value::Array(items) => Ok(items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(name) => Some(name),
                other => other.get("name").and_then(|n| n.as_str()).map(String::from),
            })
            .collect()),
        other => Err(Error::Transport {
            method: "GET".into(),
            endpoint,
            status: None,
            message: format!("expected a list of regions, got {other}"),
        }),
    }
}

/// Fetch the descriptors of `names` concurrently, keeping their order
pub async fn describe_regions(
    client: &OvhClient,
    service_path: &str,
    names: &[String],
) -> Result<Vec<RegionDescriptor>> {
    let paths = names
        .iter()
        .map(|name| format!("{}/region/{}", service_path, path_segment(name)))
        .collect();

    let answers = fetch_all(client, paths, false).await?;

    names
        .iter()
        .zip(answers)
        .map(|(name, answer)| {
            let mut descriptor: RegionDescriptor =
                serde_json::from_value(answer).map_err(|e| Error::Transport {
                    method: "GET".into(),
                    endpoint: format!("{}/region/{}", service_path, name),
                    status: None,
                    message: format!("unexpected region description: {e}"),
                })?;
            if descriptor.name.is_empty() {
                descriptor.name = name.clone();
            }
            Ok(descriptor)
        })
        .collect()
}

/// Regions of a service that run `capability`
pub async fn regions_with_capability(
    client: &OvhClient,
    service_path: &str,
    capability: &str,
) -> Result<Vec<String>> {
    let names = list_region_names(client, service_path).await?;
    let descriptors = describe_regions(client, service_path, &names).await?;

    let eligible: Vec<String> = descriptors
        .into_iter()
        .filter(|d| d.offers(capability))
        .map(|d| d.name)
        .collect();

    tracing::info!(
        "{} of {} regions offer {}: {:?}",
        eligible.len(),
        names.len(),
        capability,
        eligible
    );
    Ok(eligible)
}

/// Find the region holding resource `id`
///
/// `template` contains `{region}` and `{id}`. Regions are tried one after the
/// other and the scan stops at the first successful fetch.
pub async fn locate(
    client: &OvhClient,
    regions: &[String],
    template: &str,
    id: &str,
    kind: &str,
) -> Result<(String, Value)> {
    let id_segment = path_segment(id);

    for region in regions {
        let path = template
            .replace("{region}", &path_segment(region))
            .replace("{id}", &id_segment);

        match client.get(&path).await {
            Ok(record) => {
                tracing::debug!("Found {} {} in region {}", kind, id, region);
                return Ok((region.clone(), record));
            }
            Err(e) => {
                tracing::debug!("{} {} not in region {}: {}", kind, id, region, e);
            }
        }
    }

    Err(Error::NotFound {
        kind: kind.to_string(),
        id: id.to_string(),
    })
}
