//! Resource actions
//!
//! Executes the verbs of a resource definition against the API: listing
//! (fanned out over regions when the resource is region-scoped), fetching,
//! creating, editing and deleting, plus bulk object deletion.

use super::registry::{schema_for, ResourceDef, Verb};
use crate::bulk::{self, BulkScope};
use crate::error::{Error, Result};
use crate::interaction::Interaction;
use crate::output::Outcome;
use crate::ovh::{path_segment, OvhClient};
use crate::params::{
    edit_input, resolve_create, resolve_edit, write_init_file, OperationRef, ParameterDocument,
    ParameterSources, ParameterSpec,
};
use crate::record::{display_value, lookup};
use crate::region::{fetch_all, fetch_in_regions, locate, regions_with_capability};
use crate::schema::operation_request_examples;
use serde_json::{json, Value};
use std::path::Path;

/// Everything an action needs besides its own arguments
pub struct Context<'a> {
    pub client: &'a OvhClient,
    /// Cloud project from `--cloud-project`, the environment or the config
    pub project: Option<String>,
    /// Skip regions that fail during a fan-out instead of aborting
    pub ignore_errors: bool,
    pub interaction: &'a dyn Interaction,
}

impl Context<'_> {
    /// Substitute `{project}` in an endpoint template
    fn fill(&self, template: &str) -> Result<String> {
        if !template.contains("{project}") {
            return Ok(template.to_string());
        }
        let project = self.project.as_deref().ok_or_else(|| {
            Error::config(
                "no cloud project specified, use --cloud-project or set OVH_CLOUD_PROJECT",
            )
        })?;
        Ok(template.replace("{project}", &path_segment(project)))
    }

    async fn eligible_regions(&self, def: &ResourceDef) -> Result<Option<Vec<String>>> {
        let Some(scope) = &def.region else {
            return Ok(None);
        };
        let service_path = self.fill(&scope.service_path)?;
        let regions = regions_with_capability(self.client, &service_path, &scope.capability).await?;
        Ok(Some(regions))
    }

    /// Path of one resource; region-scoped resources are located first
    async fn item_path(&self, def: &ResourceDef, id: &str) -> Result<(String, Option<Value>)> {
        let template = self.fill(&def.item_endpoint())?;
        match self.eligible_regions(def).await? {
            Some(regions) => {
                let (region, record) =
                    locate(self.client, &regions, &template, id, &def.display_name).await?;
                let path = template
                    .replace("{region}", &path_segment(&region))
                    .replace("{id}", &path_segment(id));
                Ok((path, Some(record)))
            }
            None => Ok((template.replace("{id}", &path_segment(id)), None)),
        }
    }
}

fn unsupported(def: &ResourceDef, verb: Verb) -> Error {
    Error::config(format!(
        "{} does not support {}",
        def.display_name,
        verb.name()
    ))
}

fn require(def: &ResourceDef, verb: Verb) -> Result<()> {
    if def.supports(verb) {
        Ok(())
    } else {
        Err(unsupported(def, verb))
    }
}

fn schema_of(def: &ResourceDef) -> Result<&'static [u8]> {
    schema_for(&def.service)
        .ok_or_else(|| Error::Schema(format!("no API schema for service {}", def.service)))
}

/// List every resource, in region order for region-scoped resources
pub async fn list(ctx: &Context<'_>, def: &ResourceDef) -> Result<Vec<Value>> {
    require(def, Verb::List)?;
    let endpoint = ctx.fill(&def.endpoint)?;

    if let Some(regions) = ctx.eligible_regions(def).await? {
        return fetch_in_regions(ctx.client, &endpoint, &regions, ctx.ignore_errors).await;
    }

    let answer = ctx.client.get(&endpoint).await?;
    let items = match answer {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        other => vec![other],
    };

    if !def.expand {
        return Ok(items);
    }

    // The collection only holds identifiers
    let paths = items
        .iter()
        .map(|item| {
            let id = item
                .get(&def.id_field)
                .map(display_value)
                .unwrap_or_else(|| display_value(item));
            format!("{}/{}", endpoint, path_segment(&id))
        })
        .collect();
    fetch_all(ctx.client, paths, ctx.ignore_errors).await
}

/// Fetch one resource
pub async fn get(ctx: &Context<'_>, def: &ResourceDef, id: &str) -> Result<Value> {
    require(def, Verb::Get)?;
    let (path, located) = ctx.item_path(def, id).await?;

    match (located, &def.get_query) {
        (Some(record), None) => Ok(record),
        (_, Some(query)) => ctx.client.get(&format!("{}?{}", path, query)).await,
        (None, None) => ctx.client.get(&path).await,
    }
}

/// Create a resource from flags, a parameter file or the editor
pub async fn create(
    ctx: &Context<'_>,
    def: &ResourceDef,
    spec: &ParameterSpec,
    sources: &ParameterSources,
) -> Result<Outcome> {
    require(def, Verb::Create)?;
    let create = def.create.as_ref().ok_or_else(|| unsupported(def, Verb::Create))?;
    let endpoint = ctx.fill(&def.endpoint)?;

    let operation = OperationRef {
        schema: schema_of(def)?,
        path: &create.schema_path,
        method: &create.method,
    };
    let payload = resolve_create(
        spec,
        sources,
        operation,
        &create.fallback_example(),
        &create.required,
        ctx.interaction,
    )?;

    let response = ctx.client.send(&create.method, &endpoint, Some(&payload)).await?;
    tracing::info!("{} created through {}", def.display_name, endpoint);

    let message = match &create.message {
        Some(template) => fill_message(template, &[&response, &payload]),
        None => format!("✅ {} created successfully", def.display_name),
    };
    let details = match response.get("id") {
        Some(id) => json!({ "id": id }),
        None => Value::Null,
    };
    Ok(Outcome::message_with_details(message, details))
}

/// Update a resource; only the fields given are sent unless the editor is used
pub async fn edit(
    ctx: &Context<'_>,
    def: &ResourceDef,
    id: &str,
    spec: &ParameterSpec,
    sources: &ParameterSources,
) -> Result<Outcome> {
    require(def, Verb::Edit)?;
    let edit = def.edit.as_ref().ok_or_else(|| unsupported(def, Verb::Edit))?;
    // Reject an empty update before any request
    let document = edit_input(spec, sources)?;

    let (path, located) = ctx.item_path(def, id).await?;
    let current = match (located, &document) {
        (Some(record), _) => record,
        (None, ParameterDocument::Editor) => ctx.client.get(&path).await?,
        (None, _) => Value::Null,
    };

    let operation = OperationRef {
        schema: schema_of(def)?,
        path: &edit.schema_path,
        method: &edit.method,
    };
    let payload = resolve_edit(spec, document, operation, &current, ctx.interaction)?;

    ctx.client.send(&edit.method, &path, Some(&payload)).await?;
    Ok(Outcome::message(format!(
        "✅ {} {} updated successfully",
        def.display_name, id
    )))
}

/// Delete a resource
pub async fn delete(ctx: &Context<'_>, def: &ResourceDef, id: &str) -> Result<Outcome> {
    require(def, Verb::Delete)?;
    let (path, _) = ctx.item_path(def, id).await?;
    ctx.client.delete(&path).await?;
    Ok(Outcome::message(format!(
        "✅ {} {} deleted successfully",
        def.display_name, id
    )))
}

/// Delete the objects of a storage container selected by `scope`
pub async fn bulk_delete(
    ctx: &Context<'_>,
    def: &ResourceDef,
    container: &str,
    scope: &BulkScope,
) -> Result<Outcome> {
    require(def, Verb::BulkDelete)?;
    let (container_path, _) = ctx.item_path(def, container).await?;

    let deleted = bulk::bulk_delete(ctx.client, &container_path, scope).await?;
    if deleted == 0 {
        return Ok(Outcome::message("No object to delete"));
    }
    Ok(Outcome::message("✅ Objects deleted successfully"))
}

/// Write an example parameter file for `verb` instead of calling the API
pub fn init_file(
    ctx: &Context<'_>,
    def: &ResourceDef,
    verb: Verb,
    spec: &ParameterSpec,
    path: &Path,
    replace: bool,
) -> Result<Outcome> {
    let (schema_path, method, fallback) = match verb {
        Verb::Create => {
            let create = def.create.as_ref().ok_or_else(|| unsupported(def, verb))?;
            (&create.schema_path, &create.method, create.fallback_example())
        }
        Verb::Edit => {
            let edit = def.edit.as_ref().ok_or_else(|| unsupported(def, verb))?;
            (&edit.schema_path, &edit.method, String::new())
        }
        other => return Err(unsupported(def, other)),
    };

    let candidates = operation_request_examples(
        schema_of(def)?,
        schema_path,
        method,
        &fallback,
        &spec.values(),
    )?;
    if candidates.is_empty() {
        return Err(Error::config(format!(
            "no parameter example available to {} a {}",
            verb.name(),
            def.display_name
        )));
    }

    write_init_file(path, replace, &candidates, ctx.interaction)?;
    Ok(Outcome::InitFileWritten(path.to_path_buf()))
}

/// Replace `{path}` placeholders with the first source holding that path
pub fn fill_message(template: &str, sources: &[&Value]) -> String {
    let mut message = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        let Some(len) = rest[start + 1..].find('}') else {
            break;
        };
        let path = &rest[start + 1..start + 1 + len];
        message.push_str(&rest[..start]);
        let value = sources
            .iter()
            .find_map(|source| lookup(source, path).filter(|v| !v.is_null()));
        if let Some(value) = value {
            message.push_str(&display_value(value));
        }
        rest = &rest[start + len + 2..];
    }

    message.push_str(rest);
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_message_prefers_response() {
        let response = json!({"id": "rancher-12345"});
        let payload = json!({"id": "ignored", "targetSpec": {"name": "test-rancher"}});
        assert_eq!(
            fill_message(
                "✅ Rancher {targetSpec.name} created successfully (id: {id})",
                &[&response, &payload]
            ),
            "✅ Rancher test-rancher created successfully (id: rancher-12345)"
        );
    }

    #[test]
    fn test_fill_message_missing_path_is_empty() {
        assert_eq!(fill_message("id: {id}", &[&json!({})]), "id: ");
        assert_eq!(fill_message("no placeholder", &[]), "no placeholder");
    }
}
