//! Resource Registry - Load resource definitions from JSON
//!
//! This module loads all resource definitions from embedded JSON files
//! and provides lookup functions for the rest of the application.

use crate::params::FieldDef;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Embedded resource JSON files (compiled into the binary)
const RESOURCE_FILES: &[&str] = &[
    include_str!("../resources/cloud.json"),
    include_str!("../resources/iam.json"),
];

/// Embedded API schemas, per service domain
const SCHEMAS: &[(&str, &[u8])] = &[
    ("cloud", include_bytes!("../schemas/cloud.json")),
    ("iam", include_bytes!("../schemas/iam.json")),
    ("me", include_bytes!("../schemas/me.json")),
];

/// Operations a resource exposes on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Verb {
    List,
    Get,
    Create,
    Edit,
    Delete,
    BulkDelete,
}

impl Verb {
    pub fn name(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Get => "get",
            Self::Create => "create",
            Self::Edit => "edit",
            Self::Delete => "delete",
            Self::BulkDelete => "bulk-delete",
        }
    }
}

/// Resources living in one region of a project
#[derive(Debug, Clone, Deserialize)]
pub struct RegionScope {
    /// Service a region must run (`octavialoadbalancer`)
    pub capability: String,
    /// Prefix of the `/region` listing (`/1.0/cloud/project/{project}`)
    pub service_path: String,
}

fn default_post() -> String {
    "post".into()
}

fn default_put() -> String {
    "put".into()
}

/// Creation operation
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDef {
    /// Operation path in the API schema
    pub schema_path: String,
    #[serde(default = "default_post")]
    pub method: String,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
    /// Fields (flag or key) a flags-only creation must set
    #[serde(default)]
    pub required: Vec<String>,
    /// Example used when the schema has none
    #[serde(default)]
    pub example: Option<Value>,
    /// Success message; `{path}` placeholders read the response, then the payload
    #[serde(default)]
    pub message: Option<String>,
}

impl CreateDef {
    pub fn fallback_example(&self) -> String {
        match &self.example {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(text)) => text.clone(),
            Some(value) => serde_json::to_string_pretty(value).unwrap_or_default(),
        }
    }
}

/// Update operation
#[derive(Debug, Clone, Deserialize)]
pub struct EditDef {
    pub schema_path: String,
    #[serde(default = "default_put")]
    pub method: String,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

/// Resource definition from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceDef {
    pub display_name: String,
    #[serde(default)]
    pub about: String,
    /// Schema domain (`cloud`, `iam`, `me`)
    pub service: String,
    /// Collection endpoint; `{project}` and `{region}` are filled at runtime
    pub endpoint: String,
    pub id_field: String,
    /// Query string appended when fetching a single resource
    #[serde(default)]
    pub get_query: Option<String>,
    /// Table columns, `path` or `path Header`
    pub columns: Vec<String>,
    #[serde(default)]
    pub region: Option<RegionScope>,
    /// The collection endpoint returns identifiers to fetch one by one
    #[serde(default)]
    pub expand: bool,
    pub verbs: Vec<Verb>,
    #[serde(default)]
    pub create: Option<CreateDef>,
    #[serde(default)]
    pub edit: Option<EditDef>,
}

impl ResourceDef {
    pub fn supports(&self, verb: Verb) -> bool {
        self.verbs.contains(&verb)
    }

    /// Endpoint template of a single resource, with an `{id}` placeholder
    pub fn item_endpoint(&self) -> String {
        format!("{}/{{id}}", self.endpoint)
    }
}

/// Top-level command grouping resources
#[derive(Debug, Clone, Deserialize)]
pub struct GroupDef {
    #[serde(default)]
    pub about: String,
    pub resources: BTreeMap<String, ResourceDef>,
}

/// Root structure of resources/*.json
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceConfig {
    pub group: String,
    #[serde(flatten)]
    pub definition: GroupDef,
}

#[derive(Debug, Default)]
pub struct Registry {
    pub groups: BTreeMap<String, GroupDef>,
}

/// Global registry loaded from JSON
static REGISTRY: OnceLock<Registry> = OnceLock::new();

/// Get the resource registry (loads from embedded JSON on first access)
pub fn get_registry() -> &'static Registry {
    REGISTRY.get_or_init(|| {
        let mut registry = Registry::default();

        for content in RESOURCE_FILES {
            let partial: ResourceConfig = serde_json::from_str(content)
                .unwrap_or_else(|e| panic!("Failed to parse embedded resource JSON: {}", e));
            match registry.groups.get_mut(&partial.group) {
                Some(group) => group.resources.extend(partial.definition.resources),
                None => {
                    registry.groups.insert(partial.group, partial.definition);
                }
            }
        }

        registry
    })
}

/// Get a resource definition by command path (`cloud`, `rancher`)
pub fn get_resource(group: &str, name: &str) -> Option<&'static ResourceDef> {
    get_registry().groups.get(group)?.resources.get(name)
}

/// Embedded API schema of a service domain
pub fn schema_for(service: &str) -> Option<&'static [u8]> {
    SCHEMAS
        .iter()
        .find(|(name, _)| *name == service)
        .map(|(_, content)| *content)
}
