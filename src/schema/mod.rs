//! API schema access
//!
//! Each service domain ships an OpenAPI description embedded in the binary.
//! This module gives read-only access to the parts the engine needs:
//! request examples, declared parameters and field constraints of an
//! operation, looked up by (path, HTTP method).
//!
//! - [`examples`] - Candidate example bodies for create/edit operations

mod examples;

pub use examples::{operation_request_examples, request_examples, NamedExample};

use crate::error::{Error, Result};
use serde_json::Value;

/// Maximum number of `$ref` hops followed before giving up (cyclic schemas)
const MAX_REF_DEPTH: usize = 16;

/// Parsed API description
#[derive(Debug, Clone)]
pub struct SchemaDocument {
    root: Value,
}

/// Parameter declared by an operation (`in: path | query | header`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterInfo {
    pub name: String,
    pub location: String,
    pub required: bool,
}

/// One (path, method) entry of a schema document
#[derive(Debug, Clone, Copy)]
pub struct Operation<'a> {
    document: &'a SchemaDocument,
    node: &'a Value,
}

impl SchemaDocument {
    /// Parse an embedded schema
    pub fn parse(content: &[u8]) -> Result<Self> {
        let root: Value = serde_json::from_slice(content)
            .map_err(|e| Error::Schema(format!("failed to parse schema: {e}")))?;
        if !root.is_object() {
            return Err(Error::Schema("schema root is not an object".into()));
        }
        Ok(Self { root })
    }

    /// Find an operation; the method is matched case-insensitively
    pub fn operation(&self, path: &str, method: &str) -> Option<Operation<'_>> {
        let node = self
            .root
            .get("paths")?
            .get(path)?
            .get(method.to_ascii_lowercase())?;
        node.is_object().then_some(Operation {
            document: self,
            node,
        })
    }

    /// Follow `#/...` JSON pointers until a concrete node is reached
    fn resolve<'a>(&'a self, mut node: &'a Value) -> &'a Value {
        for _ in 0..MAX_REF_DEPTH {
            let Some(reference) = node.get("$ref").and_then(|r| r.as_str()) else {
                return node;
            };
            let Some(pointer) = reference.strip_prefix('#') else {
                return node;
            };
            match self.root.pointer(pointer) {
                Some(target) => node = target,
                None => return node,
            }
        }
        node
    }
}

impl<'a> Operation<'a> {
    fn json_media(&self) -> Option<&'a Value> {
        let body = self.document.resolve(self.node.get("requestBody")?);
        body.get("content")?.get("application/json")
    }

    /// Declared parameters (path, query...)
    pub fn parameters(&self) -> Vec<ParameterInfo> {
        let Some(params) = self.node.get("parameters").and_then(|p| p.as_array()) else {
            return Vec::new();
        };

        params
            .iter()
            .map(|p| self.document.resolve(p))
            .filter_map(|p| {
                Some(ParameterInfo {
                    name: p.get("name")?.as_str()?.to_string(),
                    location: p
                        .get("in")
                        .and_then(|v| v.as_str())
                        .unwrap_or("query")
                        .to_string(),
                    required: p.get("required").and_then(|v| v.as_bool()).unwrap_or(false),
                })
            })
            .collect()
    }

    /// Resolved request body schema
    pub fn body_schema(&self) -> Option<&'a Value> {
        let schema = self.json_media()?.get("schema")?;
        Some(self.document.resolve(schema))
    }

    /// Top-level properties accepted in the request body
    pub fn body_properties(&self) -> Vec<String> {
        self.body_schema()
            .and_then(|s| s.get("properties"))
            .and_then(|p| p.as_object())
            .map(|props| props.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Schema of a (dotted) body field
    pub fn field_schema(&self, path: &str) -> Option<&'a Value> {
        let mut current = self.body_schema()?;
        for part in path.split('.') {
            let property = current.get("properties")?.get(part)?;
            current = self.document.resolve(property);
        }
        Some(current)
    }

    /// Allowed values of an enum-constrained body field
    pub fn enum_values(&self, path: &str) -> Option<&'a Vec<Value>> {
        self.field_schema(path)?.get("enum")?.as_array()
    }

    /// Check every enum-constrained field present in `payload`
    pub fn validate_enums(&self, payload: &Value) -> Result<()> {
        let Some(schema) = self.body_schema() else {
            return Ok(());
        };
        self.validate_node(schema, payload, "")
    }

    fn validate_node(&self, schema: &Value, value: &Value, path: &str) -> Result<()> {
        let schema = self.document.resolve(schema);

        if let Some(allowed) = schema.get("enum").and_then(|e| e.as_array()) {
            if !value.is_null() && !allowed.contains(value) {
                let allowed = allowed
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                return Err(Error::InvalidParameters(format!(
                    "invalid value {value} for field {path:?}, allowed values: {allowed}"
                )));
            }
        }

        match value {
            Value::Object(map) => {
                let Some(properties) = schema.get("properties") else {
                    return Ok(());
                };
                for (key, child) in map {
                    if let Some(child_schema) = properties.get(key) {
                        let child_path = if path.is_empty() {
                            key.clone()
                        } else {
                            format!("{path}.{key}")
                        };
                        self.validate_node(child_schema, child, &child_path)?;
                    }
                }
            }
            Value::Array(items) => {
                if let Some(item_schema) = schema.get("items") {
                    for item in items {
                        self.validate_node(item_schema, item, path)?;
                    }
                }
            }
            _ => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_schema() -> Vec<u8> {
        serde_json::to_vec(&json!({
            "openapi": "3.0.0",
            "paths": {
                "/publicCloud/project/{projectId}/rancher": {
                    "post": {
                        "parameters": [
                            {"name": "projectId", "in": "path", "required": true}
                        ],
                        "requestBody": {
                            "content": {
                                "application/json": {
                                    "schema": {"$ref": "#/components/schemas/RancherCreation"}
                                }
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "RancherCreation": {
                        "type": "object",
                        "properties": {
                            "targetSpec": {"$ref": "#/components/schemas/TargetSpec"}
                        }
                    },
                    "TargetSpec": {
                        "type": "object",
                        "properties": {
                            "name": {"type": "string"},
                            "plan": {"type": "string", "enum": ["OVHCLOUD_EDITION", "STANDARD"]}
                        }
                    }
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            SchemaDocument::parse(b"not json"),
            Err(Error::Schema(_))
        ));
        assert!(SchemaDocument::parse(b"[1, 2]").is_err());
    }

    #[test]
    fn test_operation_lookup_is_method_insensitive() {
        let doc = SchemaDocument::parse(&sample_schema()).unwrap();
        assert!(doc
            .operation("/publicCloud/project/{projectId}/rancher", "POST")
            .is_some());
        assert!(doc
            .operation("/publicCloud/project/{projectId}/rancher", "put")
            .is_none());
        assert!(doc.operation("/unknown", "post").is_none());
    }

    #[test]
    fn test_parameters_and_properties() {
        let doc = SchemaDocument::parse(&sample_schema()).unwrap();
        let op = doc
            .operation("/publicCloud/project/{projectId}/rancher", "post")
            .unwrap();
        assert_eq!(
            op.parameters(),
            vec![ParameterInfo {
                name: "projectId".into(),
                location: "path".into(),
                required: true
            }]
        );
        assert_eq!(op.body_properties(), vec!["targetSpec".to_string()]);
        assert_eq!(
            op.enum_values("targetSpec.plan"),
            Some(&vec![json!("OVHCLOUD_EDITION"), json!("STANDARD")])
        );
    }

    #[test]
    fn test_validate_enums() {
        let doc = SchemaDocument::parse(&sample_schema()).unwrap();
        let op = doc
            .operation("/publicCloud/project/{projectId}/rancher", "post")
            .unwrap();

        assert!(op
            .validate_enums(&json!({"targetSpec": {"name": "r", "plan": "STANDARD"}}))
            .is_ok());

        let err = op
            .validate_enums(&json!({"targetSpec": {"plan": "GOLD"}}))
            .unwrap_err();
        assert!(err.to_string().contains("targetSpec.plan"));
    }
}
