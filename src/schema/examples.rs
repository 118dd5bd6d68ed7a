//! Request examples
//!
//! Collects the named example bodies an operation declares, falls back to a
//! literal example shipped with the resource definition, and applies value
//! substitutions before handing the candidates to the user.

use super::{Operation, SchemaDocument};
use crate::error::{Error, Result};
use crate::record;
use serde_json::{Map, Value};

/// Objects nested deeper than this are generated empty
const MAX_GENERATED_DEPTH: usize = 8;

/// A candidate request body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedExample {
    pub name: String,
    pub content: String,
}

impl NamedExample {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// Examples declared on the JSON request body of an operation, in schema order
pub fn request_examples(operation: &Operation<'_>) -> Vec<(String, Value)> {
    let Some(media) = operation.json_media() else {
        return Vec::new();
    };

    let mut found = Vec::new();

    if let Some(examples) = media.get("examples").and_then(|e| e.as_object()) {
        for (name, entry) in examples {
            let entry = operation.document.resolve(entry);
            // An example object wraps its payload in "value"
            if let Some(value) = entry.get("value") {
                found.push((name.clone(), value.clone()));
            }
        }
    }

    if let Some(value) = media.get("example") {
        found.push(("example".to_string(), value.clone()));
    }

    found
}

/// Candidate example bodies for `method path`, with `replacements` applied
///
/// Falls back to `fallback` (named `default`) when the schema has no example
/// for the operation, and to a body generated from the request schema when
/// the fallback is empty as well.
pub fn operation_request_examples(
    schema: &[u8],
    path: &str,
    method: &str,
    fallback: &str,
    replacements: &Map<String, Value>,
) -> Result<Vec<NamedExample>> {
    let document = SchemaDocument::parse(schema)?;
    let operation = document.operation(path, method);
    if operation.is_none() {
        tracing::debug!("No operation {} {} in schema, using fallback", method, path);
    }

    let declared = operation
        .as_ref()
        .map(request_examples)
        .unwrap_or_default();

    if !declared.is_empty() {
        return declared
            .into_iter()
            .map(|(name, value)| {
                substitute(value, replacements).map(|content| NamedExample::new(name, content))
            })
            .collect();
    }

    let fallback = fallback.trim();
    if fallback.is_empty() {
        return match operation.as_ref().and_then(|op| op.body_schema()) {
            Some(body) => {
                let generated = generate_value(&document, body, 0);
                Ok(vec![NamedExample::new(
                    "generated",
                    substitute(generated, replacements)?,
                )])
            }
            None => Ok(Vec::new()),
        };
    }

    match serde_json::from_str::<Value>(fallback) {
        Ok(value) => Ok(vec![NamedExample::new(
            "default",
            substitute(value, replacements)?,
        )]),
        Err(_) if replacements.is_empty() => Ok(vec![NamedExample::new("default", fallback)]),
        Err(e) => Err(Error::Schema(format!(
            "fallback example is not valid JSON, cannot substitute values: {e}"
        ))),
    }
}

/// Write every replacement into `value` and serialize it for editing
fn substitute(mut value: Value, replacements: &Map<String, Value>) -> Result<String> {
    if !replacements.is_empty() {
        let Some(object) = value.as_object_mut() else {
            return Err(Error::Schema(
                "cannot substitute values in a non-object example".into(),
            ));
        };
        for (key, replacement) in replacements {
            record::insert_path(object, key, replacement.clone());
        }
    }

    serde_json::to_string_pretty(&value)
        .map_err(|e| Error::Schema(format!("failed to serialize example: {e}")))
}

/// Build a placeholder value out of a schema node
fn generate_value(document: &SchemaDocument, schema: &Value, depth: usize) -> Value {
    let schema = document.resolve(schema);

    if let Some(example) = schema.get("example") {
        return example.clone();
    }
    if let Some(first) = schema
        .get("enum")
        .and_then(|e| e.as_array())
        .and_then(|e| e.first())
    {
        return first.clone();
    }

    let kind = schema.get("type").and_then(|t| t.as_str()).unwrap_or(
        if schema.get("properties").is_some() {
            "object"
        } else {
            "string"
        },
    );

    match kind {
        "object" => {
            let mut object = Map::new();
            if depth < MAX_GENERATED_DEPTH {
                if let Some(props) = schema.get("properties").and_then(|p| p.as_object()) {
                    for (name, prop) in props {
                        object.insert(name.clone(), generate_value(document, prop, depth + 1));
                    }
                }
            }
            Value::Object(object)
        }
        "array" => Value::Array(Vec::new()),
        "integer" | "number" => Value::from(0),
        "boolean" => Value::Bool(false),
        _ => Value::String(String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const PATH: &str = "/publicCloud/project/{projectId}/rancher";

    fn schema_with(media: Value) -> Vec<u8> {
        serde_json::to_vec(&json!({
            "paths": {
                "/publicCloud/project/{projectId}/rancher": {
                    "post": {
                        "requestBody": {"content": {"application/json": media}}
                    }
                }
            },
            "components": {
                "schemas": {
                    "Creation": {
                        "type": "object",
                        "properties": {
                            "targetSpec": {
                                "type": "object",
                                "properties": {
                                    "name": {"type": "string", "example": "my-rancher"},
                                    "plan": {"type": "string", "enum": ["OVHCLOUD_EDITION", "STANDARD"]},
                                    "iamAuthEnabled": {"type": "boolean"},
                                    "nodes": {"type": "integer"}
                                }
                            }
                        }
                    }
                },
                "examples": {
                    "Standard": {"value": {"targetSpec": {"name": "std", "plan": "STANDARD"}}}
                }
            }
        }))
        .unwrap()
    }

    fn no_replacements() -> Map<String, Value> {
        Map::new()
    }

    #[test]
    fn test_declared_examples_keep_schema_order() {
        let schema = schema_with(json!({
            "schema": {"$ref": "#/components/schemas/Creation"},
            "examples": {
                "Minimal": {"value": {"targetSpec": {"name": "min"}}},
                "Standard": {"$ref": "#/components/examples/Standard"}
            }
        }));

        let examples =
            operation_request_examples(&schema, PATH, "POST", "{}", &no_replacements()).unwrap();
        let names: Vec<_> = examples.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Minimal", "Standard"]);

        let standard: Value = serde_json::from_str(&examples[1].content).unwrap();
        assert_eq!(standard["targetSpec"]["plan"], "STANDARD");
    }

    #[test]
    fn test_single_example_is_named_example() {
        let schema = schema_with(json!({"example": {"targetSpec": {"name": "one"}}}));
        let examples =
            operation_request_examples(&schema, PATH, "post", "", &no_replacements()).unwrap();
        assert_eq!(examples.len(), 1);
        assert_eq!(examples[0].name, "example");
    }

    #[test]
    fn test_missing_operation_uses_fallback() {
        let schema = schema_with(json!({}));
        let examples = operation_request_examples(
            &schema,
            "/does/not/exist",
            "post",
            r#"{"targetSpec": {"name": "fallback"}}"#,
            &no_replacements(),
        )
        .unwrap();
        assert_eq!(examples.len(), 1);
        assert_eq!(examples[0].name, "default");
        assert!(examples[0].content.contains("fallback"));
    }

    #[test]
    fn test_replacements_rewrite_and_insert() {
        let schema = schema_with(json!({
            "examples": {
                "A": {"value": {"targetSpec": {"name": "a", "plan": "STANDARD"}}},
                "B": {"value": {"targetSpec": {"name": "b"}}}
            }
        }));
        let mut replacements = Map::new();
        replacements.insert("targetSpec.name".into(), json!("forced"));
        replacements.insert("targetSpec.version".into(), json!("v2.8"));

        let examples =
            operation_request_examples(&schema, PATH, "post", "", &replacements).unwrap();
        for example in &examples {
            let value: Value = serde_json::from_str(&example.content).unwrap();
            assert_eq!(value["targetSpec"]["name"], "forced");
            assert_eq!(value["targetSpec"]["version"], "v2.8");
        }
        let a: Value = serde_json::from_str(&examples[0].content).unwrap();
        assert_eq!(a["targetSpec"]["plan"], "STANDARD");
    }

    #[test]
    fn test_generated_from_schema_when_nothing_else() {
        let schema = schema_with(json!({"schema": {"$ref": "#/components/schemas/Creation"}}));
        let examples =
            operation_request_examples(&schema, PATH, "post", "  ", &no_replacements()).unwrap();
        assert_eq!(examples[0].name, "generated");

        let value: Value = serde_json::from_str(&examples[0].content).unwrap();
        assert_eq!(
            value,
            json!({"targetSpec": {
                "name": "my-rancher",
                "plan": "OVHCLOUD_EDITION",
                "iamAuthEnabled": false,
                "nodes": 0
            }})
        );
    }

    #[test]
    fn test_non_json_fallback() {
        let schema = schema_with(json!({}));
        let examples =
            operation_request_examples(&schema, PATH, "put", "name: x", &no_replacements())
                .unwrap();
        assert_eq!(examples[0].content, "name: x");

        let mut replacements = Map::new();
        replacements.insert("name".into(), json!("y"));
        assert!(matches!(
            operation_request_examples(&schema, PATH, "put", "name: x", &replacements),
            Err(Error::Schema(_))
        ));
    }

    #[test]
    fn test_unparsable_schema_is_fatal() {
        assert!(matches!(
            operation_request_examples(b"{{", PATH, "post", "{}", &no_replacements()),
            Err(Error::Schema(_))
        ));
    }
}
