//! Parameter spec
//!
//! The typed set of fields a create or edit command accepts, and the values
//! bound to them for one invocation.

use crate::error::{Error, Result};
use crate::record;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Semantic type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    #[default]
    String,
    /// List of unique strings (`--tag a --tag b` or `--tag a,b`)
    StringSet,
    /// `key=value` pairs
    StringMap,
    Integer,
    Boolean,
}

impl FieldKind {
    /// Whether `value` fits this kind; `null` always does
    pub fn accepts(self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) => true,
            (Self::String, Value::String(_)) => true,
            (Self::StringSet, Value::Array(items)) => items.iter().all(Value::is_string),
            (Self::StringMap, Value::Object(map)) => map.values().all(Value::is_string),
            (Self::Integer, Value::Number(n)) => n.is_i64() || n.is_u64(),
            (Self::Boolean, Value::Bool(_)) => true,
            _ => false,
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Self::String => "a string",
            Self::StringSet => "a list of strings",
            Self::StringMap => "a map of strings",
            Self::Integer => "an integer",
            Self::Boolean => "a boolean",
        }
    }
}

/// One settable field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Dotted serialization key in the request body (`targetSpec.name`)
    pub key: String,
    /// Command line flag name, without dashes
    pub flag: String,
    #[serde(default)]
    pub kind: FieldKind,
    #[serde(default)]
    pub help: String,
    /// Value sent on creation when no source sets the field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

/// Fields of a command and the values explicitly set for them
#[derive(Debug, Clone, Default)]
pub struct ParameterSpec {
    fields: Vec<FieldDef>,
    values: BTreeMap<usize, Value>,
}

impl ParameterSpec {
    pub fn new(fields: Vec<FieldDef>) -> Self {
        Self {
            fields,
            values: BTreeMap::new(),
        }
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    fn position(&self, name: &str) -> Result<usize> {
        self.fields
            .iter()
            .position(|f| f.flag == name || f.key == name)
            .ok_or_else(|| Error::config(format!("unknown parameter {name:?}")))
    }

    /// Set a field (by flag name or key) to an already typed value
    pub fn set(&mut self, name: &str, value: Value) -> Result<()> {
        let index = self.position(name)?;
        let field = &self.fields[index];
        if !field.kind.accepts(&value) {
            return Err(Error::InvalidParameters(format!(
                "field {} must be {}",
                field.key,
                field.kind.describe()
            )));
        }
        let value = match (field.kind, value) {
            (FieldKind::StringSet, Value::Array(items)) => Value::Array(dedup(items)),
            (_, value) => value,
        };
        self.values.insert(index, value);
        Ok(())
    }

    /// Set a field from the raw strings given on the command line
    pub fn set_from_args(&mut self, name: &str, raw: &[String]) -> Result<()> {
        let index = self.position(name)?;
        let field = &self.fields[index];
        let value = parse_raw(field, raw)?;
        self.values.insert(index, value);
        Ok(())
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.position(name)
            .map(|i| self.values.contains_key(&i))
            .unwrap_or(false)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Flags of `required` fields that were not set
    pub fn missing(&self, required: &[String]) -> Vec<String> {
        required
            .iter()
            .filter(|name| !self.is_set(name))
            .map(|name| {
                self.fields
                    .iter()
                    .find(|f| &f.flag == name || &f.key == name)
                    .map(|f| f.flag.clone())
                    .unwrap_or_else(|| name.to_string())
            })
            .collect()
    }

    /// Set values keyed by serialization key, in declaration order
    pub fn values(&self) -> Map<String, Value> {
        self.values
            .iter()
            .map(|(i, v)| (self.fields[*i].key.clone(), v.clone()))
            .collect()
    }

    /// Sparse request body holding only the set fields
    pub fn to_payload(&self) -> Value {
        let mut body = Map::new();
        self.overlay_into(&mut body);
        Value::Object(body)
    }

    fn overlay_into(&self, body: &mut Map<String, Value>) {
        for (index, value) in &self.values {
            record::insert_path(body, &self.fields[*index].key, value.clone());
        }
    }

    /// Merge a file or editor document with the set values on top
    ///
    /// Declared fields present in the document must match their kind;
    /// undeclared keys are kept as they are.
    pub fn apply_document(&self, document: Value) -> Result<Value> {
        let Value::Object(mut body) = document else {
            return Err(Error::InvalidParameters(
                "parameters must be an object".into(),
            ));
        };

        for field in &self.fields {
            let (head, rest) = field.key.split_once('.').unwrap_or((field.key.as_str(), ""));
            let found = body.get(head).and_then(|v| record::lookup(v, rest));

            if let Some(value) = found {
                if !field.kind.accepts(value) {
                    return Err(Error::InvalidParameters(format!(
                        "field {} must be {}, got {}",
                        field.key,
                        field.kind.describe(),
                        value
                    )));
                }
            }
        }

        self.overlay_into(&mut body);
        Ok(Value::Object(body))
    }
}

/// Fill unset defaulted fields of a creation body
pub fn apply_defaults(spec: &ParameterSpec, body: &mut Value) {
    let Value::Object(map) = body else {
        return;
    };
    for field in &spec.fields {
        let Some(default) = &field.default else {
            continue;
        };
        let (head, rest) = field.key.split_once('.').unwrap_or((field.key.as_str(), ""));
        if map.get(head).and_then(|v| record::lookup(v, rest)).is_none() {
            record::insert_path(map, &field.key, default.clone());
        }
    }
}

fn dedup(items: Vec<Value>) -> Vec<Value> {
    let mut unique: Vec<Value> = Vec::with_capacity(items.len());
    for item in items {
        if !unique.contains(&item) {
            unique.push(item);
        }
    }
    unique
}

fn parse_raw(field: &FieldDef, raw: &[String]) -> Result<Value> {
    let single = || {
        raw.last()
            .cloned()
            .ok_or_else(|| Error::config(format!("missing value for --{}", field.flag)))
    };

    let value = match field.kind {
        FieldKind::String => Value::String(single()?),
        FieldKind::StringSet => Value::Array(dedup(
            raw.iter().map(|s| Value::String(s.clone())).collect(),
        )),
        FieldKind::StringMap => {
            let mut map = Map::new();
            for pair in raw {
                let (key, value) = pair.split_once('=').ok_or_else(|| {
                    Error::config(format!(
                        "invalid value {pair:?} for --{}, expected key=value",
                        field.flag
                    ))
                })?;
                map.insert(key.to_string(), Value::String(value.to_string()));
            }
            Value::Object(map)
        }
        FieldKind::Integer => {
            let text = single()?;
            let number: i64 = text.trim().parse().map_err(|_| {
                Error::config(format!(
                    "invalid value {text:?} for --{}, expected an integer",
                    field.flag
                ))
            })?;
            Value::from(number)
        }
        FieldKind::Boolean => {
            let text = single()?;
            let flag: bool = text.trim().parse().map_err(|_| {
                Error::config(format!(
                    "invalid value {text:?} for --{}, expected true or false",
                    field.flag
                ))
            })?;
            Value::Bool(flag)
        }
    };

    Ok(value)
}
