//! Output rendering
//!
//! Turns the outcome of a command into text: a table built from the resource
//! columns, raw JSON or YAML, or the result of a `--format` projection.

use crate::error::{Error, Result};
use crate::filter::Projection;
use crate::record::display_value;
use serde_json::{Map, Value};
use std::path::PathBuf;
use tabled::builder::Builder;
use tabled::settings::Style;

/// Shown under tables, which only carry a subset of the fields
pub const RAW_OUTPUT_HINT: &str =
    "💡 Use option --json or --yaml to get the raw output with all information";

/// Result of one command, before rendering
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Listing rendered with the resource columns in table mode
    Records {
        records: Vec<Value>,
        columns: Vec<String>,
    },
    Record(Value),
    Message {
        message: String,
        details: Option<Value>,
    },
    /// `--init-file` wrote its file; the process stops there
    InitFileWritten(PathBuf),
}

impl Outcome {
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
            details: None,
        }
    }

    pub fn message_with_details(message: impl Into<String>, details: Value) -> Self {
        let details = (!details.is_null()).then_some(details);
        Self::Message {
            message: message.into(),
            details,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Yaml,
    /// `--format` projection
    Custom(Projection),
}

impl OutputFormat {
    /// Pick the format from the (mutually exclusive) output flags
    pub fn from_flags(json: bool, yaml: bool, format: Option<&str>) -> Result<Self> {
        match (json, yaml, format) {
            (false, false, None) => Ok(Self::Table),
            (true, false, None) => Ok(Self::Json),
            (false, true, None) => Ok(Self::Yaml),
            (false, false, Some(expr)) => Ok(Self::Custom(Projection::compile(expr)?)),
            _ => Err(Error::config(
                "only one of --json, --yaml and --format can be used",
            )),
        }
    }
}

/// A table column: `path` or `path Header`
struct Column {
    header: String,
    projection: Projection,
}

fn parse_columns(columns: &[String]) -> Result<Vec<Column>> {
    columns
        .iter()
        .map(|spec| {
            let (path, header) = match spec.trim().split_once(' ') {
                Some((path, header)) => (path, header.trim().to_string()),
                None => (spec.trim(), spec.trim().to_string()),
            };
            Ok(Column {
                header,
                projection: Projection::compile(path)?,
            })
        })
        .collect()
}

fn cell(value: &Value) -> String {
    match value {
        Value::Array(_) | Value::Object(_) => value.to_string(),
        other => display_value(other),
    }
}

fn records_table(records: &[Value], columns: &[String]) -> Result<String> {
    let columns = parse_columns(columns)?;

    let mut builder = Builder::default();
    builder.push_record(columns.iter().map(|c| c.header.clone()));
    for record in records {
        // Missing or unusable fields render as empty cells
        builder.push_record(columns.iter().map(|c| {
            c.projection
                .apply(record)
                .map(|v| cell(&v))
                .unwrap_or_default()
        }));
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    Ok(format!("{}\n{}", table, RAW_OUTPUT_HINT))
}

fn record_table(record: &Value) -> String {
    let Value::Object(map) = record else {
        return cell(record);
    };

    let mut builder = Builder::default();
    builder.push_record(["Field".to_string(), "Value".to_string()]);
    for (key, value) in map {
        builder.push_record([key.clone(), cell(value)]);
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    format!("{}\n{}", table, RAW_OUTPUT_HINT)
}

fn to_json(value: &Value) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| Error::config(format!("failed to serialize output: {e}")))
}

fn to_yaml(value: &Value) -> Result<String> {
    serde_yaml::to_string(value)
        .map(|s| s.trim_end().to_string())
        .map_err(|e| Error::config(format!("failed to serialize output: {e}")))
}

fn message_document(message: &str, details: &Option<Value>) -> Value {
    let mut document = Map::new();
    if let Some(details) = details {
        document.insert("details".into(), details.clone());
    }
    document.insert("message".into(), Value::String(message.to_string()));
    Value::Object(document)
}

/// Render an outcome in the requested format
pub fn render(outcome: &Outcome, format: &OutputFormat) -> Result<String> {
    match outcome {
        Outcome::Records { records, columns } => match format {
            OutputFormat::Table => records_table(records, columns),
            OutputFormat::Json => to_json(&Value::Array(records.clone())),
            OutputFormat::Yaml => to_yaml(&Value::Array(records.clone())),
            OutputFormat::Custom(projection) => Ok(projection
                .apply_each(records)?
                .iter()
                .map(Value::to_string)
                .collect::<Vec<_>>()
                .join("\n")),
        },
        Outcome::Record(record) => match format {
            OutputFormat::Table => Ok(record_table(record)),
            OutputFormat::Json => to_json(record),
            OutputFormat::Yaml => to_yaml(record),
            OutputFormat::Custom(projection) => Ok(projection.apply(record)?.to_string()),
        },
        Outcome::Message { message, details } => match format {
            OutputFormat::Table => Ok(message.clone()),
            OutputFormat::Json => to_json(&message_document(message, details)),
            OutputFormat::Yaml => to_yaml(&message_document(message, details)),
            OutputFormat::Custom(projection) => Ok(projection
                .apply(&message_document(message, details))?
                .to_string()),
        },
        Outcome::InitFileWritten(path) => {
            let message = format!("⚡️ Parameter file written at {}", path.display());
            match format {
                OutputFormat::Json => to_json(&message_document(&message, &None)),
                OutputFormat::Yaml => to_yaml(&message_document(&message, &None)),
                _ => Ok(message),
            }
        }
    }
}
