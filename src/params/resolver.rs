//! Parameter resolution
//!
//! Builds the body of a create or edit request out of, by precedence:
//! command line flags, a parameter file (or piped stdin), an editor session
//! seeded with a schema example, and for creation the required-field check.

use super::spec::{apply_defaults, ParameterSpec};
use crate::error::{Error, Result};
use crate::interaction::{self, Interaction};
use crate::schema::{self, SchemaDocument};
use serde_json::{Map, Value};
use std::io::Read;
use std::path::{Path, PathBuf};

/// Where a parameter document comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterInput {
    File(PathBuf),
    Stdin,
    Editor,
}

/// Parameter-related flags of one invocation
#[derive(Debug, Clone, Default)]
pub struct ParameterSources {
    /// `--from-file` value; `-` reads stdin
    pub from_file: Option<String>,
    /// `--editor`
    pub editor: bool,
    /// Whether stdin is a pipe or a regular file, see [`stdin_is_piped`]
    pub stdin_piped: bool,
    /// Stdin content when already read; the process stdin is read otherwise
    pub stdin: Option<String>,
}

/// Parameter document of one invocation, read once
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterDocument {
    /// No document, flags only
    Flags,
    Editor,
    /// Parsed from a file or stdin
    Given(Value),
}

/// Whether stdin carries data: a pipe or a redirected regular file
///
/// Terminals and character devices such as `/dev/null` do not count.
#[cfg(unix)]
pub fn stdin_is_piped() -> bool {
    use std::os::fd::AsFd;
    use std::os::unix::fs::FileTypeExt;

    let Ok(fd) = std::io::stdin().as_fd().try_clone_to_owned() else {
        return false;
    };
    match std::fs::File::from(fd).metadata() {
        Ok(metadata) => {
            let file_type = metadata.file_type();
            file_type.is_fifo() || file_type.is_file()
        }
        Err(e) => {
            tracing::debug!("Cannot inspect stdin: {}", e);
            false
        }
    }
}

#[cfg(not(unix))]
pub fn stdin_is_piped() -> bool {
    use std::io::IsTerminal;
    !std::io::stdin().is_terminal()
}

impl ParameterSources {
    /// The single document source to use, if any
    pub fn input(&self) -> Result<Option<ParameterInput>> {
        match (self.from_file.as_deref(), self.editor) {
            (Some(_), true) => Err(Error::config(
                "--from-file and --editor cannot be used together",
            )),
            (Some("-"), false) => Ok(Some(ParameterInput::Stdin)),
            (Some(path), false) => Ok(Some(ParameterInput::File(PathBuf::from(path)))),
            (None, true) => Ok(Some(ParameterInput::Editor)),
            (None, false) if self.stdin_piped => Ok(Some(ParameterInput::Stdin)),
            (None, false) => Ok(None),
        }
    }

    /// Read the selected document
    ///
    /// Implicit stdin holding nothing counts as no document, so flags alone
    /// still build the payload. An explicit `--from-file -` must not be empty.
    pub fn load(&self) -> Result<ParameterDocument> {
        match self.input()? {
            None => Ok(ParameterDocument::Flags),
            Some(ParameterInput::Editor) => Ok(ParameterDocument::Editor),
            Some(ParameterInput::File(path)) => read_document(&path).map(ParameterDocument::Given),
            Some(ParameterInput::Stdin) => {
                let text = self.read_stdin()?;
                if self.from_file.is_none() && text.trim().is_empty() {
                    tracing::debug!("Piped stdin is empty, using flags only");
                    return Ok(ParameterDocument::Flags);
                }
                parse_document(&text).map(ParameterDocument::Given)
            }
        }
    }

    fn read_stdin(&self) -> Result<String> {
        if let Some(text) = &self.stdin {
            return Ok(text.clone());
        }
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .map_err(|e| Error::io("<stdin>", e))?;
        Ok(text)
    }
}

/// Schema coordinates of the operation a payload is built for
#[derive(Debug, Clone, Copy)]
pub struct OperationRef<'a> {
    pub schema: &'a [u8],
    pub path: &'a str,
    pub method: &'a str,
}

impl OperationRef<'_> {
    fn validate(&self, payload: &Value) -> Result<()> {
        let document = SchemaDocument::parse(self.schema)?;
        match document.operation(self.path, self.method) {
            Some(operation) => operation.validate_enums(payload),
            None => Ok(()),
        }
    }
}

/// Build a creation payload
///
/// `fallback` is the example used when the schema declares none and
/// `required` lists the fields a flags-only invocation must set.
pub fn resolve_create(
    spec: &ParameterSpec,
    sources: &ParameterSources,
    operation: OperationRef<'_>,
    fallback: &str,
    required: &[String],
    interaction: &dyn Interaction,
) -> Result<Value> {
    let mut payload = match sources.load()? {
        ParameterDocument::Flags => {
            let missing = spec.missing(required);
            if !missing.is_empty() {
                return Err(Error::MissingFields(missing));
            }
            spec.to_payload()
        }
        ParameterDocument::Editor => {
            let candidates = schema::operation_request_examples(
                operation.schema,
                operation.path,
                operation.method,
                fallback,
                &spec.values(),
            )?;
            let names: Vec<String> = candidates.iter().map(|c| c.name.clone()).collect();
            let choice = interaction::choose(interaction, "Please select a parameter example", &names)?;
            let edited = edit_document(interaction, &candidates[choice].content)?;
            spec.apply_document(edited)?
        }
        ParameterDocument::Given(document) => spec.apply_document(document)?,
    };

    apply_defaults(spec, &mut payload);
    operation.validate(&payload)?;
    tracing::debug!("Resolved creation payload for {}", operation.path);
    Ok(payload)
}

/// Document of an update, rejecting one that would change nothing
pub fn edit_input(spec: &ParameterSpec, sources: &ParameterSources) -> Result<ParameterDocument> {
    let document = sources.load()?;
    if document == ParameterDocument::Flags && spec.is_empty() {
        return Err(Error::config(
            "nothing to update, set at least one field or use --editor / --from-file",
        ));
    }
    Ok(document)
}

/// Build an update payload
///
/// `document` comes from [`edit_input`]. In editor mode the user starts from
/// `current` (the resource as returned by the API) restricted to what the
/// update operation accepts.
pub fn resolve_edit(
    spec: &ParameterSpec,
    document: ParameterDocument,
    operation: OperationRef<'_>,
    current: &Value,
    interaction: &dyn Interaction,
) -> Result<Value> {
    let payload = match document {
        ParameterDocument::Flags => spec.to_payload(),
        ParameterDocument::Editor => {
            let document = SchemaDocument::parse(operation.schema)?;
            let accepted = document
                .operation(operation.path, operation.method)
                .map(|op| op.body_properties())
                .unwrap_or_default();

            let baseline = spec.apply_document(editable_state(current, &accepted))?;
            let content = serde_json::to_string_pretty(&baseline)
                .map_err(|e| Error::InvalidParameters(e.to_string()))?;
            spec.apply_document(edit_document(interaction, &content)?)?
        }
        ParameterDocument::Given(document) => spec.apply_document(document)?,
    };

    operation.validate(&payload)?;
    Ok(payload)
}

/// Keep only the properties an update accepts; everything when unknown
fn editable_state(current: &Value, accepted: &[String]) -> Value {
    match current {
        Value::Object(map) if !accepted.is_empty() => Value::Object(
            map.iter()
                .filter(|(k, _)| accepted.contains(k))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect::<Map<String, Value>>(),
        ),
        Value::Object(_) => current.clone(),
        _ => Value::Object(Map::new()),
    }
}

fn edit_document(interaction: &dyn Interaction, content: &str) -> Result<Value> {
    let edited = interaction
        .edit(content)?
        .ok_or_else(|| Error::config("parameters were not saved, aborting"))?;
    parse_document(&edited)
}

/// Read a parameter document from a file
pub fn read_document(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    parse_document(&text)
}

/// Parse JSON, or YAML as an equivalent structured format
pub fn parse_document(text: &str) -> Result<Value> {
    if text.trim().is_empty() {
        return Err(Error::InvalidParameters("no parameters given".into()));
    }

    match serde_json::from_str::<Value>(text) {
        Ok(value) => Ok(value),
        Err(json_err) => serde_yaml::from_str::<Value>(text).map_err(|_| {
            Error::InvalidParameters(format!("parameters are neither JSON nor YAML: {json_err}"))
        }),
    }
}
