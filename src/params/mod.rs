//! Request parameters
//!
//! - [`spec`] - Typed fields and the values bound from flags
//! - [`resolver`] - Flags, files, stdin and editor merged into one payload
//! - [`init_file`] - Example parameter files for `--init-file`

pub mod init_file;
pub mod resolver;
pub mod spec;

pub use init_file::write_init_file;
pub use resolver::{
    edit_input, parse_document, read_document, resolve_create, resolve_edit, stdin_is_piped,
    OperationRef, ParameterDocument, ParameterInput, ParameterSources,
};
pub use spec::{FieldDef, FieldKind, ParameterSpec};
