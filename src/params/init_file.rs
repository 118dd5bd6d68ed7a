//! `--init-file`: write an example parameter file and stop
//!
//! Security: a file that already exists is only ever replaced when the user
//! asked for it with `--replace`.

use crate::error::{Error, Result};
use crate::interaction::{self, Interaction};
use crate::schema::NamedExample;
use std::io::Write;
use std::path::Path;

/// Write one of `candidates` to `path`
///
/// With several candidates the user picks one; the existence check runs
/// before prompting.
pub fn write_init_file(
    path: &Path,
    replace: bool,
    candidates: &[NamedExample],
    interaction: &dyn Interaction,
) -> Result<()> {
    if !replace && path.exists() {
        return Err(Error::FileExists(path.to_path_buf()));
    }

    let names: Vec<String> = candidates.iter().map(|c| c.name.clone()).collect();
    let choice = interaction::choose(interaction, "Please select a parameter example", &names)?;
    let content = &candidates[choice].content;

    if replace {
        std::fs::write(path, content).map_err(|e| Error::io(path, e))?;
    } else {
        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::AlreadyExists => Error::FileExists(path.to_path_buf()),
                _ => Error::io(path, e),
            })?;
        file.write_all(content.as_bytes())
            .map_err(|e| Error::io(path, e))?;
    }

    tracing::info!(
        "Parameters file {:?} written from example {:?}",
        path,
        candidates[choice].name
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::testing::Scripted;

    fn candidates() -> Vec<NamedExample> {
        vec![
            NamedExample::new("Minimal", r#"{"name": "min"}"#),
            NamedExample::new("Full", r#"{"name": "full"}"#),
        ]
    }

    #[test]
    fn test_second_write_without_replace_conflicts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.json");
        let scripted = Scripted {
            selection: Some(0),
            ..Default::default()
        };

        write_init_file(&path, false, &candidates(), &scripted).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), r#"{"name": "min"}"#);

        let picky = Scripted {
            selection: Some(1),
            ..Default::default()
        };
        let err = write_init_file(&path, false, &candidates(), &picky).unwrap_err();
        assert!(matches!(err, Error::FileExists(_)));
        // Rejected before any prompt
        assert!(picky.prompts.borrow().is_empty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), r#"{"name": "min"}"#);

        write_init_file(&path, true, &candidates(), &picky).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), r#"{"name": "full"}"#);
    }

    #[test]
    fn test_single_candidate_written_without_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.json");
        let scripted = Scripted::default();

        write_init_file(
            &path,
            false,
            &[NamedExample::new("default", "{}")],
            &scripted,
        )
        .unwrap();
        assert!(scripted.prompts.borrow().is_empty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
    }

    #[test]
    fn test_cancelled_selection_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.json");
        assert!(write_init_file(&path, false, &candidates(), &Scripted::default()).is_err());
        assert!(!path.exists());
    }
}
