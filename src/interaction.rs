//! Terminal interaction
//!
//! The selection prompt and the external editor session used while resolving
//! parameters. Commands only see the [`Interaction`] trait so tests can
//! script the answers.

use crate::error::{Error, Result};

pub trait Interaction {
    /// Ask the user to pick one of `items`; `None` when the prompt is dismissed
    fn select(&self, prompt: &str, items: &[String]) -> Result<Option<usize>>;

    /// Open `content` in an editor and return the saved text; `None` when
    /// the file was not saved
    fn edit(&self, content: &str) -> Result<Option<String>>;
}

/// Prompts on the controlling terminal, editor taken from `$VISUAL`/`$EDITOR`
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalInteraction;

impl Interaction for TerminalInteraction {
    fn select(&self, prompt: &str, items: &[String]) -> Result<Option<usize>> {
        dialoguer::Select::new()
            .with_prompt(prompt)
            .items(items)
            .default(0)
            .interact_opt()
            .map_err(|e| Error::Interaction(e.to_string()))
    }

    fn edit(&self, content: &str) -> Result<Option<String>> {
        // The temporary file is removed by dialoguer once the editor exits
        dialoguer::Editor::new()
            .extension(".json")
            .require_save(true)
            .edit(content)
            .map_err(|e| Error::Interaction(e.to_string()))
    }
}

/// Pick a candidate: a single one is taken as is, several go through a prompt
pub fn choose(
    interaction: &dyn Interaction,
    prompt: &str,
    names: &[String],
) -> Result<usize> {
    match names.len() {
        0 => Err(Error::config("no example available for this operation")),
        1 => Ok(0),
        _ => interaction
            .select(prompt, names)?
            .filter(|i| *i < names.len())
            .ok_or_else(|| Error::config("no example selected, aborting")),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted interaction for tests

    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    pub struct Scripted {
        pub selection: Option<usize>,
        pub edited: Option<String>,
        pub shown: RefCell<Vec<String>>,
        pub prompts: RefCell<Vec<Vec<String>>>,
    }

    impl Interaction for Scripted {
        fn select(&self, _prompt: &str, items: &[String]) -> Result<Option<usize>> {
            self.prompts.borrow_mut().push(items.to_vec());
            Ok(self.selection)
        }

        fn edit(&self, content: &str) -> Result<Option<String>> {
            self.shown.borrow_mut().push(content.to_string());
            Ok(self.edited.clone())
        }
    }
}
