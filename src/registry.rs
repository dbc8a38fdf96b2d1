//! External Command Registry
//!
//! The built-in command vocabulary can be extended without touching the core
//! parser: an extension registers a [`CommandExtension`] under a tag name, and
//! any definition element whose tag matches no built-in command is offered to
//! the registry. Elements whose tag matches no registered extension either are
//! skipped silently, which lets one definition file work with and without the
//! extension loaded.
//!
//! The registry is an explicit object, not process-global state. Registration
//! is expected to finish before the first pipeline load; the execution model
//! is single-threaded throughout (see [`crate::pipeline`]).

use crate::command::{CmdParam, PipelineCommand};
use crate::device::RenderDevice;
use crate::xml::ElementView;

/// Parse/execute capability of one externally supplied command kind.
pub trait CommandExtension {
    /// Parses a definition element into the command's parameter list.
    ///
    /// A returned error message fails the whole pipeline load; it is passed
    /// through to the loader verbatim.
    fn parse(&self, element: &ElementView) -> std::result::Result<Vec<CmdParam>, String>;

    /// Executes a previously parsed command against the live device.
    fn execute(&self, params: &[CmdParam], ctx: &mut ExecContext);
}

/// Collaborators available to an executing command.
pub struct ExecContext<'a> {
    /// The graphics device the pipeline renders through.
    pub device: &'a mut dyn RenderDevice,
}

struct RegEntry {
    name: String,
    ext: Box<dyn CommandExtension>,
}

/// Table of registered external command kinds.
///
/// Entries are append-only and looked up by exact tag name, first registration
/// wins. A later registration under an occupied name is kept but unreachable;
/// the collision is logged, not corrected.
#[derive(Default)]
pub struct CommandRegistry {
    entries: Vec<RegEntry>,
}

impl CommandRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an extension under a definition tag name.
    pub fn register(&mut self, name: impl Into<String>, ext: Box<dyn CommandExtension>) {
        let name = name.into();
        debug_assert!(!name.is_empty(), "extension command name must not be empty");
        if self.entries.iter().any(|e| e.name == name) {
            log::warn!("Pipeline command '{name}' registered twice; first registration wins");
        }
        self.entries.push(RegEntry {
            name,
            ext,
        });
    }

    /// Number of registered entries, shadowed ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Offers an element to the registry.
    ///
    /// Returns `None` when no entry matches the tag name (the caller skips
    /// the element), otherwise the matching extension's parse result with the
    /// entry index recorded for execute dispatch.
    pub fn parse(
        &self,
        name: &str,
        element: &ElementView,
    ) -> Option<std::result::Result<PipelineCommand, String>> {
        self.entries
            .iter()
            .enumerate()
            .find(|(_, entry)| entry.name == name)
            .map(|(index, entry)| {
                entry
                    .ext
                    .parse(element)
                    .map(|params| PipelineCommand::External { index, params })
            })
    }

    /// Dispatches an external command to its registered extension.
    ///
    /// Built-in commands and indices the registry does not know are a no-op.
    pub fn execute(&self, command: &PipelineCommand, ctx: &mut ExecContext) {
        if let PipelineCommand::External { index, params } = command {
            if let Some(entry) = self.entries.get(*index) {
                entry.ext.execute(params, ctx);
            }
        }
    }
}
