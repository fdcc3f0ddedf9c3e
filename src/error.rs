//! Error type for the execution engine.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to start {}: {source}", path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("history: event not found")]
    EventNotFound,
    #[error("alias: cycle detected: {0}")]
    AliasCycle(String),
    #[error("alias: target command not found: {0}")]
    AliasTarget(String),
}

impl ShellError {
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        ShellError::Io {
            context: context.into(),
            source,
        }
    }

    /// Text shown to the user in place of command output.
    ///
    /// Resolution errors carry their own prefix; anything else is unexpected
    /// and gets the generic `Error:` prefix.
    pub fn render(&self) -> String {
        match self {
            ShellError::EventNotFound | ShellError::AliasCycle(_) | ShellError::AliasTarget(_) => {
                self.to_string()
            }
            _ => format!("Error: {self}"),
        }
    }
}
