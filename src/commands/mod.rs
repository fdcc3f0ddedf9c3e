//! Built-in commands and the handler contract they share.
//!
//! Every built-in implements [`Command`]: it receives the session state and
//! an [`Invocation`] and returns its output text. Expected failures (missing
//! file, bad operand) are returned as `<name>: <detail>` text, never as errors.

/// Per-call context: name, arguments, optional input.
pub mod context;
/// `ls`, `touch`, `mkdir`, `rm`, `rmdir`.
pub mod fs;
/// `cd`, `pwd`.
pub mod nav;
/// `alias`, `unalias`, `history`, `help`, `which`, `clear`, `edit`.
pub mod session;
/// `echo`, `cat`.
pub mod text;

pub use context::Invocation;

use crate::state::ShellState;

/// A command the shell runs in-process.
pub trait Command {
    /// Name the command is registered under.
    fn name(&self) -> &str;

    /// Run the command and return its output.
    fn execute(&self, state: &mut ShellState, inv: &Invocation) -> String;
}
