//! tinsh: a small interactive command shell.
//!
//! A line is history-expanded, tokenized with quote awareness, parsed into a
//! [`Sequence`](parse::Sequence) of pipelines, and run by the
//! [`Executor`](exec::Executor). Each command resolves to a built-in, an alias
//! of one, or an executable on disk. Pipes pass captured text between stages;
//! `>`, `>>` and `<` redirect to and from files.
//!
//! # Architecture
//!
//! - **[`parse`]**: Tokenizer, sequence/pipeline parser, AST types.
//! - **[`exec`]**: Executor: pipelines, redirects, external processes, history expansion.
//! - **[`registry`]**: Built-in lookup and alias expansion.
//! - **[`commands`]**: Handler trait and the built-in commands.
//! - **[`state`]**: Per-session state: directories, history, mode.
//! - **[`edit`]**: Edit-mode line buffer.
//! - **[`config`]**: Configuration loading: embedded defaults + user overlay merge.
//! - **[`logging`]**: `log` setup: file log plus optional stderr.

/// Handler trait and built-in commands.
pub mod commands;
/// Configuration types, loading, and overlay merge logic.
pub mod config;
/// Edit-mode line buffer.
pub mod edit;
/// Error type shared by the engine.
pub mod error;
/// Line execution: pipelines, redirects, external commands, history.
pub mod exec;
/// Logger initialization.
pub mod logging;
/// Tokenizer, parser and AST types.
pub mod parse;
/// Command registry and aliases.
pub mod registry;
/// Session state.
pub mod state;

use std::rc::Rc;

use config::Config;
use exec::Executor;
use registry::CommandRegistry;
use state::ShellState;

/// Build an executor and a fresh session state from `config`.
///
/// The session starts in the process working directory.
pub fn session(config: &Config) -> (Executor, ShellState) {
    let registry = Rc::new(CommandRegistry::from_config(config));
    (Executor::new(config), ShellState::new(registry))
}

/// Run one line in a fresh session built from the default config.
///
/// This is the main entry point for tests and simple usage.
/// For an interactive session, keep the pair from [`session`] instead.
pub fn run(line: &str) -> String {
    let (mut executor, mut state) = session(&Config::default_config());
    executor.run(&mut state, line)
}
