//! The executor: walks a parsed line and produces its output.

/// Fallback to executables found on disk.
pub mod external;
/// `!` history references.
pub mod history;
/// Output and input redirection.
pub mod redirect;

use std::io::ErrorKind;

use log::{debug, warn};

use crate::commands::Invocation;
use crate::config::Config;
use crate::edit::EditBuffer;
use crate::error::ShellError;
use crate::parse::{self, CommandNode, Pipeline, RedirectKind, Sequence};
use crate::state::{ShellMode, ShellState};
use external::ExternalRunner;

/// Separator placed between the outputs of a line's pipelines.
#[cfg(windows)]
pub const LINE_SEPARATOR: &str = "\r\n";
#[cfg(not(windows))]
pub const LINE_SEPARATOR: &str = "\n";

/// Runs input lines against a [`ShellState`].
///
/// Pipelines are run stage by stage: each stage's output is captured in full
/// and handed to the next one, so nothing streams and nothing runs
/// concurrently.
pub struct Executor {
    external: ExternalRunner,
    history_expansion: bool,
    edit: EditBuffer,
}

impl Executor {
    pub fn new(config: &Config) -> Self {
        Self {
            external: ExternalRunner::from_config(&config.external),
            history_expansion: config.settings.history_expansion,
            edit: EditBuffer::new(),
        }
    }

    pub fn edit_buffer(&self) -> &EditBuffer {
        &self.edit
    }

    /// Run one input line and return everything it printed.
    ///
    /// Never fails: errors come back as text.
    pub fn run(&mut self, state: &mut ShellState, line: &str) -> String {
        if state.mode != ShellMode::Normal {
            return self.edit.handle(state, line);
        }

        let line = line.trim();
        if line.is_empty() {
            return String::new();
        }

        let line = if self.history_expansion {
            match history::expand(&state.history, line) {
                Ok(Some(expanded)) => {
                    debug!("history: {line} -> {expanded}");
                    expanded
                }
                Ok(None) => line.to_string(),
                Err(e) => return e.render(),
            }
        } else {
            line.to_string()
        };
        state.history.push(line.clone());

        let sequence = parse::parse_sequence(&line);
        debug!("sequence: {sequence:?}");
        self.run_sequence(state, &sequence)
            .unwrap_or_else(|e| e.render())
    }

    fn run_sequence(
        &self,
        state: &mut ShellState,
        sequence: &Sequence,
    ) -> Result<String, ShellError> {
        let mut outputs = Vec::new();
        for pipeline in &sequence.pipelines {
            let output = self.run_pipeline(state, pipeline)?;
            if !output.is_empty() {
                outputs.push(output);
            }
        }
        Ok(outputs.join(LINE_SEPARATOR))
    }

    /// Run the stages of one pipeline in order.
    ///
    /// Only the first stage reads an input redirect and only the last stage
    /// writes an output redirect. Piped output reaches a stage only when it
    /// was given no arguments of its own.
    pub fn run_pipeline(
        &self,
        state: &mut ShellState,
        pipeline: &Pipeline,
    ) -> Result<String, ShellError> {
        let Some(last) = pipeline.commands.len().checked_sub(1) else {
            return Ok(String::new());
        };

        let mut piped: Option<String> = None;
        for (i, node) in pipeline.commands.iter().enumerate() {
            let redirected = match node.redirect.kind {
                RedirectKind::Input if i == 0 => match self.read_input(state, node)? {
                    Ok(text) => Some(text),
                    Err(message) => return Ok(message),
                },
                RedirectKind::Input => {
                    debug!("ignoring input redirect on stage {i} ({})", node.name);
                    None
                }
                kind if kind.is_output() && i != last => {
                    debug!("ignoring output redirect on stage {i} ({})", node.name);
                    None
                }
                _ => None,
            };

            let stdin = match (&redirected, &piped) {
                (Some(text), _) => Some(text.as_str()),
                (None, Some(prev)) if node.args.is_empty() => Some(prev.as_str()),
                (None, Some(_)) => {
                    debug!("{} has arguments; dropping piped input", node.name);
                    None
                }
                (None, None) => None,
            };

            let output = self.run_command(state, node, stdin)?;
            piped = Some(output);
        }

        let output = piped.unwrap_or_default();
        let tail = &pipeline.commands[last];
        match (tail.redirect.kind, &tail.redirect.path) {
            (kind, Some(target)) if kind.is_output() => {
                let path = state.resolve_path(target);
                match redirect::write_output(&path, kind, &output) {
                    Ok(()) => Ok(String::new()),
                    Err(e) => {
                        warn!("{e}");
                        Ok(format!("redirect: error: {e}"))
                    }
                }
            }
            _ => Ok(output),
        }
    }

    /// Contents of the stage's `<` file. A missing file is reported as the
    /// stage's own "no such file" message.
    fn read_input(
        &self,
        state: &ShellState,
        node: &CommandNode,
    ) -> Result<Result<String, String>, ShellError> {
        let Some(target) = &node.redirect.path else {
            return Ok(Err(String::new()));
        };
        let path = state.resolve_path(target);
        match redirect::read_input(&path) {
            Ok(text) => Ok(Ok(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Ok(Err(format!("{}: no such file: {target}", node.name)))
            }
            Err(e) => Err(ShellError::io(path.display().to_string(), e)),
        }
    }

    /// Run one stage: built-in or alias first, then an executable on disk.
    fn run_command(
        &self,
        state: &mut ShellState,
        node: &CommandNode,
        stdin: Option<&str>,
    ) -> Result<String, ShellError> {
        let registry = state.registry();
        if let Some(command) = registry.resolve(&node.name) {
            debug!("built-in: {} {:?}", node.name, node.args);
            let inv = Invocation::new(&node.name, &node.args).with_stdin(stdin);
            return Ok(command.execute(state, &inv));
        }

        match self.external.resolver().resolve(&node.name, state.current_dir()) {
            Some(path) => self
                .external
                .run(&path, &node.args, state.current_dir(), stdin),
            None => Ok(format!("Unknown command: {}", node.name)),
        }
    }
}
