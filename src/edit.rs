//! Line buffer used while the session is in edit mode.

use crate::state::{ShellMode, ShellState};

/// Lines collected in edit mode, plus the `:` commands that act on them.
#[derive(Debug, Default)]
pub struct EditBuffer {
    lines: Vec<String>,
}

impl EditBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Handle one line typed in edit mode.
    pub fn handle(&mut self, state: &mut ShellState, line: &str) -> String {
        let (cmd, arg) = match line.trim().split_once(char::is_whitespace) {
            Some((cmd, arg)) => (cmd, arg.trim()),
            None => (line.trim(), ""),
        };
        match cmd {
            ":q" | ":quit" => {
                state.mode = ShellMode::Normal;
                "Leaving edit mode.".into()
            }
            ":p" | ":print" => self
                .lines
                .iter()
                .enumerate()
                .map(|(i, l)| format!("{} {l}", i + 1))
                .collect::<Vec<_>>()
                .join("\n"),
            ":clear" => {
                self.lines.clear();
                String::new()
            }
            ":w" | ":write" => {
                if arg.is_empty() {
                    return "edit: missing file name".into();
                }
                let path = state.resolve_path(arg);
                let mut text = self.lines.join("\n");
                text.push('\n');
                match std::fs::write(&path, text) {
                    Ok(()) => format!("Wrote {} lines to {arg}", self.lines.len()),
                    Err(e) => format!("edit: error: {e}"),
                }
            }
            _ => {
                self.lines.push(line.to_string());
                String::new()
            }
        }
    }
}
