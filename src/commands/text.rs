use std::io::ErrorKind;

use crate::commands::{Command, Invocation};
use crate::state::ShellState;

/// Joins its arguments with single spaces. Ignores piped input.
pub struct Echo;

impl Command for Echo {
    fn name(&self) -> &str {
        "echo"
    }

    fn execute(&self, _state: &mut ShellState, inv: &Invocation) -> String {
        inv.args.join(" ")
    }
}

/// Prints files in order; with no operands, prints its input.
pub struct Cat;

impl Command for Cat {
    fn name(&self) -> &str {
        "cat"
    }

    fn execute(&self, state: &mut ShellState, inv: &Invocation) -> String {
        let files: Vec<&String> = inv.operands().collect();
        if files.is_empty() {
            return match inv.stdin {
                Some(input) => input.to_string(),
                None => "cat: missing operand".into(),
            };
        }

        let mut out = String::new();
        for file in files {
            let path = state.resolve_path(file);
            match std::fs::read_to_string(&path) {
                Ok(text) => out.push_str(&text),
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    return format!("cat: no such file: {file}");
                }
                Err(e) if path.is_dir() => {
                    log::debug!("cat {}: {e}", path.display());
                    return format!("cat: is a directory: {file}");
                }
                Err(e) => return format!("cat: error reading file: {e}"),
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::CommandRegistry;
    use std::rc::Rc;

    fn state(dir: &std::path::Path) -> ShellState {
        ShellState::with_dir(Rc::new(CommandRegistry::new()), dir)
    }

    fn args(words: &[&str]) -> Vec<String> {
        words.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn echo_joins_with_spaces() {
        let mut st = state(std::path::Path::new("/"));
        let a = args(&["a b", "c"]);
        assert_eq!(Echo.execute(&mut st, &Invocation::new("echo", &a)), "a b c");
    }

    #[test]
    fn echo_no_args_is_empty() {
        let mut st = state(std::path::Path::new("/"));
        let inv = Invocation::new("echo", &[]).with_stdin(Some("piped"));
        assert_eq!(Echo.execute(&mut st, &inv), "");
    }

    #[test]
    fn cat_reads_relative_to_current_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "alpha").unwrap();
        std::fs::write(dir.path().join("b.txt"), "beta").unwrap();
        let mut st = state(dir.path());
        let a = args(&["a.txt", "b.txt"]);
        assert_eq!(Cat.execute(&mut st, &Invocation::new("cat", &a)), "alphabeta");
    }

    #[test]
    fn cat_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut st = state(dir.path());
        let a = args(&["nope.txt"]);
        assert_eq!(
            Cat.execute(&mut st, &Invocation::new("cat", &a)),
            "cat: no such file: nope.txt"
        );
    }

    #[test]
    fn cat_prefers_operands_over_input() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("f"), "file").unwrap();
        let mut st = state(dir.path());
        let a = args(&["f"]);
        let inv = Invocation::new("cat", &a).with_stdin(Some("input"));
        assert_eq!(Cat.execute(&mut st, &inv), "file");
    }

    #[test]
    fn cat_echoes_input() {
        let mut st = state(std::path::Path::new("/"));
        let inv = Invocation::new("cat", &[]).with_stdin(Some("piped"));
        assert_eq!(Cat.execute(&mut st, &inv), "piped");
    }

    #[test]
    fn cat_without_anything() {
        let mut st = state(std::path::Path::new("/"));
        assert_eq!(
            Cat.execute(&mut st, &Invocation::new("cat", &[])),
            "cat: missing operand"
        );
    }
}
