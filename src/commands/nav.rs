use crate::commands::{Command, Invocation};
use crate::state::ShellState;

pub struct Pwd;

impl Command for Pwd {
    fn name(&self) -> &str {
        "pwd"
    }

    fn execute(&self, state: &mut ShellState, _inv: &Invocation) -> String {
        state.current_dir().display().to_string()
    }
}

/// `cd` (home), `cd -` (previous directory), `cd <path>`.
///
/// Only the session's directory changes; the process working directory is left alone.
pub struct Cd;

impl Command for Cd {
    fn name(&self) -> &str {
        "cd"
    }

    fn execute(&self, state: &mut ShellState, inv: &Invocation) -> String {
        let arg = inv.args.first().map(String::as_str);
        let target = match arg {
            None => state.resolve_path("~"),
            Some("-") => state.previous_dir().to_path_buf(),
            Some(path) => state.resolve_path(path),
        };

        if !target.is_dir() {
            let shown = arg.unwrap_or("~");
            return format!("cd: no such file or directory: {shown}");
        }
        state.change_dir(target);
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::CommandRegistry;
    use std::rc::Rc;

    fn cd(state: &mut ShellState, arg: &str) -> String {
        let a = vec![arg.to_string()];
        Cd.execute(state, &Invocation::new("cd", &a))
    }

    #[test]
    fn cd_into_subdirectory_and_back() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        let mut state = ShellState::with_dir(Rc::new(CommandRegistry::new()), dir.path());
        let root = state.current_dir().to_path_buf();

        assert_eq!(cd(&mut state, "sub"), "");
        assert_eq!(state.current_dir(), root.join("sub"));

        assert_eq!(cd(&mut state, "-"), "");
        assert_eq!(state.current_dir(), root);
        assert_eq!(state.previous_dir(), root.join("sub"));

        cd(&mut state, "sub/..");
        assert_eq!(state.current_dir(), root);
    }

    #[test]
    fn cd_missing_directory_leaves_state() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = ShellState::with_dir(Rc::new(CommandRegistry::new()), dir.path());
        let before = state.current_dir().to_path_buf();
        assert_eq!(cd(&mut state, "nope"), "cd: no such file or directory: nope");
        assert_eq!(state.current_dir(), before);
    }

    #[test]
    fn pwd_prints_current_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = ShellState::with_dir(Rc::new(CommandRegistry::new()), dir.path());
        let out = Pwd.execute(&mut state, &Invocation::new("pwd", &[]));
        assert_eq!(out, state.current_dir().display().to_string());
    }
}
