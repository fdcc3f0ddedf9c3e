use log::debug;

use crate::commands::{Command, Invocation};
use crate::exec::external::PathResolver;
use crate::state::{ShellMode, ShellState};

/// `alias` lists, shows or defines aliases.
///
/// Accepted forms: `alias`, `alias name`, `alias name=expansion...` and
/// `alias name expansion...`.
pub struct AliasBuiltin;

impl Command for AliasBuiltin {
    fn name(&self) -> &str {
        "alias"
    }

    fn execute(&self, state: &mut ShellState, inv: &Invocation) -> String {
        let registry = state.registry();
        let Some(first) = inv.args.first() else {
            return registry
                .aliases()
                .iter()
                .map(|(name, expansion)| format!("{name}={expansion}"))
                .collect::<Vec<_>>()
                .join("\n");
        };

        let (name, expansion) = match first.split_once('=') {
            Some((name, head)) => {
                let mut words = vec![head];
                words.extend(inv.args[1..].iter().map(String::as_str));
                (name, join_words(words.into_iter().filter(|w| !w.is_empty())))
            }
            None if inv.args.len() == 1 => {
                return match registry.alias(first) {
                    Some(expansion) => format!("{first}={expansion}"),
                    None => format!("alias: {first}: not found"),
                };
            }
            None => (
                first.as_str(),
                join_words(inv.args[1..].iter().map(String::as_str)),
            ),
        };

        if name.is_empty() || expansion.is_empty() {
            return "alias: usage: alias name expansion".into();
        }
        registry.add_alias(name, &expansion);
        if registry.is_builtin(name) {
            format!("alias: {name} is a built-in command; the built-in takes precedence")
        } else {
            String::new()
        }
    }
}

/// Build the stored expansion from the words after the alias name.
///
/// A single word is the whole command as the user quoted it and is kept
/// verbatim. Several words are quoted so they re-parse to the same words.
fn join_words<'a>(words: impl Iterator<Item = &'a str>) -> String {
    let words: Vec<&str> = words.collect();
    if let [single] = words.as_slice() {
        return single.to_string();
    }
    shlex::try_join(words.iter().copied()).unwrap_or_else(|e| {
        debug!("alias words not quotable ({e}); storing as typed");
        words.join(" ")
    })
}

pub struct Unalias;

impl Command for Unalias {
    fn name(&self) -> &str {
        "unalias"
    }

    fn execute(&self, state: &mut ShellState, inv: &Invocation) -> String {
        if inv.args.is_empty() {
            return "unalias: missing operand".into();
        }
        let registry = state.registry();
        let missing: Vec<String> = inv
            .args
            .iter()
            .filter(|name| !registry.remove_alias(name))
            .map(|name| format!("unalias: {name}: not found"))
            .collect();
        missing.join("\n")
    }
}

/// `history [n]`: numbered entries, optionally only the last `n`.
pub struct History;

impl Command for History {
    fn name(&self) -> &str {
        "history"
    }

    fn execute(&self, state: &mut ShellState, inv: &Invocation) -> String {
        let total = state.history.len();
        let skip = match inv.args.first() {
            None => 0,
            Some(n) => match n.parse::<usize>() {
                Ok(n) => total.saturating_sub(n),
                Err(_) => return format!("history: numeric argument required: {n}"),
            },
        };
        state
            .history
            .iter()
            .enumerate()
            .skip(skip)
            .map(|(i, entry)| format!("{} {entry}", i + 1))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub struct Help;

impl Command for Help {
    fn name(&self) -> &str {
        "help"
    }

    fn execute(&self, state: &mut ShellState, inv: &Invocation) -> String {
        let registry = state.registry();
        match inv.args.first() {
            None => {
                let mut out = String::from("Available commands:");
                for name in registry.command_names() {
                    out.push('\n');
                    out.push_str(name);
                }
                out
            }
            Some(name) => match registry.description(name) {
                Some(desc) => format!("{name}: {desc}"),
                None => match registry.alias(name) {
                    Some(expansion) => format!("{name}: alias for '{expansion}'"),
                    None => format!("help: no such command: {name}"),
                },
            },
        }
    }
}

/// Reports how each name resolves: built-in, alias, or executable path.
pub struct Which {
    resolver: PathResolver,
}

impl Which {
    pub fn new(resolver: PathResolver) -> Self {
        Self { resolver }
    }
}

impl Command for Which {
    fn name(&self) -> &str {
        "which"
    }

    fn execute(&self, state: &mut ShellState, inv: &Invocation) -> String {
        if inv.args.is_empty() {
            return "which: missing operand".into();
        }
        let registry = state.registry();
        inv.args
            .iter()
            .map(|name| {
                if registry.is_builtin(name) {
                    format!("{name}: shell built-in command")
                } else if let Some(expansion) = registry.alias(name) {
                    format!("{name}: aliased to {expansion}")
                } else if let Some(path) = self.resolver.resolve(name, state.current_dir()) {
                    path.display().to_string()
                } else {
                    format!("which: no such command: {name}")
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// ANSI clear-screen and cursor-home.
pub struct Clear;

impl Command for Clear {
    fn name(&self) -> &str {
        "clear"
    }

    fn execute(&self, _state: &mut ShellState, _inv: &Invocation) -> String {
        "\x1b[2J\x1b[H".into()
    }
}

/// Switches the session into edit mode; see [`crate::edit::EditBuffer`].
pub struct Edit;

impl Command for Edit {
    fn name(&self) -> &str {
        "edit"
    }

    fn execute(&self, state: &mut ShellState, _inv: &Invocation) -> String {
        state.mode = ShellMode::Edit;
        "Entering edit mode. Type :q to leave.".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::registry::CommandRegistry;
    use std::rc::Rc;

    fn state() -> ShellState {
        let registry = CommandRegistry::from_config(&Config::default_config());
        ShellState::with_dir(Rc::new(registry), "/")
    }

    fn run(cmd: &dyn Command, state: &mut ShellState, words: &[&str]) -> String {
        let args: Vec<String> = words.iter().map(|s| s.to_string()).collect();
        cmd.execute(state, &Invocation::new(cmd.name(), &args))
    }

    #[test]
    fn alias_define_and_show() {
        let mut st = state();
        assert_eq!(run(&AliasBuiltin, &mut st, &["greet", "echo", "hello world"]), "");
        assert_eq!(
            run(&AliasBuiltin, &mut st, &["greet"]),
            "greet=echo 'hello world'"
        );
        assert_eq!(run(&AliasBuiltin, &mut st, &["nothing"]), "alias: nothing: not found");
    }

    #[test]
    fn alias_equals_form() {
        let mut st = state();
        run(&AliasBuiltin, &mut st, &["ll=ls", "-l"]);
        assert_eq!(st.registry().alias("ll").as_deref(), Some("ls -l"));
    }

    #[test]
    fn alias_single_quoted_word_kept_as_command() {
        let mut st = state();
        run(&AliasBuiltin, &mut st, &["g=echo hello"]);
        assert_eq!(st.registry().alias("g").as_deref(), Some("echo hello"));
        run(&AliasBuiltin, &mut st, &["h", "echo hello"]);
        assert_eq!(st.registry().alias("h").as_deref(), Some("echo hello"));
    }

    #[test]
    fn alias_list_is_sorted() {
        let mut st = state();
        let out = run(&AliasBuiltin, &mut st, &[]);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines, vec!["cls=clear", "del=rm", "dir=ls", "type=cat"]);
    }

    #[test]
    fn alias_over_builtin_warns() {
        let mut st = state();
        let out = run(&AliasBuiltin, &mut st, &["echo", "cat"]);
        assert!(out.contains("built-in"));
    }

    #[test]
    fn alias_without_expansion() {
        let mut st = state();
        assert_eq!(
            run(&AliasBuiltin, &mut st, &["x="]),
            "alias: usage: alias name expansion"
        );
    }

    #[test]
    fn unalias_removes_and_reports() {
        let mut st = state();
        assert_eq!(run(&Unalias, &mut st, &["dir"]), "");
        assert!(st.registry().alias("dir").is_none());
        assert_eq!(run(&Unalias, &mut st, &["dir"]), "unalias: dir: not found");
        assert_eq!(run(&Unalias, &mut st, &[]), "unalias: missing operand");
    }

    #[test]
    fn history_numbered_from_one() {
        let mut st = state();
        st.history = vec!["echo a".into(), "echo b".into(), "history".into()];
        assert_eq!(run(&History, &mut st, &[]), "1 echo a\n2 echo b\n3 history");
        assert_eq!(run(&History, &mut st, &["2"]), "2 echo b\n3 history");
        assert_eq!(
            run(&History, &mut st, &["x"]),
            "history: numeric argument required: x"
        );
    }

    #[test]
    fn help_lists_and_describes() {
        let mut st = state();
        let out = run(&Help, &mut st, &[]);
        assert!(out.starts_with("Available commands:\n"));
        assert!(out.lines().any(|l| l == "echo"));
        assert_eq!(run(&Help, &mut st, &["pwd"]), "pwd: Print working directory.");
        assert_eq!(run(&Help, &mut st, &["bogus"]), "help: no such command: bogus");
    }

    #[test]
    fn which_builtin_alias_missing() {
        let mut st = state();
        let which = Which::new(PathResolver::new(Vec::new()));
        assert_eq!(run(&which, &mut st, &["cd"]), "cd: shell built-in command");
        assert_eq!(run(&which, &mut st, &["dir"]), "dir: aliased to ls");
        assert_eq!(
            run(&which, &mut st, &["definitely-not-a-command-xyz"]),
            "which: no such command: definitely-not-a-command-xyz"
        );
    }

    #[cfg(unix)]
    #[test]
    fn which_finds_executable_on_path() {
        let mut st = state();
        let which = Which::new(PathResolver::new(Vec::new()));
        assert!(run(&which, &mut st, &["sh"]).ends_with("/sh"));
    }

    #[test]
    fn edit_switches_mode() {
        let mut st = state();
        run(&Edit, &mut st, &[]);
        assert_eq!(st.mode, ShellMode::Edit);
    }

    #[test]
    fn clear_emits_escape() {
        let mut st = state();
        assert_eq!(run(&Clear, &mut st, &[]), "\x1b[2J\x1b[H");
    }
}
