//! Name → command resolution: built-ins first, then user aliases.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use log::debug;

use crate::commands::{Command, Invocation};
use crate::config::Config;
use crate::error::ShellError;
use crate::parse;
use crate::state::ShellState;

struct Registered {
    command: Rc<dyn Command>,
    description: String,
}

/// Registry of built-in commands keyed by name, plus the alias table.
///
/// Built-ins are registered before the registry is shared and never change
/// afterwards. Aliases live behind a `RefCell` so the `alias` built-in can
/// edit them through the shared handle.
#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<String, Registered>,
    aliases: RefCell<BTreeMap<String, String>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the registry with every built-in and the configured aliases.
    pub fn from_config(config: &Config) -> Self {
        use crate::commands::{fs::*, nav::*, session::*, text::*};
        use crate::exec::external::PathResolver;

        let mut registry = Self::new();
        registry.register(Help, "Show help for commands.");
        registry.register(Clear, "Clear the screen.");
        registry.register(Edit, "Enter line edit mode.");
        registry.register(Cd, "Change directory.");
        registry.register(Ls, "List directory contents.");
        registry.register(Pwd, "Print working directory.");
        registry.register(Echo, "Print arguments.");
        registry.register(Cat, "Print file contents.");
        registry.register(Touch, "Create a file or update its modification time.");
        registry.register(Rm, "Remove files.");
        registry.register(Mkdir, "Create directories.");
        registry.register(Rmdir, "Remove empty directories.");
        registry.register(
            Which::new(PathResolver::from_config(&config.external)),
            "Show how a command name resolves.",
        );
        registry.register(AliasBuiltin, "List or define aliases.");
        registry.register(Unalias, "Remove aliases.");
        registry.register(History, "Show command history.");

        for (name, expansion) in &config.aliases {
            registry.add_alias(name, expansion);
        }
        registry
    }

    /// Register a built-in under its own name, replacing any previous entry.
    pub fn register(&mut self, command: impl Command + 'static, description: &str) {
        let name = command.name().to_string();
        self.commands.insert(
            name,
            Registered {
                command: Rc::new(command),
                description: description.to_string(),
            },
        );
    }

    /// Look up a built-in only, ignoring aliases.
    pub fn builtin(&self, name: &str) -> Option<Rc<dyn Command>> {
        self.commands.get(name).map(|r| Rc::clone(&r.command))
    }

    pub fn is_builtin(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Resolve a name to a runnable command.
    ///
    /// Built-ins shadow aliases of the same name. An alias resolves to a
    /// handler that expands it at call time.
    pub fn resolve(&self, name: &str) -> Option<Rc<dyn Command>> {
        if let Some(command) = self.builtin(name) {
            return Some(command);
        }
        self.alias(name).map(|expansion| {
            Rc::new(AliasCommand {
                name: name.to_string(),
                expansion,
            }) as Rc<dyn Command>
        })
    }

    pub fn description(&self, name: &str) -> Option<&str> {
        self.commands.get(name).map(|r| r.description.as_str())
    }

    /// Built-in names, sorted.
    pub fn command_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.commands.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn alias(&self, name: &str) -> Option<String> {
        self.aliases.borrow().get(name).cloned()
    }

    /// All aliases, sorted by name.
    pub fn aliases(&self) -> Vec<(String, String)> {
        self.aliases
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn add_alias(&self, name: &str, expansion: &str) {
        debug!("alias {name} -> {expansion}");
        self.aliases
            .borrow_mut()
            .insert(name.to_string(), expansion.to_string());
    }

    /// Returns whether the alias existed.
    pub fn remove_alias(&self, name: &str) -> bool {
        self.aliases.borrow_mut().remove(name).is_some()
    }

    /// Expand alias `name` called with `args` down to a built-in.
    ///
    /// Each expansion step parses the alias text, takes its first word as the
    /// next target and prepends its remaining words to the arguments. Targets
    /// may themselves be aliases; revisiting a name is reported as a cycle.
    pub fn expand_alias(
        &self,
        name: &str,
        args: &[String],
    ) -> Result<(String, Rc<dyn Command>, Vec<String>), ShellError> {
        let mut chain = vec![name.to_string()];
        let mut expansion = self
            .alias(name)
            .ok_or_else(|| ShellError::AliasTarget(name.to_string()))?;
        let mut args = args.to_vec();

        loop {
            let parsed = parse::parse(&expansion);
            let mut merged = parsed.args;
            merged.append(&mut args);
            args = merged;

            let target = parsed.command;
            if let Some(command) = self.builtin(&target) {
                return Ok((target, command, args));
            }
            if chain.contains(&target) {
                chain.push(target);
                return Err(ShellError::AliasCycle(chain.join(" -> ")));
            }
            match self.alias(&target) {
                Some(next) => {
                    chain.push(target);
                    expansion = next;
                }
                None => return Err(ShellError::AliasTarget(target)),
            }
        }
    }
}

/// Handler produced by [`CommandRegistry::resolve`] for an alias name.
pub struct AliasCommand {
    name: String,
    expansion: String,
}

impl AliasCommand {
    pub fn expansion(&self) -> &str {
        &self.expansion
    }
}

impl Command for AliasCommand {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, state: &mut ShellState, inv: &Invocation) -> String {
        let registry = state.registry();
        match registry.expand_alias(&self.name, inv.args) {
            Ok((target, command, args)) => {
                let call = Invocation::new(&target, &args).with_stdin(inv.stdin);
                command.execute(state, &call)
            }
            Err(e) => e.render(),
        }
    }
}
