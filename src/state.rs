//! Per-session mutable shell state.

use std::path::{Component, Path, PathBuf};
use std::rc::Rc;

use crate::registry::CommandRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShellMode {
    #[default]
    Normal,
    /// Lines go to the edit buffer instead of the interpreter.
    Edit,
}

/// State shared by every command of one session.
///
/// Directories are stored normalized (see [`normalize_path`]) and are
/// independent of the process working directory.
pub struct ShellState {
    current_dir: PathBuf,
    previous_dir: PathBuf,
    pub mode: ShellMode,
    /// Executed lines, oldest first. Append-only.
    pub history: Vec<String>,
    registry: Rc<CommandRegistry>,
}

impl ShellState {
    /// State rooted at the process working directory.
    pub fn new(registry: Rc<CommandRegistry>) -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::with_dir(registry, cwd)
    }

    pub fn with_dir(registry: Rc<CommandRegistry>, dir: impl AsRef<Path>) -> Self {
        let dir = normalize_path(dir.as_ref());
        Self {
            previous_dir: dir.clone(),
            current_dir: dir,
            mode: ShellMode::Normal,
            history: Vec::new(),
            registry,
        }
    }

    pub fn current_dir(&self) -> &Path {
        &self.current_dir
    }

    pub fn previous_dir(&self) -> &Path {
        &self.previous_dir
    }

    pub fn set_current_dir(&mut self, dir: impl AsRef<Path>) {
        self.current_dir = normalize_path(dir.as_ref());
    }

    pub fn set_previous_dir(&mut self, dir: impl AsRef<Path>) {
        self.previous_dir = normalize_path(dir.as_ref());
    }

    /// Move to `dir`, remembering the old directory for `cd -`.
    pub fn change_dir(&mut self, dir: impl AsRef<Path>) {
        let old = std::mem::replace(&mut self.current_dir, normalize_path(dir.as_ref()));
        self.previous_dir = old;
    }

    /// Shared handle to the command registry.
    pub fn registry(&self) -> Rc<CommandRegistry> {
        Rc::clone(&self.registry)
    }

    /// Resolve a user-supplied path: `~` is expanded, relative paths are
    /// joined to the current directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        let expanded = shellexpand::tilde(path);
        let path = Path::new(&*expanded);
        if path.is_absolute() {
            normalize_path(path)
        } else {
            normalize_path(&self.current_dir.join(path))
        }
    }
}

/// Lexically normalize a path: drop `.`, fold `name/..`, collapse repeated
/// separators and rebuild with the platform separator.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if out.file_name().is_some() {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}
