//! Fallback for names that are not built-ins: find an executable and run it
//! to completion, capturing its output.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use log::{debug, info, warn};

use crate::config::ExternalConfig;
use crate::error::ShellError;

/// Executable suffixes tried after the bare name when none are configured.
pub fn default_suffixes() -> Vec<String> {
    if cfg!(windows) {
        [".exe", ".cmd", ".bat", ".com"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    } else {
        Vec::new()
    }
}

/// Finds executables by path or by `PATH` search.
#[derive(Debug, Clone)]
pub struct PathResolver {
    suffixes: Vec<String>,
    /// Lowercase extensions that have an interpreter.
    script_extensions: Vec<String>,
}

impl PathResolver {
    /// An empty suffix list means the platform default.
    pub fn new(suffixes: Vec<String>) -> Self {
        let suffixes = if suffixes.is_empty() {
            default_suffixes()
        } else {
            suffixes
        };
        Self {
            suffixes,
            script_extensions: Vec::new(),
        }
    }

    pub fn from_config(config: &ExternalConfig) -> Self {
        let mut resolver = Self::new(config.search_suffixes.clone());
        resolver.script_extensions = config
            .interpreters
            .keys()
            .map(|ext| ext.to_ascii_lowercase())
            .collect();
        resolver
    }

    /// Locate `name`. Names containing a separator are taken relative to
    /// `cwd`; bare names are searched in each `PATH` directory in order.
    ///
    /// A path to a script with a configured interpreter resolves as long as
    /// the file exists; everything else must be executable.
    pub fn resolve(&self, name: &str, cwd: &Path) -> Option<PathBuf> {
        if name.is_empty() {
            return None;
        }
        if name.contains('/') || name.contains(std::path::MAIN_SEPARATOR) {
            let expanded = shellexpand::tilde(name);
            let base = cwd.join(&*expanded);
            return self
                .first_match(&base)
                .or_else(|| self.is_script(&base).then_some(base));
        }

        let path_var = std::env::var_os("PATH")?;
        std::env::split_paths(&path_var).find_map(|dir| self.first_match(&dir.join(name)))
    }

    fn is_script(&self, path: &Path) -> bool {
        let has_interpreter = path.extension().is_some_and(|ext| {
            let ext = ext.to_string_lossy().to_ascii_lowercase();
            self.script_extensions.contains(&ext)
        });
        has_interpreter && path.is_file()
    }

    fn first_match(&self, base: &Path) -> Option<PathBuf> {
        if is_executable(base) {
            return Some(base.to_path_buf());
        }
        self.suffixes.iter().find_map(|suffix| {
            let mut candidate = OsString::from(base.as_os_str());
            candidate.push(suffix);
            let candidate = PathBuf::from(candidate);
            is_executable(&candidate).then_some(candidate)
        })
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Launches resolved executables, dispatching script extensions through
/// their configured interpreter.
#[derive(Debug, Clone)]
pub struct ExternalRunner {
    resolver: PathResolver,
    interpreters: BTreeMap<String, String>,
}

impl ExternalRunner {
    pub fn from_config(config: &ExternalConfig) -> Self {
        Self {
            resolver: PathResolver::from_config(config),
            interpreters: config
                .interpreters
                .iter()
                .map(|(ext, cmd)| (ext.to_ascii_lowercase(), cmd.clone()))
                .collect(),
        }
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// Program and argument list for running `path` with `args`.
    ///
    /// Files whose extension has an interpreter run as
    /// `<interpreter words...> <path> <args...>`.
    pub fn command_line(&self, path: &Path, args: &[String]) -> (OsString, Vec<OsString>) {
        let interpreter = path
            .extension()
            .and_then(|ext| self.interpreters.get(&ext.to_string_lossy().to_ascii_lowercase()));

        if let Some(line) = interpreter {
            match shlex::split(line) {
                Some(words) if !words.is_empty() => {
                    let mut words = words.into_iter().map(OsString::from);
                    if let Some(program) = words.next() {
                        let mut argv: Vec<OsString> = words.collect();
                        argv.push(path.as_os_str().to_owned());
                        argv.extend(args.iter().map(OsString::from));
                        return (program, argv);
                    }
                }
                _ => warn!("ignoring unparsable interpreter for {}: {line}", path.display()),
            }
        }
        (
            path.as_os_str().to_owned(),
            args.iter().map(OsString::from).collect(),
        )
    }

    /// Run `path` in `cwd` and wait for it.
    ///
    /// `stdin`, when given, is written to the child and then closed.
    /// Trailing newlines are trimmed; stdout wins over stderr when both
    /// have text.
    pub fn run(
        &self,
        path: &Path,
        args: &[String],
        cwd: &Path,
        stdin: Option<&str>,
    ) -> Result<String, ShellError> {
        let (program, argv) = self.command_line(path, args);
        info!("exec: {}", render_command_line(&program, &argv));

        let mut child = Command::new(&program)
            .args(&argv)
            .current_dir(cwd)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ShellError::Spawn {
                path: path.to_path_buf(),
                source,
            })?;

        let pipe = child.stdin.take();
        let output = std::thread::scope(|scope| {
            if let (Some(mut pipe), Some(data)) = (pipe, stdin) {
                scope.spawn(move || {
                    if let Err(e) = pipe.write_all(data.as_bytes())
                        && e.kind() != ErrorKind::BrokenPipe
                    {
                        debug!("writing child stdin: {e}");
                    }
                });
            }
            child.wait_with_output()
        })
        .map_err(|e| ShellError::io(format!("waiting for {}", path.display()), e))?;

        debug!("exit: {}", output.status);
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stdout = stdout.trim_end_matches(['\r', '\n']);
        if !stdout.is_empty() {
            return Ok(stdout.to_string());
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        Ok(stderr.trim_end_matches(['\r', '\n']).to_string())
    }
}

/// Quoted rendering of a command line for logs.
fn render_command_line(program: &OsString, argv: &[OsString]) -> String {
    let words: Vec<String> = std::iter::once(program)
        .chain(argv)
        .map(|w| w.to_string_lossy().into_owned())
        .collect();
    shlex::try_join(words.iter().map(String::as_str)).unwrap_or_else(|_| words.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner() -> ExternalRunner {
        ExternalRunner::from_config(&ExternalConfig {
            search_suffixes: Vec::new(),
            interpreters: BTreeMap::from([("sh".to_string(), "sh".to_string())]),
        })
    }

    #[test]
    fn empty_suffix_list_uses_platform_default() {
        let resolver = PathResolver::new(Vec::new());
        assert_eq!(resolver.suffixes, default_suffixes());
    }

    #[test]
    fn configured_suffixes_kept() {
        let resolver = PathResolver::new(vec![".run".into()]);
        assert_eq!(resolver.suffixes, vec![".run"]);
    }

    #[test]
    fn unknown_name_not_found() {
        let resolver = PathResolver::new(Vec::new());
        assert!(resolver.resolve("no-such-program-tinsh", Path::new("/")).is_none());
        assert!(resolver.resolve("", Path::new("/")).is_none());
    }

    #[test]
    fn interpreter_prefixes_script() {
        let r = ExternalRunner::from_config(&ExternalConfig {
            search_suffixes: Vec::new(),
            interpreters: BTreeMap::from([(
                "PS1".to_string(),
                "powershell -NoProfile -File".to_string(),
            )]),
        });
        let (program, argv) = r.command_line(Path::new("run.ps1"), &["a b".to_string()]);
        assert_eq!(program, "powershell");
        assert_eq!(argv, vec!["-NoProfile", "-File", "run.ps1", "a b"]);
    }

    #[test]
    fn no_interpreter_runs_directly() {
        let (program, argv) = runner().command_line(Path::new("/bin/tool"), &["x".to_string()]);
        assert_eq!(program, "/bin/tool");
        assert_eq!(argv, vec!["x"]);
    }

    #[test]
    fn command_line_rendering_quotes_spaces() {
        let program = OsString::from("echo");
        let argv = vec![OsString::from("a b"), OsString::from("c")];
        assert_eq!(render_command_line(&program, &argv), "echo 'a b' c");
    }

    #[cfg(unix)]
    mod unix {
        use super::*;
        use std::os::unix::fs::PermissionsExt;

        fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
            let path = dir.join(name);
            std::fs::write(&path, body).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        #[test]
        fn resolves_sh_on_path() {
            let resolver = PathResolver::new(Vec::new());
            let sh = resolver.resolve("sh", Path::new("/")).unwrap();
            assert!(sh.ends_with("sh"));
        }

        #[test]
        fn relative_path_needs_exec_bit() {
            let dir = tempfile::tempdir().unwrap();
            std::fs::write(dir.path().join("plain"), "").unwrap();
            script(dir.path(), "tool", "#!/bin/sh\n");
            let resolver = PathResolver::new(Vec::new());
            assert!(resolver.resolve("./plain", dir.path()).is_none());
            assert_eq!(
                resolver.resolve("./tool", dir.path()),
                Some(dir.path().join("./tool"))
            );
        }

        #[test]
        fn script_path_resolves_without_exec_bit() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("greet.sh");
            std::fs::write(&path, "echo hi").unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();
            std::fs::write(dir.path().join("notes.txt"), "").unwrap();

            let resolver = runner().resolver().clone();
            assert_eq!(
                resolver.resolve("./greet.sh", dir.path()),
                Some(dir.path().join("greet.sh"))
            );
            assert!(resolver.resolve("./notes.txt", dir.path()).is_none());
            // Without an interpreter for `.sh` the exec bit is required.
            assert!(PathResolver::new(Vec::new()).resolve("./greet.sh", dir.path()).is_none());
        }

        #[test]
        fn captures_stdout_trimmed() {
            let sh = runner().resolver().resolve("sh", Path::new("/")).unwrap();
            let out = runner()
                .run(&sh, &["-c".into(), "echo hi; echo".into()], Path::new("/"), None)
                .unwrap();
            assert_eq!(out, "hi");
        }

        #[test]
        fn stderr_when_stdout_empty() {
            let sh = runner().resolver().resolve("sh", Path::new("/")).unwrap();
            let out = runner()
                .run(&sh, &["-c".into(), "echo oops >&2".into()], Path::new("/"), None)
                .unwrap();
            assert_eq!(out, "oops");
        }

        #[test]
        fn feeds_stdin() {
            let sh = runner().resolver().resolve("sh", Path::new("/")).unwrap();
            let out = runner()
                .run(&sh, &["-c".into(), "cat".into()], Path::new("/"), Some("piped\n"))
                .unwrap();
            assert_eq!(out, "piped");
        }

        #[test]
        fn runs_in_given_directory() {
            let dir = tempfile::tempdir().unwrap();
            let sh = runner().resolver().resolve("sh", Path::new("/")).unwrap();
            let out = runner()
                .run(&sh, &["-c".into(), "pwd".into()], dir.path(), None)
                .unwrap();
            let expected = dir.path().canonicalize().unwrap();
            assert_eq!(Path::new(&out).canonicalize().unwrap(), expected);
        }

        #[test]
        fn script_dispatched_through_interpreter() {
            let dir = tempfile::tempdir().unwrap();
            // No shebang: only works when run through `sh`.
            let path = script(dir.path(), "greet.sh", "echo from script $1");
            let out = runner().run(&path, &["x".into()], dir.path(), None).unwrap();
            assert_eq!(out, "from script x");
        }
    }
}
