use std::fs::{self, Metadata};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::commands::{Command, Invocation};
use crate::state::ShellState;

/// `ls [-a] [-l] [dir]`: sorted entries, dotfiles hidden without `-a`.
///
/// Entries are decorated `/` (directory), `@` (symlink) or `*` (executable).
pub struct Ls;

impl Command for Ls {
    fn name(&self) -> &str {
        "ls"
    }

    fn execute(&self, state: &mut ShellState, inv: &Invocation) -> String {
        let show_all = inv.has_option('a');
        let long = inv.has_option('l');
        let dir = match inv.operands().next() {
            Some(d) => state.resolve_path(d),
            None => state.current_dir().to_path_buf(),
        };

        let read = match fs::read_dir(&dir) {
            Ok(r) => r,
            Err(e) => return format!("ls: cannot access {}: {e}", dir.display()),
        };

        let mut entries: Vec<(String, Metadata)> = read
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().into_owned();
                let meta = fs::symlink_metadata(entry.path()).ok()?;
                Some((name, meta))
            })
            .filter(|(name, _)| show_all || !name.starts_with('.'))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        let lines: Vec<String> = entries
            .iter()
            .map(|(name, meta)| {
                let shown = decorate(&dir.join(name), name, meta);
                if long {
                    let size = if meta.is_dir() {
                        "-".to_string()
                    } else {
                        meta.len().to_string()
                    };
                    let stamp = meta.modified().map(format_time).unwrap_or_default();
                    format!("{} {size:>8} {stamp} {shown}", mode_string(meta))
                } else {
                    shown
                }
            })
            .collect();
        lines.join("\n")
    }
}

fn decorate(path: &Path, name: &str, meta: &Metadata) -> String {
    if meta.is_symlink() {
        format!("{name}@")
    } else if meta.is_dir() {
        format!("{name}/")
    } else if is_executable(path, meta) {
        format!("{name}*")
    } else {
        name.to_string()
    }
}

#[cfg(unix)]
fn is_executable(_path: &Path, meta: &Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(path: &Path, _meta: &Metadata) -> bool {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase());
    matches!(ext.as_deref(), Some("exe" | "bat" | "cmd" | "com"))
}

#[cfg(unix)]
fn mode_string(meta: &Metadata) -> String {
    use std::os::unix::fs::PermissionsExt;
    let mode = meta.permissions().mode();
    let kind = if meta.is_symlink() {
        'l'
    } else if meta.is_dir() {
        'd'
    } else {
        '-'
    };
    let mut s = String::with_capacity(10);
    s.push(kind);
    for shift in [6, 3, 0] {
        let bits = (mode >> shift) & 0o7;
        s.push(if bits & 0o4 != 0 { 'r' } else { '-' });
        s.push(if bits & 0o2 != 0 { 'w' } else { '-' });
        s.push(if bits & 0o1 != 0 { 'x' } else { '-' });
    }
    s
}

#[cfg(not(unix))]
fn mode_string(meta: &Metadata) -> String {
    match (meta.is_dir(), meta.permissions().readonly()) {
        (true, _) => "drwxr-xr-x".into(),
        (false, true) => "-r--r--r--".into(),
        (false, false) => "-rw-r--r--".into(),
    }
}

/// `YYYY-MM-DD HH:MM` in UTC.
fn format_time(time: SystemTime) -> String {
    let secs = time
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let days = secs / 86400;
    let rem = secs % 86400;
    let (year, month, day) = epoch_days_to_date(days);
    format!("{year:04}-{month:02}-{day:02} {:02}:{:02}", rem / 3600, (rem % 3600) / 60)
}

/// Convert days since Unix epoch to (year, month, day).
fn epoch_days_to_date(days: u64) -> (u64, u64, u64) {
    // Civil calendar from days algorithm (Howard Hinnant)
    let z = days + 719468;
    let era = z / 146097;
    let doe = z - era * 146097;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    let y = if m <= 2 { y + 1 } else { y };
    (y, m, d)
}

/// Creates missing files; bumps the modification time of existing ones.
pub struct Touch;

impl Command for Touch {
    fn name(&self) -> &str {
        "touch"
    }

    fn execute(&self, state: &mut ShellState, inv: &Invocation) -> String {
        let files: Vec<&String> = inv.operands().collect();
        if files.is_empty() {
            return "touch: missing operand".into();
        }
        for file in files {
            let path = state.resolve_path(file);
            let result = fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .and_then(|f| f.set_modified(SystemTime::now()));
            if let Err(e) = result {
                return format!("touch: error: {e}");
            }
        }
        String::new()
    }
}

/// Creates directories, including missing parents.
pub struct Mkdir;

impl Command for Mkdir {
    fn name(&self) -> &str {
        "mkdir"
    }

    fn execute(&self, state: &mut ShellState, inv: &Invocation) -> String {
        let dirs: Vec<&String> = inv.operands().collect();
        if dirs.is_empty() {
            return "mkdir: missing operand".into();
        }
        for dir in dirs {
            if let Err(e) = fs::create_dir_all(state.resolve_path(dir)) {
                return format!("mkdir: error: {e}");
            }
        }
        String::new()
    }
}

/// Removes regular files. Directories are refused.
pub struct Rm;

impl Command for Rm {
    fn name(&self) -> &str {
        "rm"
    }

    fn execute(&self, state: &mut ShellState, inv: &Invocation) -> String {
        let files: Vec<&String> = inv.operands().collect();
        if files.is_empty() {
            return "rm: missing operand".into();
        }
        for file in files {
            let path = state.resolve_path(file);
            if path.is_dir() {
                return format!("rm: is a directory: {file}");
            }
            if !path.exists() {
                return format!("rm: no such file: {file}");
            }
            if let Err(e) = fs::remove_file(&path) {
                return format!("rm: error: {e}");
            }
        }
        String::new()
    }
}

/// Removes empty directories.
pub struct Rmdir;

impl Command for Rmdir {
    fn name(&self) -> &str {
        "rmdir"
    }

    fn execute(&self, state: &mut ShellState, inv: &Invocation) -> String {
        let dirs: Vec<&String> = inv.operands().collect();
        if dirs.is_empty() {
            return "rmdir: missing operand".into();
        }
        for dir in dirs {
            let path = state.resolve_path(dir);
            if !path.is_dir() {
                return format!("rmdir: no such directory: {dir}");
            }
            if let Err(e) = fs::remove_dir(&path) {
                return format!("rmdir: error: {e}");
            }
        }
        String::new()
    }
}
