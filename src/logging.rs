use std::path::{Path, PathBuf};

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

use crate::config::LoggingConfig;

/// Install the global logger.
///
/// Records go to the log file (default ~/.local/share/tinsh/tinsh.log) and,
/// with `verbose`, to stderr as well. Best-effort: a file that cannot be
/// opened is skipped, and a second call is a no-op.
pub fn init(config: &LoggingConfig, verbose: bool) {
    let level = parse_level(&config.level);
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_thread_level(LevelFilter::Off)
        .build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    if let Some(file) = log_path(config).and_then(|path| open_log(&path)) {
        loggers.push(WriteLogger::new(level, log_config.clone(), file));
    }
    if verbose {
        loggers.push(TermLogger::new(
            level.max(LevelFilter::Info),
            log_config,
            TerminalMode::Stderr,
            ColorChoice::Auto,
        ));
    }
    if loggers.is_empty() {
        return;
    }
    let _ = CombinedLogger::init(loggers);
}

/// Unknown names fall back to `warn`.
pub fn parse_level(name: &str) -> LevelFilter {
    name.parse().unwrap_or(LevelFilter::Warn)
}

fn log_path(config: &LoggingConfig) -> Option<PathBuf> {
    if let Some(file) = &config.file {
        return Some(PathBuf::from(shellexpand::tilde(file).into_owned()));
    }
    let home = std::env::var_os("HOME")?;
    Some(PathBuf::from(home).join(".local/share/tinsh/tinsh.log"))
}

fn open_log(path: &Path) -> Option<std::fs::File> {
    if let Some(dir) = path.parent() {
        let _ = std::fs::create_dir_all(dir);
    }
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_names() {
        assert_eq!(parse_level("debug"), LevelFilter::Debug);
        assert_eq!(parse_level("OFF"), LevelFilter::Off);
        assert_eq!(parse_level("loud"), LevelFilter::Warn);
    }

    #[test]
    fn configured_file_wins() {
        let config = LoggingConfig {
            level: "info".into(),
            file: Some("/tmp/tinsh-test.log".into()),
        };
        assert_eq!(log_path(&config), Some(PathBuf::from("/tmp/tinsh-test.log")));
    }

    #[test]
    fn open_log_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/tinsh.log");
        assert!(open_log(&path).is_some());
        assert!(path.exists());
    }
}
