use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Embedded default configuration.
const DEFAULT_CONFIG: &str = include_str!("../config.default.toml");

// ── Final (merged) config types ──

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
    /// Aliases defined at start-up: name → expansion.
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
    #[serde(default)]
    pub external: ExternalConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Settings {
    /// Expand `!n`, `!prefix` and `!!` before parsing.
    #[serde(default = "default_true")]
    pub history_expansion: bool,
    /// Prompt template; `{cwd}` is replaced by the current directory.
    #[serde(default = "default_prompt")]
    pub prompt: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            history_expansion: true,
            prompt: default_prompt(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_prompt() -> String {
    "tinsh: {cwd}> ".into()
}

/// How commands that are not built-ins are found and launched.
#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct ExternalConfig {
    /// Suffixes tried after the bare name during PATH search.
    /// Empty means the platform default (see `external::default_suffixes`).
    #[serde(default)]
    pub search_suffixes: Vec<String>,
    /// File extension (without dot) → interpreter command line.
    /// Matching executables are run as `<interpreter...> <file> <args...>`.
    #[serde(default)]
    pub interpreters: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// `off`, `error`, `warn`, `info`, `debug` or `trace`.
    #[serde(default = "default_level")]
    pub level: String,
    /// Log file; defaults to `~/.local/share/tinsh/tinsh.log`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            file: None,
        }
    }
}

fn default_level() -> String {
    "warn".into()
}

// ── Overlay types (user config that merges with defaults) ──

#[derive(Debug, Deserialize, Default)]
struct ConfigOverlay {
    #[serde(default)]
    settings: SettingsOverlay,
    #[serde(default)]
    aliases: AliasesOverlay,
    #[serde(default)]
    external: ExternalOverlay,
    #[serde(default)]
    logging: LoggingOverlay,
}

#[derive(Debug, Deserialize, Default)]
struct SettingsOverlay {
    history_expansion: Option<bool>,
    prompt: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct AliasesOverlay {
    #[serde(default)]
    replace: bool,
    #[serde(default)]
    remove: Vec<String>,
    /// Every other key is an alias definition; `replace` and `remove` are
    /// reserved for the two fields above.
    #[serde(flatten)]
    define: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize, Default)]
struct ExternalOverlay {
    #[serde(default)]
    replace: bool,
    #[serde(default)]
    search_suffixes: Vec<String>,
    #[serde(default)]
    remove_search_suffixes: Vec<String>,
    #[serde(default)]
    interpreters: BTreeMap<String, String>,
    #[serde(default)]
    remove_interpreters: Vec<String>,
}

#[derive(Debug, Deserialize, Default)]
struct LoggingOverlay {
    level: Option<String>,
    file: Option<String>,
}

// ── Merge logic ──

/// Merge a user list into a default list.
/// In replace mode: user list replaces default entirely.
/// In merge mode: remove items first, then extend with additions (deduped).
fn merge_list(base: &mut Vec<String>, add: Vec<String>, remove: &[String], replace: bool) {
    if replace {
        *base = add;
    } else {
        base.retain(|item| !remove.contains(item));
        for item in add {
            if !base.contains(&item) {
                base.push(item);
            }
        }
    }
}

/// Same as [`merge_list`] for keyed tables: additions override existing keys.
fn merge_map(
    base: &mut BTreeMap<String, String>,
    add: BTreeMap<String, String>,
    remove: &[String],
    replace: bool,
) {
    if replace {
        *base = add;
    } else {
        base.retain(|key, _| !remove.contains(key));
        base.extend(add);
    }
}

impl Config {
    /// Load the default embedded configuration.
    pub fn default_config() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("embedded default config must parse")
    }

    /// Load configuration with resolution order:
    /// 1. Start with embedded defaults
    /// 2. Merge user overlay from ~/.config/tinsh/config.toml (if exists)
    ///
    /// Scalars override, lists extend, tables merge by key.
    /// Set `replace = true` in a section to replace its defaults entirely.
    /// Use `remove_<field>` lists (`remove` under `[aliases]`) to subtract defaults.
    pub fn load() -> Self {
        let mut config = Self::default_config();
        if let Some(overlay) = Self::load_overlay() {
            config.apply_overlay(overlay);
        }
        config
    }

    /// Try to load user overlay from ~/.config/tinsh/config.toml.
    fn load_overlay() -> Option<ConfigOverlay> {
        let home = std::env::var_os("HOME")?;
        let path = std::path::Path::new(&home).join(".config/tinsh/config.toml");
        let content = std::fs::read_to_string(path).ok()?;
        match toml::from_str(&content) {
            Ok(overlay) => Some(overlay),
            Err(e) => {
                eprintln!("tinsh: config parse error: {e}");
                None
            }
        }
    }

    /// Apply an overlay on top of this config (merge semantics).
    fn apply_overlay(&mut self, overlay: ConfigOverlay) {
        let s = overlay.settings;
        if let Some(v) = s.history_expansion {
            self.settings.history_expansion = v;
        }
        if let Some(v) = s.prompt {
            self.settings.prompt = v;
        }

        let a = overlay.aliases;
        merge_map(&mut self.aliases, a.define, &a.remove, a.replace);

        let e = overlay.external;
        merge_list(
            &mut self.external.search_suffixes,
            e.search_suffixes,
            &e.remove_search_suffixes,
            e.replace,
        );
        merge_map(
            &mut self.external.interpreters,
            e.interpreters,
            &e.remove_interpreters,
            e.replace,
        );

        let l = overlay.logging;
        if let Some(v) = l.level {
            self.logging.level = v;
        }
        if l.file.is_some() {
            self.logging.file = l.file;
        }
    }

    /// Render the merged configuration as TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Apply an overlay from a TOML string. Used for testing.
    #[cfg(test)]
    fn apply_overlay_str(&mut self, toml_str: &str) {
        let overlay: ConfigOverlay = toml::from_str(toml_str).unwrap();
        self.apply_overlay(overlay);
    }
}
