//! Configuration management for monitfiles
//!
//! `WatchConfig` is built once from validated inputs and then shared
//! read-only by discovery and every watch unit. `FileSettings` is the
//! optional TOML file whose values fill in flags not given on the command
//! line.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use serde::Deserialize;
use crate::error::ConfigError;

pub const DEFAULT_PATH: &str = ".";
pub const DEFAULT_FILE_TYPES: &str = "htm html css js";
pub const DEFAULT_MAX_FILES: usize = 200;
pub const DEFAULT_INTERVAL_SECS: u64 = 2;

/// What to do when a change is detected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Command line handed unmodified to the platform shell
    Command(String),
    /// URL handed unmodified to the platform opener
    Url(String),
}

impl Action {
    /// The raw configured string
    pub fn as_str(&self) -> &str {
        match self {
            Action::Command(s) | Action::Url(s) => s,
        }
    }

    pub fn is_url(&self) -> bool {
        matches!(self, Action::Url(_))
    }
}

/// Immutable configuration shared by all watch units
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Absolute root of the walk
    pub root: PathBuf,
    /// Allowed extensions, lower-cased and sorted
    pub file_types: Vec<String>,
    /// Files watched in addition to the walk
    pub file_names: Vec<PathBuf>,
    /// Admit files without an extension
    pub include_no_extension: bool,
    /// Skip directories whose name starts with a dot
    pub exclude_dot_dirs: bool,
    pub max_files: usize,
    pub interval: Duration,
    /// Wait for the action to finish before polling again
    pub blocking: bool,
    pub action: Action,
    pub verbose: bool,
}

impl WatchConfig {
    /// Config with the built-in defaults for everything but root, types and action.
    pub fn new(root: PathBuf, file_types: Vec<String>, action: Action) -> Self {
        Self {
            root,
            file_types,
            file_names: Vec::new(),
            include_no_extension: false,
            exclude_dot_dirs: true,
            max_files: DEFAULT_MAX_FILES,
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
            blocking: false,
            action,
            verbose: false,
        }
    }

    /// Validate values that cannot be checked by the individual helpers
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.file_types.is_empty() {
            return Err(ConfigError::EmptyFileTypes);
        }
        if self.action.as_str().is_empty() {
            return Err(ConfigError::EmptyScript);
        }
        if self.interval.is_zero() {
            return Err(ConfigError::InvalidInterval);
        }
        if self.max_files == 0 {
            return Err(ConfigError::InvalidMaxFiles);
        }
        Ok(())
    }
}

impl fmt::Display for WatchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.file_names.iter().map(|p| p.display().to_string()).collect();
        writeln!(f, "Root path: {}", self.root.display())?;
        writeln!(f, "File types: [{}]", self.file_types.join(" "))?;
        writeln!(f, "File names: [{}]", names.join(" "))?;
        writeln!(f, "File types with no extension ? {}", self.include_no_extension)?;
        writeln!(f, "Exclude dot dirs ? {}", self.exclude_dot_dirs)?;
        writeln!(f, "Max number of files: {}", self.max_files)?;
        writeln!(f, "Blocking ? {}", self.blocking)?;
        writeln!(f, "Verbose ? {}", self.verbose)?;
        writeln!(f, "Interval: {} seconds", self.interval.as_secs_f64())?;
        writeln!(f, "Script: {}", self.action.as_str())?;
        write!(f, "Web: {}", self.action.is_url())
    }
}

/// Values read from a TOML settings file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileSettings {
    pub path: Option<PathBuf>,
    pub filetypes: Option<String>,
    pub filenames: Option<String>,
    pub none: Option<bool>,
    pub no_dot: Option<bool>,
    pub script: Option<String>,
    pub web: Option<bool>,
    pub blocking: Option<bool>,
    pub verbose: Option<bool>,
    pub max: Option<usize>,
    pub interval: Option<u64>,
}

impl FileSettings {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::SettingsRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text).map_err(|source| ConfigError::SettingsParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

/// Check that the path exists and is a directory, and make it absolute.
pub fn valid_path<P: AsRef<Path>>(path: P) -> Result<PathBuf, ConfigError> {
    let path = path.as_ref();
    let metadata = std::fs::metadata(path).map_err(|_| ConfigError::PathNotFound {
        path: path.to_path_buf(),
    })?;

    if !metadata.is_dir() {
        return Err(ConfigError::NotADirectory { path: path.to_path_buf() });
    }

    std::path::absolute(path).map_err(|_| ConfigError::PathNotFound {
        path: path.to_path_buf(),
    })
}

/// Split a whitespace-separated list of extensions, lower-case and sort it.
pub fn valid_file_types(list: &str) -> Result<Vec<String>, ConfigError> {
    let mut types: Vec<String> = list.split_whitespace().map(str::to_lowercase).collect();
    if types.is_empty() {
        return Err(ConfigError::EmptyFileTypes);
    }
    types.sort();
    Ok(types)
}

/// Split a whitespace-separated list of file names.
///
/// Existence is checked later by discovery, which skips unreadable names
/// with a warning instead of failing.
pub fn valid_file_names(list: &str) -> Vec<PathBuf> {
    let mut names: Vec<&str> = list.split_whitespace().collect();
    names.sort_unstable();
    names.dedup();
    names.into_iter().map(PathBuf::from).collect()
}

pub fn valid_script(script: &str) -> Result<String, ConfigError> {
    if script.is_empty() {
        return Err(ConfigError::EmptyScript);
    }
    Ok(script.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_valid_path() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("main.rs");
        std::fs::write(&file, "fn main() {}").unwrap();

        assert!(matches!(valid_path(""), Err(ConfigError::PathNotFound { .. })));
        assert!(valid_path(".").unwrap().is_absolute());
        assert!(valid_path("..").is_ok());
        assert!(valid_path(temp_dir.path()).is_ok());
        assert!(matches!(valid_path(&file), Err(ConfigError::NotADirectory { .. })));
        assert!(matches!(
            valid_path(temp_dir.path().join("missing")),
            Err(ConfigError::PathNotFound { .. })
        ));
    }

    #[test]
    fn test_valid_file_types() {
        assert!(matches!(valid_file_types(""), Err(ConfigError::EmptyFileTypes)));
        assert!(matches!(valid_file_types("   "), Err(ConfigError::EmptyFileTypes)));
        assert_eq!(valid_file_types("go").unwrap(), vec!["go"]);
        assert_eq!(valid_file_types("Go Rb").unwrap(), vec!["go", "rb"]);
        assert_eq!(valid_file_types("Go Rb Css").unwrap(), vec!["css", "go", "rb"]);
        assert_eq!(valid_file_types("Go Rb Css html").unwrap(), vec!["css", "go", "html", "rb"]);
        assert_eq!(valid_file_types("Go - .").unwrap(), vec!["-", ".", "go"]);
    }

    #[test]
    fn test_valid_file_names() {
        assert!(valid_file_names("").is_empty());
        assert_eq!(
            valid_file_names("b.txt a.txt b.txt"),
            vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")]
        );
    }

    #[test]
    fn test_valid_script() {
        assert!(matches!(valid_script(""), Err(ConfigError::EmptyScript)));
        assert_eq!(valid_script("go version").unwrap(), "go version");
    }

    #[test]
    fn test_config_validation() {
        let mut config = WatchConfig::new(
            PathBuf::from("/tmp"),
            vec!["rs".to_string()],
            Action::Command("true".to_string()),
        );
        assert!(config.validate().is_ok());

        config.interval = Duration::ZERO;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidInterval)));

        config.interval = Duration::from_secs(1);
        config.max_files = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidMaxFiles)));

        config.max_files = 10;
        config.action = Action::Url(String::new());
        assert!(matches!(config.validate(), Err(ConfigError::EmptyScript)));
    }

    #[test]
    fn test_settings_parse() {
        let settings = FileSettings::parse(
            r#"
            path = "site"
            filetypes = "html css"
            script = "./reload.sh"
            blocking = true
            interval = 5
            "#,
        )
        .unwrap();

        assert_eq!(settings.path, Some(PathBuf::from("site")));
        assert_eq!(settings.filetypes.as_deref(), Some("html css"));
        assert_eq!(settings.blocking, Some(true));
        assert_eq!(settings.interval, Some(5));
        assert_eq!(settings.max, None);

        assert!(FileSettings::parse("colour = \"red\"").is_err());
    }

    #[test]
    fn test_settings_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = FileSettings::load(temp_dir.path().join("monitfiles.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::SettingsRead { .. }));
    }

    #[test]
    fn test_display_lists_settings() {
        let config = WatchConfig::new(
            PathBuf::from("/srv/site"),
            vec!["css".to_string(), "html".to_string()],
            Action::Url("http://localhost:8080".to_string()),
        );
        let text = config.to_string();

        assert!(text.contains("Root path: /srv/site"));
        assert!(text.contains("File types: [css html]"));
        assert!(text.contains("Interval: 2 seconds"));
        assert!(text.contains("Web: true"));
    }
}
