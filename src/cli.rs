use std::path::PathBuf;
use std::time::Duration;
use clap::{ArgAction, Parser};
use crate::config::{
    valid_file_names, valid_file_types, valid_path, valid_script, Action, FileSettings, WatchConfig,
    DEFAULT_FILE_TYPES, DEFAULT_INTERVAL_SECS, DEFAULT_MAX_FILES, DEFAULT_PATH,
};
use crate::error::ConfigError;

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "monitfiles")]
#[command(author = "monitfiles contributors")]
#[command(version)]
#[command(about = "Monitors file changes and executes a script or opens a URL")]
#[command(long_about = "monitfiles polls every matching file under a directory for modification-time changes and runs a script (or opens a URL in the default browser) when one changes. Sub directories are searched for the file types being monitored. An interactive prompt accepts commands such as help, list, start, stop and quit.")]
pub struct Cli {
    /// Directory to monitor
    #[arg(short, long, value_name = "PATH", help = "Path to monitor [default: .]")]
    pub path: Option<PathBuf>,

    /// Extensions to watch, whitespace separated
    #[arg(short = 'f', long = "filetypes", value_name = "TYPES", help = "File types to be monitored for changes [default: \"htm html css js\"]")]
    pub file_types: Option<String>,

    /// Extra files to watch, whitespace separated
    #[arg(short = 'n', long = "filenames", value_name = "NAMES", help = "File names to be monitored for changes")]
    pub file_names: Option<String>,

    #[arg(long = "none", help = "Also monitor files without extension")]
    pub no_extension: bool,

    #[arg(long = "no-dot", value_name = "BOOL", action = ArgAction::Set, help = "Exclude dot dirs like .git, set to false to enter them [default: true]")]
    pub no_dot: Option<bool>,

    /// Command line run on change, or URL with --web
    #[arg(short, long, value_name = "SCRIPT", help = "Command to be called upon change detection")]
    pub script: Option<String>,

    #[arg(short, long, help = "Open the script URL in the default browser")]
    pub web: bool,

    #[arg(short, long, help = "Block until the script finishes")]
    pub blocking: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long = "max", value_name = "COUNT", help = "Max number of files to monitor [default: 200]")]
    pub max_files: Option<usize>,

    #[arg(short, long, value_name = "SECONDS", help = "Interval in seconds between change checks [default: 2]")]
    pub interval: Option<u64>,

    /// TOML file supplying values for flags not given
    #[arg(short, long, value_name = "FILE", help = "Settings file in TOML format")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Settings from `--config`, empty when none was given
    pub fn settings(&self) -> Result<FileSettings, ConfigError> {
        match &self.config {
            Some(path) => FileSettings::load(path),
            None => Ok(FileSettings::default()),
        }
    }

    /// Validate the flags, falling back to the settings file and then to the
    /// built-in defaults.
    pub fn resolve(&self, settings: &FileSettings) -> Result<WatchConfig, ConfigError> {
        let path = self
            .path
            .clone()
            .or_else(|| settings.path.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PATH));
        let root = valid_path(&path)?;

        let file_types = valid_file_types(
            self.file_types
                .as_deref()
                .or(settings.filetypes.as_deref())
                .unwrap_or(DEFAULT_FILE_TYPES),
        )?;
        let file_names = valid_file_names(
            self.file_names
                .as_deref()
                .or(settings.filenames.as_deref())
                .unwrap_or_default(),
        );
        let script = valid_script(
            self.script
                .as_deref()
                .or(settings.script.as_deref())
                .unwrap_or_default(),
        )?;

        let action = if self.web || settings.web.unwrap_or(false) {
            Action::Url(script)
        } else {
            Action::Command(script)
        };

        let mut config = WatchConfig::new(root, file_types, action);
        config.file_names = file_names;
        config.include_no_extension = self.no_extension || settings.none.unwrap_or(false);
        config.exclude_dot_dirs = self.no_dot.or(settings.no_dot).unwrap_or(true);
        config.blocking = self.blocking || settings.blocking.unwrap_or(false);
        config.verbose = self.verbose || settings.verbose.unwrap_or(false);
        config.max_files = self.max_files.or(settings.max).unwrap_or(DEFAULT_MAX_FILES);
        config.interval = Duration::from_secs(
            self.interval.or(settings.interval).unwrap_or(DEFAULT_INTERVAL_SECS),
        );

        config.validate()?;
        Ok(config)
    }
}

pub fn setup_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("monitfiles").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_flags() {
        let cli = parse(&[
            "-p", "/tmp", "-f", "Go Rb", "-n", "a.txt b.txt", "--none", "--no-dot", "false",
            "-s", "make", "-b", "-v", "--max", "10", "-i", "5",
        ]);

        assert_eq!(cli.path, Some(PathBuf::from("/tmp")));
        assert_eq!(cli.file_types.as_deref(), Some("Go Rb"));
        assert!(cli.no_extension);
        assert_eq!(cli.no_dot, Some(false));
        assert!(cli.blocking && cli.verbose && !cli.web);
        assert_eq!(cli.max_files, Some(10));
        assert_eq!(cli.interval, Some(5));
    }

    #[test]
    fn test_resolve_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let cli = Cli {
            path: Some(temp_dir.path().to_path_buf()),
            script: Some("./reload.sh".to_string()),
            ..Default::default()
        };

        let config = cli.resolve(&FileSettings::default()).unwrap();
        assert!(config.root.is_absolute());
        assert_eq!(config.file_types, vec!["css", "htm", "html", "js"]);
        assert!(config.file_names.is_empty());
        assert!(config.exclude_dot_dirs);
        assert!(!config.include_no_extension);
        assert_eq!(config.max_files, 200);
        assert_eq!(config.interval, Duration::from_secs(2));
        assert_eq!(config.action, Action::Command("./reload.sh".to_string()));
    }

    #[test]
    fn test_resolve_web_action() {
        let temp_dir = TempDir::new().unwrap();
        let cli = Cli {
            path: Some(temp_dir.path().to_path_buf()),
            script: Some("http://localhost:3000".to_string()),
            web: true,
            ..Default::default()
        };

        let config = cli.resolve(&FileSettings::default()).unwrap();
        assert_eq!(config.action, Action::Url("http://localhost:3000".to_string()));
    }

    #[test]
    fn test_flags_override_settings() {
        let temp_dir = TempDir::new().unwrap();
        let settings = FileSettings {
            path: Some(temp_dir.path().to_path_buf()),
            filetypes: Some("rs toml".to_string()),
            script: Some("cargo check".to_string()),
            no_dot: Some(false),
            interval: Some(9),
            max: Some(50),
            ..Default::default()
        };
        let cli = Cli {
            interval: Some(1),
            ..Default::default()
        };

        let config = cli.resolve(&settings).unwrap();
        assert_eq!(config.file_types, vec!["rs", "toml"]);
        assert!(!config.exclude_dot_dirs);
        assert_eq!(config.interval, Duration::from_secs(1));
        assert_eq!(config.max_files, 50);
        assert_eq!(config.action.as_str(), "cargo check");
    }

    #[test]
    fn test_resolve_errors() {
        let temp_dir = TempDir::new().unwrap();
        let base = Cli {
            path: Some(temp_dir.path().to_path_buf()),
            script: Some("make".to_string()),
            ..Default::default()
        };
        let settings = FileSettings::default();

        let missing_script = Cli { script: None, ..base.clone() };
        assert!(matches!(missing_script.resolve(&settings), Err(ConfigError::EmptyScript)));

        let bad_types = Cli { file_types: Some(" ".to_string()), ..base.clone() };
        assert!(matches!(bad_types.resolve(&settings), Err(ConfigError::EmptyFileTypes)));

        let bad_path = Cli { path: Some(temp_dir.path().join("nope")), ..base.clone() };
        assert!(matches!(bad_path.resolve(&settings), Err(ConfigError::PathNotFound { .. })));

        let zero_interval = Cli { interval: Some(0), ..base.clone() };
        assert!(matches!(zero_interval.resolve(&settings), Err(ConfigError::InvalidInterval)));

        let zero_max = Cli { max_files: Some(0), ..base };
        assert!(matches!(zero_max.resolve(&settings), Err(ConfigError::InvalidMaxFiles)));
    }
}
