//! Error types and process exit statuses
//!
//! Configuration and discovery errors are fatal and happen before any file is
//! monitored. Trigger errors are reported by the unit that hit them and never
//! stop monitoring.

use std::path::PathBuf;
use std::process;
use thiserror::Error;

/// Invalid or missing configuration, reported before monitoring starts.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("path error: {path} does not exist")]
    PathNotFound { path: PathBuf },

    #[error("invalid path, please select a path not a file: {path}")]
    NotADirectory { path: PathBuf },

    #[error("invalid file types: the list is empty")]
    EmptyFileTypes,

    #[error("empty script")]
    EmptyScript,

    #[error("interval must be greater than 0")]
    InvalidInterval,

    #[error("max number of files must be greater than 0")]
    InvalidMaxFiles,

    #[error("failed to read settings file {path}: {source}")]
    SettingsRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings file {path}: {source}")]
    SettingsParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Failure while building the initial watch set.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("MAX files limit reached ({limit}), please consider new limit")]
    TooManyFiles { limit: usize },

    #[error("failed to walk directory tree: {0}")]
    Walk(#[from] ignore::Error),

    #[error("failed to read modification time of {path}: {source}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure of a triggered action. Never fatal to the monitoring loop.
#[derive(Error, Debug)]
pub enum TriggerError {
    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {status}")]
    Failed {
        command: String,
        status: process::ExitStatus,
        output: String,
    },

    #[error("failed to open {url}: {reason}")]
    Open { url: String, reason: String },

    #[error("unsupported platform")]
    UnsupportedPlatform,
}

/// How the process ends, with the code handed to `std::process::exit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Unknown,
    Ok,
    NoParams,
    Path,
    FileTypes,
    Script,
    Storage,
}

impl ExitStatus {
    pub fn code(self) -> i32 {
        match self {
            ExitStatus::Ok => 0,
            ExitStatus::Unknown
            | ExitStatus::NoParams
            | ExitStatus::Path
            | ExitStatus::FileTypes
            | ExitStatus::Script
            | ExitStatus::Storage => 1,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ExitStatus::Unknown => "unknown error.",
            ExitStatus::Ok => "Exited, bye.",
            ExitStatus::NoParams => "Unspecified params: ",
            ExitStatus::Path => "error in path: ",
            ExitStatus::FileTypes => "error in file types: ",
            ExitStatus::Script => "error in script: ",
            ExitStatus::Storage => "error building storage",
        }
    }
}

impl From<&ConfigError> for ExitStatus {
    fn from(err: &ConfigError) -> Self {
        match err {
            ConfigError::PathNotFound { .. } | ConfigError::NotADirectory { .. } => ExitStatus::Path,
            ConfigError::EmptyFileTypes => ExitStatus::FileTypes,
            ConfigError::EmptyScript => ExitStatus::Script,
            ConfigError::InvalidInterval
            | ConfigError::InvalidMaxFiles
            | ConfigError::SettingsRead { .. }
            | ConfigError::SettingsParse { .. } => ExitStatus::NoParams,
        }
    }
}

impl From<&DiscoveryError> for ExitStatus {
    fn from(_: &DiscoveryError) -> Self {
        ExitStatus::Storage
    }
}
