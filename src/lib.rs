pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod repl;

pub use config::{Action, WatchConfig};
pub use crate::core::*;
pub use error::{ConfigError, DiscoveryError, ExitStatus, TriggerError};
