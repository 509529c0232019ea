//! Runs the configured action
//!
//! Commands go through the platform shell exactly as configured. URLs go to
//! the platform opener. Failures are returned to the caller, which logs them
//! and keeps monitoring.

use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;
use crate::config::{Action, WatchConfig};
use crate::error::TriggerError;

/// What a successful trigger did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// Blocking run finished with a zero exit status
    Completed { output: String },
    /// Non-blocking run started, nobody waits for it
    Spawned { pid: Option<u32> },
    Opened,
}

/// Fire the configured action once.
pub async fn fire(config: &WatchConfig) -> Result<TriggerOutcome, TriggerError> {
    debug!("Script run: {}", config.action.as_str());

    match &config.action {
        Action::Url(url) => open_url(url).await.map(|_| TriggerOutcome::Opened),
        Action::Command(command) if config.blocking => run_blocking(command).await,
        Action::Command(command) => run_detached(command),
    }
}

async fn run_blocking(command: &str) -> Result<TriggerOutcome, TriggerError> {
    let output = shell(command)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|source| TriggerError::Spawn {
            command: command.to_string(),
            source,
        })?;

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    debug!("Output: {}", combined.trim_end());

    if output.status.success() {
        Ok(TriggerOutcome::Completed { output: combined })
    } else {
        Err(TriggerError::Failed {
            command: command.to_string(),
            status: output.status,
            output: combined,
        })
    }
}

fn run_detached(command: &str) -> Result<TriggerOutcome, TriggerError> {
    let mut child = shell(command)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|source| TriggerError::Spawn {
            command: command.to_string(),
            source,
        })?;

    let pid = child.id();
    let command = command.to_string();
    // Reap the child so it does not linger as a zombie.
    tokio::spawn(async move {
        match child.wait().await {
            Ok(status) if !status.success() => debug!("Script error: `{}` exited with {}", command, status),
            Ok(_) => {}
            Err(err) => debug!("Script error: waiting for `{}` failed: {}", command, err),
        }
    });

    Ok(TriggerOutcome::Spawned { pid })
}

#[cfg(unix)]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

#[cfg(windows)]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}

#[cfg(any(target_os = "macos", target_os = "linux", target_os = "windows"))]
async fn open_url(url: &str) -> Result<(), TriggerError> {
    let mut cmd = opener(url);
    let status = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map_err(|err| TriggerError::Open {
            url: url.to_string(),
            reason: err.to_string(),
        })?;

    if status.success() {
        Ok(())
    } else {
        Err(TriggerError::Open {
            url: url.to_string(),
            reason: format!("opener exited with {}", status),
        })
    }
}

#[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
async fn open_url(_url: &str) -> Result<(), TriggerError> {
    Err(TriggerError::UnsupportedPlatform)
}

#[cfg(target_os = "macos")]
fn opener(url: &str) -> Command {
    let mut cmd = Command::new("open");
    cmd.arg(url);
    cmd
}

#[cfg(target_os = "linux")]
fn opener(url: &str) -> Command {
    let mut cmd = Command::new("xdg-open");
    cmd.arg(url);
    cmd
}

#[cfg(target_os = "windows")]
fn opener(url: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg("start").arg("").arg(url);
    cmd
}
