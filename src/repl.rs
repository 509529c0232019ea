//! Interactive command prompt
//!
//! Reads one command per line from stdin and drives the supervisor. Quitting,
//! end of input and Ctrl+C all terminate every watch unit before returning.

use std::io::{self, Write};
use anyhow::Result;
use chrono::{DateTime, Local};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::debug;
use crate::core::{Supervisor, TargetStatus};
use crate::error::ExitStatus;

pub const PROMPT: &str = "> ";
pub const HELP: &str = "available commands: quit help moo count list fire configs start stop";
const MOO: &str = "^__^ \n(oo)\\_______ \n(__)\\       )\\/\\ \n    ||----w | \n    ||     ||\n ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    Help,
    Moo,
    Count,
    Configs,
    List,
    Fire,
    /// Resume every unit
    Start,
    /// Pause every unit
    Stop,
    Debug,
    Unknown,
}

impl Command {
    /// `None` for blank lines
    pub fn parse(line: &str) -> Option<Self> {
        let command = match line.trim() {
            "" => return None,
            "quit" => Command::Quit,
            "?" | "help" | "h" => Command::Help,
            "moo" => Command::Moo,
            "count" => Command::Count,
            "configs" => Command::Configs,
            "list" => Command::List,
            "fire" => Command::Fire,
            "start" => Command::Start,
            "stop" => Command::Stop,
            "debug" => Command::Debug,
            _ => Command::Unknown,
        };
        Some(command)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Execute one command, writing its output to `out`.
pub async fn dispatch<W: Write>(command: Command, supervisor: &mut Supervisor, out: &mut W) -> io::Result<Flow> {
    let verbose = supervisor.config().verbose;
    writeln!(out)?;

    match command {
        Command::Quit => {
            supervisor.terminate_all().await;
            if verbose {
                writeln!(out, "\u{1F44B}  bye!")?;
            }
            return Ok(Flow::Quit);
        }
        Command::Help => writeln!(out, "{}", HELP)?,
        Command::Moo => writeln!(out, "{}", MOO)?,
        Command::Count => writeln!(out, "{} files on store", supervisor.count())?,
        Command::Configs => {
            writeln!(out, "configs:")?;
            for line in supervisor.config().to_string().lines() {
                writeln!(out, "   {}", line)?;
            }
        }
        Command::List => {
            for status in supervisor.list() {
                writeln!(out, "{}", format_status(&status))?;
            }
        }
        Command::Fire => {
            if let Err(err) = supervisor.fire().await {
                debug!("Script error: {}", err);
            }
        }
        Command::Start => supervisor.resume_all(),
        Command::Stop => supervisor.pause_all(),
        Command::Debug => {}
        Command::Unknown => {
            if verbose {
                writeln!(out, "unknown command...")?;
            }
        }
    }

    Ok(Flow::Continue)
}

/// One `list` line
pub fn format_status(status: &TargetStatus) -> String {
    let modified: DateTime<Local> = status.modified.into();
    format!(
        "{} ({} updates) {} last modified at {}",
        status.id,
        status.updates,
        status.path.display(),
        modified.format("%Y-%m-%d %H:%M:%S%.3f %z")
    )
}

/// Run the prompt until quit, end of input or Ctrl+C.
pub async fn run(supervisor: &mut Supervisor) -> Result<ExitStatus> {
    let (interrupt_tx, mut interrupt_rx) = mpsc::unbounded_channel();
    ctrlc::set_handler(move || {
        let _ = interrupt_tx.send(());
    })?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = io::stdout();
    prompt(&mut stdout)?;

    loop {
        tokio::select! {
            _ = interrupt_rx.recv() => {
                supervisor.terminate_all().await;
                break;
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    supervisor.terminate_all().await;
                    break;
                };
                if let Some(command) = Command::parse(&line) {
                    if dispatch(command, supervisor, &mut stdout).await? == Flow::Quit {
                        break;
                    }
                }
                prompt(&mut stdout)?;
            }
        }
    }

    Ok(ExitStatus::Ok)
}

fn prompt<W: Write>(out: &mut W) -> io::Result<()> {
    write!(out, "{}", PROMPT)?;
    out.flush()
}
