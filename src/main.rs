use std::process;
use std::sync::Arc;
use clap::{CommandFactory, Parser};
use anyhow::Result;
use tracing::info;

use monitfiles::{
    cli::{self, Cli},
    core::{discover, Supervisor},
    repl, ExitStatus,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Without any argument there is nothing to watch.
    if std::env::args_os().len() < 2 {
        Cli::command().print_help()?;
        process::exit(ExitStatus::NoParams.code());
    }

    let cli = Cli::parse();

    let config = match cli.settings().and_then(|settings| cli.resolve(&settings)) {
        Ok(config) => config,
        Err(err) => {
            let status = ExitStatus::from(&err);
            eprintln!("*** Error: {}{}", status.description(), err);
            eprintln!("use -h for help");
            process::exit(status.code());
        }
    };

    cli::setup_logging(config.verbose);

    let discovery = match discover(&config) {
        Ok(discovery) => discovery,
        Err(err) => {
            let status = ExitStatus::from(&err);
            eprintln!("*** Error: {}: {}", status.description(), err);
            process::exit(status.code());
        }
    };

    info!("************************************************");
    for line in config.to_string().lines() {
        info!("{}", line);
    }
    info!("Number of directories scanned: {}", discovery.scanned_dirs);
    info!("Number of files added and being monitored: {}", discovery.targets.len());
    info!("************************************************");
    println!();

    let mut supervisor = Supervisor::new(Arc::new(config), discovery.targets);
    supervisor.start_all();

    let status = repl::run(&mut supervisor).await?;
    // stdin may still be blocked in a read, so do not wait for the runtime to wind down
    process::exit(status.code());
}
