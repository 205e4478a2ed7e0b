mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use nukly_config::LogLevel;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // The config file decides the default verbosity, so load it first.
    let cfg = config::load(&cli.global);
    let level = cfg.as_ref().map_or(LogLevel::default(), |c| c.log_level);
    init_tracing(cli.global.verbose, level);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli, cfg).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8, level: LogLevel) {
    let filter = match verbosity {
        0 => level.as_filter(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli, cfg: Result<nukly_config::Config, CliError>) -> Result<(), CliError> {
    match cli.command {
        // Config commands work even when the file does not parse
        Command::Config(args) => commands::config_cmd::handle(&args, &cli.global, cfg),

        cmd => {
            let cfg = cfg?;
            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &cfg, &cli.global).await
        }
    }
}
