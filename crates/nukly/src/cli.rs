//! Clap derive structures for the `nukly` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// nukly -- Nuki Bridge adapter
#[derive(Debug, Parser)]
#[command(
    name = "nukly",
    version,
    about = "Mirror Nuki smart locks into a home-automation device table",
    long_about = "Lists the locks paired with a Nuki Bridge, mirrors each one as a \
        lock-status and a door-sensor selector device, relays lock commands, \
        and keeps a push-callback subscription so state changes arrive \
        without polling.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "NUKLY_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Bridge address (overrides config)
    #[arg(long, short = 'a', global = true)]
    pub address: Option<String>,

    /// Bridge HTTP API port (overrides config)
    #[arg(long, global = true)]
    pub port: Option<u16>,

    /// Bridge API token
    #[arg(long, env = "NUKLY_API_KEY", global = true, hide_env = true)]
    pub api_key: Option<String>,

    /// Port the callback listener binds and advertises
    #[arg(long, global = true)]
    pub listen_port: Option<u16>,

    /// Output format
    #[arg(long, short = 'o', default_value = "table", global = true)]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the adapter: mirror locks and serve push callbacks until Ctrl-C
    Run(RunArgs),

    /// List locks on every known bridge
    #[command(alias = "ls")]
    Locks,

    /// List (and optionally register) bridge push callbacks
    #[command(alias = "cb")]
    Callbacks(CallbacksArgs),

    /// Send a lock action by selector level
    Action(ActionArgs),

    /// Ask the Nuki discovery service for bridges on this network
    Discover,

    /// Inspect configuration
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Device table file (overrides config)
    #[arg(long)]
    pub device_store: Option<PathBuf>,

    /// Also use bridges announced by the discovery service
    #[arg(long)]
    pub discover: bool,
}

#[derive(Debug, Args)]
pub struct CallbacksArgs {
    /// Register this host's callback URL where it is missing
    #[arg(long)]
    pub ensure: bool,
}

#[derive(Debug, Args)]
pub struct ActionArgs {
    /// Lock nukiId
    pub nuki_id: u64,

    /// Status selector level (10/40 lock, 20/30 unlock, 50/70 unlatch, 60 lock 'n' go)
    pub level: u32,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file path
    Path,
    /// Print the effective configuration (API key masked)
    Show,
}
