//! Config subcommand handlers.

use nukly_config::Config;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

pub fn handle(
    args: &ConfigArgs,
    global: &GlobalOpts,
    cfg: Result<Config, CliError>,
) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config::config_file(global).display().to_string(), false);
            Ok(())
        }
        ConfigCommand::Show => {
            let shown = cfg?.to_redacted_toml()?;
            output::print_output(shown.trim_end(), global.quiet);
            Ok(())
        }
    }
}
