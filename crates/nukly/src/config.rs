//! CLI-aware config loading: the config file plus `GlobalOpts` overrides.

use std::path::PathBuf;

use secrecy::SecretString;

use nukly_config::Config;
use nukly_core::AdapterConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Config file in effect: `--config`, else the platform default.
pub fn config_file(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(nukly_config::config_path)
}

/// Load the config file + environment, then apply command-line overrides.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    let mut cfg = nukly_config::load_config_from(&config_file(global))?;

    if let Some(ref address) = global.address {
        cfg.bridge.address.clone_from(address);
    }
    if let Some(port) = global.port {
        cfg.bridge.port = port;
    }
    if let Some(port) = global.listen_port {
        cfg.listen_port = port;
    }
    Ok(cfg)
}

/// Resolve the API key (`--api-key` first) and build the adapter config.
pub fn adapter_config(cfg: &Config, global: &GlobalOpts) -> Result<AdapterConfig, CliError> {
    let api_key = match global.api_key {
        Some(ref key) if !key.is_empty() => SecretString::from(key.clone()),
        _ => nukly_config::resolve_api_key(&cfg.bridge).map_err(|e| match e {
            nukly_config::ConfigError::NoCredentials => CliError::NoCredentials {
                path: config_file(global).display().to_string(),
            },
            other => other.into(),
        })?,
    };
    Ok(nukly_config::to_adapter_config(cfg, api_key))
}
