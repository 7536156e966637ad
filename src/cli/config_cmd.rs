//! Configuration management CLI commands
//!
//! Manages ~/.psm-reconciler/config.toml (or the file given with --config)

use std::path::Path;

use anyhow::{Context, Result};
use clap::Subcommand;

use super::output;
use crate::config::ConfigFile;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the current configuration; the password is masked
    Show {
        /// Output format (json or yaml)
        #[arg(short, long, default_value = "yaml")]
        output: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (server, user, password, insecure or timeout)
        key: String,

        /// Configuration value
        value: String,
    },

    /// Print the configuration file path
    Path,
}

/// Handle config commands
pub fn handle_config_command(command: ConfigCommands, path: &Path) -> Result<()> {
    match command {
        ConfigCommands::Show { output } => {
            if !path.exists() {
                println!("No configuration file found at: {}", path.display());
                return Ok(());
            }
            let config = ConfigFile::load_from_path(path)
                .with_context(|| format!("Failed to load {}", path.display()))?;
            output::print_output(&config.redacted(), &output)?;
        }
        ConfigCommands::Set { key, value } => {
            let mut config = ConfigFile::load_from_path(path)
                .with_context(|| format!("Failed to load {}", path.display()))?;
            config.set(&key, &value)?;
            config.save_to_path(path)?;
            let shown = if key == "password" { "***" } else { value.as_str() };
            println!("Set {} = {} in {}", key, shown, path.display());
        }
        ConfigCommands::Path => println!("{}", path.display()),
    }
    Ok(())
}
