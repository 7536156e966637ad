//! Configuration file handling
//!
//! Manages loading and saving settings from ~/.psm-reconciler/config.toml
//! and resolving each connection setting from multiple sources.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::settings::{ProviderSettings, DEFAULT_TIMEOUT_SECONDS};
use crate::errors::{Error, Result};

pub const ENV_SERVER: &str = "API_SERVER";
pub const ENV_USER: &str = "API_USER";
pub const ENV_PASSWORD: &str = "API_PASSWORD";
pub const ENV_INSECURE: &str = "API_INSECURE";

/// Settings stored in ~/.psm-reconciler/config.toml
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,

    /// Request timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

impl ConfigFile {
    /// Default configuration file path (~/.psm-reconciler/config.toml)
    pub fn default_path() -> Result<PathBuf> {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .map_err(|_| Error::configuration("Unable to determine home directory"))?;

        let mut path = PathBuf::from(home);
        path.push(".psm-reconciler");
        path.push("config.toml");
        Ok(path)
    }

    /// Load from a path; a missing file yields empty settings
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using empty settings");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::io(format!("Failed to read config file: {}", path.display()), e))?;

        Ok(toml::from_str(&contents)?)
    }

    /// Save to a path, creating the parent directory if needed
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::io(format!("Failed to create directory: {}", parent.display()), e)
            })?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::configuration(format!("Failed to serialize configuration: {}", e)))?;

        std::fs::write(path, contents)
            .map_err(|e| Error::io(format!("Failed to write config file: {}", path.display()), e))
    }

    /// Set one key by name, as used by `config set`
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "server" => self.server = Some(value.to_string()),
            "user" => self.user = Some(value.to_string()),
            "password" => self.password = Some(value.to_string()),
            "insecure" => self.insecure = Some(parse_bool(key, value)?),
            "timeout" => {
                let timeout = value.parse().map_err(|_| {
                    Error::configuration_field(format!("'{}' is not a number of seconds", value), key)
                })?;
                self.timeout = Some(timeout);
            }
            other => {
                return Err(Error::configuration_field(
                    "Unknown key; expected one of server, user, password, insecure, timeout",
                    other,
                ))
            }
        }
        Ok(())
    }

    /// Copy with the password masked, for display
    pub fn redacted(&self) -> Self {
        Self { password: self.password.as_ref().map(|_| "***".to_string()), ..self.clone() }
    }
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub server: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub insecure: Option<bool>,
    pub timeout_seconds: Option<u64>,
}

/// Resolve settings from the process environment.
///
/// Each field is taken from the first source that has it:
/// 1. command line flag
/// 2. config file
/// 3. `API_SERVER`, `API_USER`, `API_PASSWORD`, `API_INSECURE`
/// 4. default (`insecure = false`, `timeout = 30`)
pub fn resolve_settings(flags: &SettingsOverrides, file: &ConfigFile) -> Result<ProviderSettings> {
    resolve_settings_with(flags, file, |key| std::env::var(key).ok())
}

/// Resolve settings with an explicit environment lookup
pub fn resolve_settings_with<F>(
    flags: &SettingsOverrides,
    file: &ConfigFile,
    env: F,
) -> Result<ProviderSettings>
where
    F: Fn(&str) -> Option<String>,
{
    let env = |key: &str| env(key).filter(|v| !v.is_empty());

    let server = pick("server", flags.server.clone(), file.server.clone(), env(ENV_SERVER))
        .ok_or_else(|| missing("server", "--server", ENV_SERVER))?;
    let user = pick("user", flags.user.clone(), file.user.clone(), env(ENV_USER))
        .ok_or_else(|| missing("user", "--user", ENV_USER))?;
    let password = pick("password", flags.password.clone(), file.password.clone(), env(ENV_PASSWORD))
        .ok_or_else(|| missing("password", "--password", ENV_PASSWORD))?;

    let env_insecure = env(ENV_INSECURE).map(|v| parse_bool(ENV_INSECURE, &v)).transpose()?;
    let insecure = pick("insecure", flags.insecure, file.insecure, env_insecure).unwrap_or(false);

    let timeout_seconds = pick("timeout", flags.timeout_seconds, file.timeout, None)
        .unwrap_or(DEFAULT_TIMEOUT_SECONDS);

    let settings = ProviderSettings { server, user, password, insecure, timeout_seconds };
    settings.validate_settings()?;
    Ok(settings)
}

fn pick<T>(name: &str, flag: Option<T>, file: Option<T>, env: Option<T>) -> Option<T> {
    if flag.is_some() {
        debug!("Using {} from command line flag", name);
        return flag;
    }
    if file.is_some() {
        debug!("Using {} from config file", name);
        return file;
    }
    if env.is_some() {
        debug!("Using {} from environment", name);
    }
    env
}

fn missing(field: &str, flag: &str, env: &str) -> Error {
    Error::configuration_field(
        format!(
            "No {} configured. Provide it via {}, ~/.psm-reconciler/config.toml or {}",
            field, flag, env
        ),
        field,
    )
}

fn parse_bool(field: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(Error::configuration_field(format!("'{}' is not a boolean", value), field)),
    }
}
