//! # Configuration Management
//!
//! Connection settings for the policy server. Each field is resolved from
//! the command line, the config file, the environment and finally a
//! default, then the merged result is validated.

pub mod file;
pub mod settings;

pub use file::{resolve_settings, resolve_settings_with, ConfigFile, SettingsOverrides};
pub use settings::{ProviderSettings, DEFAULT_TIMEOUT_SECONDS};
