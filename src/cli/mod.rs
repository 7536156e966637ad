//! # Command Line Interface
//!
//! `plan`, `apply`, `refresh`, `import`, `destroy` and `show` operate on a
//! declared-state YAML document and a local JSON state file. Ctrl-C cancels
//! the in-flight request; operations that completed stay recorded.

pub mod config_cmd;
pub mod driver;
pub mod output;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::{resolve_settings, ConfigFile, SettingsOverrides};
use crate::model::DeclaredState;
use crate::observability::init_logging;
use crate::state::{StateFile, DEFAULT_STATE_FILE};
use crate::translate::{MirrorSessions, SecurityPolicies, SyslogExportPolicies};
use crate::transport::HttpTransport;
use driver::{Change, Driver};

#[derive(Parser)]
#[command(name = "psm-reconciler")]
#[command(about = "Reconcile declared network policy objects against a policy server")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Options accepted by every command
#[derive(Args)]
pub struct GlobalArgs {
    /// Policy server URL (falls back to API_SERVER)
    #[arg(long, global = true)]
    pub server: Option<String>,

    /// Login user (falls back to API_USER)
    #[arg(long, global = true)]
    pub user: Option<String>,

    /// Login password (falls back to API_PASSWORD)
    #[arg(long, global = true)]
    pub password: Option<String>,

    /// Skip TLS certificate verification (falls back to API_INSECURE)
    #[arg(long, global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Configuration file (default ~/.psm-reconciler/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// State file
    #[arg(long, global = true, default_value = DEFAULT_STATE_FILE)]
    pub state: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show what apply would change
    Plan {
        /// Declared state document
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Converge the server on the declared state
    Apply {
        /// Declared state document
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Re-read every tracked object from the server
    Refresh,

    /// Start tracking an object that already exists on the server
    Import {
        #[arg(value_enum)]
        kind: KindArg,

        /// Object name
        name: String,
    },

    /// Delete every tracked object
    Destroy,

    /// Print the state file
    Show {
        /// Output format (json or yaml)
        #[arg(short, long, default_value = "yaml")]
        output: String,
    },

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        command: config_cmd::ConfigCommands,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    MirrorSession,
    SecurityPolicy,
    SyslogExportPolicy,
}

/// Run CLI commands
pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    let global = cli.global;
    init_logging(global.verbose, global.json_logs);

    let config_path = match &global.config {
        Some(path) => path.clone(),
        None => ConfigFile::default_path()?,
    };

    match cli.command {
        Commands::Config { command } => config_cmd::handle_config_command(command, &config_path),
        Commands::Show { output: format } => {
            let state = StateFile::load(&global.state)?;
            output::print_output(&state, &format)
        }
        command => run_remote(command, &global, &config_path).await,
    }
}

/// Commands that talk to the policy server
async fn run_remote(command: Commands, global: &GlobalArgs, config_path: &Path) -> Result<()> {
    let config_file = ConfigFile::load_from_path(config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;
    let overrides = SettingsOverrides {
        server: global.server.clone(),
        user: global.user.clone(),
        password: global.password.clone(),
        insecure: global.insecure.then_some(true),
        timeout_seconds: global.timeout,
    };
    let settings = resolve_settings(&overrides, &config_file)?;

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    let transport = HttpTransport::connect(&settings)
        .await
        .with_context(|| format!("Failed to connect to {}", settings.base_url()))?;
    let state = StateFile::load(&global.state)?;
    let mut driver = Driver::new(&transport, cancel, global.state.clone(), state);

    match command {
        Commands::Plan { file } => {
            let declared = DeclaredState::load(&file)?;
            let mut changes = driver.plan::<MirrorSessions>(&declared).await?;
            changes.extend(driver.plan::<SecurityPolicies>(&declared).await?);
            changes.extend(driver.plan::<SyslogExportPolicies>(&declared).await?);
            print_changes(&changes);
        }
        Commands::Apply { file } => {
            let declared = DeclaredState::load(&file)?;
            let mut changes = driver.apply::<MirrorSessions>(&declared).await?;
            changes.extend(driver.apply::<SecurityPolicies>(&declared).await?);
            changes.extend(driver.apply::<SyslogExportPolicies>(&declared).await?);
            print_changes(&changes);
        }
        Commands::Refresh => {
            let count = driver.refresh::<MirrorSessions>().await?
                + driver.refresh::<SecurityPolicies>().await?
                + driver.refresh::<SyslogExportPolicies>().await?;
            println!(
                "Refreshed {} objects; {} still tracked",
                count,
                driver.state().len()
            );
        }
        Commands::Import { kind, name } => {
            let id = match kind {
                KindArg::MirrorSession => driver.import::<MirrorSessions>(&name).await?.id,
                KindArg::SecurityPolicy => driver.import::<SecurityPolicies>(&name).await?.id,
                KindArg::SyslogExportPolicy => {
                    driver.import::<SyslogExportPolicies>(&name).await?.id
                }
            };
            println!("Imported '{}' with id {}", name, id);
        }
        Commands::Destroy => {
            let count = driver.destroy::<SyslogExportPolicies>().await?
                + driver.destroy::<SecurityPolicies>().await?
                + driver.destroy::<MirrorSessions>().await?;
            println!("Destroyed {} objects", count);
        }
        Commands::Show { .. } | Commands::Config { .. } => {}
    }

    Ok(())
}

fn print_changes(changes: &[Change]) {
    if changes.is_empty() {
        println!("No objects declared or tracked.");
        return;
    }
    print!("{}", output::format_changes(changes));
    println!("\n{}", output::summarize(changes));
}

fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("Interrupt received, cancelling in-flight operation");
                cancel.cancel();
            }
            Err(e) => info!(error = %e, "Interrupt handler unavailable"),
        }
    });
}
