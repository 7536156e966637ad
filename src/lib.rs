//! # psm-reconciler
//!
//! Declarative reconciliation of objects on a policy-management server:
//! mirror sessions, network security policies and syslog export policies.
//! An operator declares the objects that should exist; the reconciler
//! computes the difference against what it last recorded and against the
//! server, then creates, updates, replaces or deletes until they match.
//!
//! ## Architecture
//!
//! ```text
//! CLI -> Driver -> Reconciler<K> -> ObjectClient<K> -> Transport -> policy server
//!                      |                  |
//!                  Translator         Domain objects
//!                      |
//!              Configuration model
//! ```
//!
//! - [`model`]: declared configuration, validated with `validator`
//! - [`translate`]: configuration to and from server domain objects
//! - [`protocol`]: one authenticated HTTP exchange per verb
//! - [`reconcile`]: planning and the lifecycle of one object
//! - [`state`]: the local state file
//! - [`transport`]: session login and the reqwest client
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use psm_reconciler::config::ProviderSettings;
//! use psm_reconciler::reconcile::Reconciler;
//! use psm_reconciler::translate::MirrorSessions;
//! use psm_reconciler::transport::HttpTransport;
//! use psm_reconciler::model::DeclaredState;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run(settings: ProviderSettings) -> psm_reconciler::Result<()> {
//! let transport = HttpTransport::connect(&settings).await?;
//! let declared = DeclaredState::load("declared.yaml".as_ref())?;
//! let reconciler = Reconciler::<MirrorSessions>::new(&transport, CancellationToken::new());
//! for session in &declared.mirror_sessions {
//!     let record = reconciler.create(session).await?;
//!     println!("{} -> {}", record.name, record.id);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod model;
pub mod observability;
pub mod protocol;
pub mod reconcile;
pub mod state;
pub mod translate;
pub mod transport;
pub mod validation;

// Re-export commonly used types
pub use config::ProviderSettings;
pub use errors::{Error, Result};
pub use model::DeclaredState;
pub use reconcile::{Action, RecordedState, Reconciler};
pub use state::StateFile;
pub use translate::{MirrorSessions, PolicyResource, SecurityPolicies, SyslogExportPolicies};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert_eq!(APP_NAME, "psm-reconciler");
        assert!(!VERSION.is_empty());
    }
}
