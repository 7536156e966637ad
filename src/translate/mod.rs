//! # Translator
//!
//! Bidirectional mapping between the configuration model and the server's
//! domain objects. Each resource kind is a zero-sized marker type that
//! implements [`PolicyResource`]; the protocol and reconciler are generic
//! over that trait, so the CRUD shape exists once.
//!
//! The mapping obeys one law: `from_domain(to_domain(c)) == c` for every
//! valid configuration `c`, with list order and map keys preserved and
//! defaults already materialized in `c`.

pub mod mirror_session;
pub mod security_policy;
pub mod syslog_policy;

use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::Serialize;
use validator::{Validate, ValidationError};

use crate::domain::{DomainObject, ResourceDescriptor};
use crate::errors::{Error, Result};

pub use mirror_session::MirrorSessions;
pub use security_policy::SecurityPolicies;
pub use syslog_policy::SyslogExportPolicies;

/// A resource kind: its server descriptor, configuration and wire types,
/// and the translation between them.
pub trait PolicyResource: Send + Sync + 'static {
    /// Declared configuration for one object
    type Config: Validate + Clone + PartialEq + Debug + Serialize + DeserializeOwned + Send + Sync;
    /// Wire `spec`
    type Spec: Clone + PartialEq + Debug + Serialize + DeserializeOwned + Send + Sync;
    /// Wire `status`; read-only
    type Status: Clone + PartialEq + Debug + Serialize + DeserializeOwned + Send + Sync;

    const DESCRIPTOR: ResourceDescriptor;

    /// Configuration field holding the name, e.g. `policy_name`
    const NAME_FIELD: &'static str;

    /// Declared name, used as the path identity on the server
    fn declared_name(config: &Self::Config) -> &str;

    /// Name rule for this kind; applied to names that bypass the
    /// configuration model, such as import targets
    fn validate_name(name: &str) -> std::result::Result<(), ValidationError>;

    /// Build the domain object for a validated configuration
    fn build_domain(config: &Self::Config) -> DomainObject<Self::Spec, Self::Status>;

    /// Rebuild the configuration from a domain object. Unknown fields and
    /// `status` are ignored.
    fn from_domain(object: &DomainObject<Self::Spec, Self::Status>) -> Self::Config;

    /// Fields that cannot be changed in place and differ between the two
    fn force_new_changes(prior: &Self::Config, desired: &Self::Config) -> Vec<&'static str>;
}

/// Domain object type for a resource kind
pub type DomainOf<K> =
    DomainObject<<K as PolicyResource>::Spec, <K as PolicyResource>::Status>;

/// Validate a configuration and translate it into a domain object.
///
/// Every constraint failure is reported as a configuration error here,
/// before any network call is attempted.
pub fn to_domain<K: PolicyResource>(config: &K::Config) -> Result<DomainOf<K>> {
    config.validate()?;
    Ok(K::build_domain(config))
}

/// Translate a domain object back into configuration
pub fn from_domain<K: PolicyResource>(object: &DomainOf<K>) -> K::Config {
    K::from_domain(object)
}

/// Check a bare object name before it is placed in a request path
pub fn check_name<K: PolicyResource>(name: &str) -> Result<()> {
    K::validate_name(name).map_err(|e| {
        Error::configuration_field(
            format!("Invalid {} name: {}", K::DESCRIPTOR.display_name, e),
            K::NAME_FIELD,
        )
    })
}

/// `Some(s)` for non-empty strings
pub(crate) fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// First distribution target, or the default when the server sent none
pub(crate) fn first_target(targets: &[String]) -> String {
    targets.first().cloned().unwrap_or_else(|| "default".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(""), None);
        assert_eq!(non_empty("x"), Some("x".to_string()));
    }

    #[test]
    fn test_check_name() {
        assert!(check_name::<MirrorSessions>("span-test").is_ok());
        assert!(check_name::<SecurityPolicies>("allow-web.v2").is_ok());

        let error = check_name::<MirrorSessions>("../../security/v1/x").unwrap_err();
        match error {
            Error::Configuration { field, .. } => assert_eq!(field.as_deref(), Some("name")),
            other => panic!("expected configuration error, got {:?}", other),
        }
        let error = check_name::<SecurityPolicies>("web/rules").unwrap_err();
        match error {
            Error::Configuration { field, .. } => assert_eq!(field.as_deref(), Some("policy_name")),
            other => panic!("expected configuration error, got {:?}", other),
        }
        assert!(check_name::<SyslogExportPolicies>("").unwrap_err().is_configuration());
    }

    #[test]
    fn test_first_target() {
        assert_eq!(first_target(&[]), "default");
        assert_eq!(first_target(&["dsc-group".to_string(), "other".to_string()]), "dsc-group");
    }
}
