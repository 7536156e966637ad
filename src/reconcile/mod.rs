//! # Reconciler
//!
//! Drives one resource kind through its lifecycle:
//!
//! ```text
//! Absent -> Creating -> Present -> Updating -> Present -> Deleting -> Absent
//!                       Present -> Reading  -> Present | Absent (drift)
//! ```
//!
//! A change to a ForceNew field never becomes an update; it is planned as a
//! replacement, which deletes the old object and creates the new one.
//! Every verb returns a fresh [`RecordedState`] and never mutates the one it
//! was given, so a failed or cancelled operation leaves the caller's record
//! untouched.

mod record;

use std::fmt;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::errors::{Error, Result};
use crate::protocol::{DeleteOutcome, ObjectClient, ReadOutcome};
use crate::translate::{check_name, to_domain, DomainOf, PolicyResource};
use crate::transport::Transport;

pub use record::RecordedState;

/// Recorded state for a resource kind
pub type RecordOf<K> = RecordedState<<K as PolicyResource>::Config>;

/// Lifecycle of one declared object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Absent,
    Creating,
    Present,
    Reading,
    Updating,
    Deleting,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LifecycleState::Absent => "absent",
            LifecycleState::Creating => "creating",
            LifecycleState::Present => "present",
            LifecycleState::Reading => "reading",
            LifecycleState::Updating => "updating",
            LifecycleState::Deleting => "deleting",
        };
        f.write_str(s)
    }
}

/// What reconciliation will do for one object
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Create,
    Update,
    /// Delete then create because these immutable fields changed
    Replace { fields: Vec<&'static str> },
    Delete,
    NoOp,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Create => f.write_str("create"),
            Action::Update => f.write_str("update"),
            Action::Replace { fields } => write!(f, "replace ({})", fields.join(", ")),
            Action::Delete => f.write_str("delete"),
            Action::NoOp => f.write_str("no-op"),
        }
    }
}

/// Result of [`Reconciler::apply`]
#[derive(Debug, Clone, PartialEq)]
pub struct ApplyOutcome<C> {
    pub action: Action,
    /// Record after the operation; `None` once the object is absent
    pub record: Option<RecordedState<C>>,
}

/// Reconciler for resource kind `K`
pub struct Reconciler<'t, K> {
    client: ObjectClient<'t, K>,
}

impl<'t, K: PolicyResource> Reconciler<'t, K> {
    pub fn new(transport: &'t dyn Transport, cancel: CancellationToken) -> Self {
        Self { client: ObjectClient::new(transport, cancel) }
    }

    /// Decide what to do given the (refreshed) record and the declaration
    pub fn plan(prior: Option<&RecordOf<K>>, desired: Option<&K::Config>) -> Action {
        match (prior, desired) {
            (None, None) => Action::NoOp,
            (None, Some(_)) => Action::Create,
            (Some(_), None) => Action::Delete,
            (Some(prior), Some(desired)) => {
                let fields = K::force_new_changes(&prior.config, desired);
                if !fields.is_empty() {
                    Action::Replace { fields }
                } else if prior.config != *desired {
                    Action::Update
                } else {
                    Action::NoOp
                }
            }
        }
    }

    /// Refresh the prior record, plan against the declaration and execute.
    ///
    /// The declaration is validated before anything is sent.
    pub async fn apply(
        &self,
        prior: Option<&RecordOf<K>>,
        desired: Option<&K::Config>,
    ) -> Result<ApplyOutcome<K::Config>> {
        if let Some(desired) = desired {
            to_domain::<K>(desired)?;
        }

        let refreshed = match prior {
            Some(prior) => self.read(prior).await?,
            None => None,
        };

        let action = Self::plan(refreshed.as_ref(), desired);
        let record = match (&action, refreshed, desired) {
            (Action::Create, _, Some(desired)) => Some(self.create(desired).await?),
            (Action::Update, Some(current), Some(desired)) => {
                Some(self.update(&current, desired).await?)
            }
            (Action::Replace { fields }, Some(current), Some(desired)) => {
                info!(
                    kind = K::DESCRIPTOR.display_name,
                    name = %current.name,
                    fields = %fields.join(", "),
                    "Immutable fields changed, replacing object"
                );
                self.delete(&current).await?;
                Some(self.create(desired).await?)
            }
            (Action::Delete, Some(current), _) => {
                self.delete(&current).await?;
                None
            }
            (_, current, _) => current,
        };

        Ok(ApplyOutcome { action, record })
    }

    /// Create the declared object and record the server's copy
    pub async fn create(&self, desired: &K::Config) -> Result<RecordOf<K>> {
        let name = K::declared_name(desired);
        let object = to_domain::<K>(desired)?;

        transition::<K>(name, LifecycleState::Absent, LifecycleState::Creating);
        let created = self.client.create(&object).await?;
        let record = self.record(created, None)?;
        transition::<K>(name, LifecycleState::Creating, LifecycleState::Present);
        info!(kind = K::DESCRIPTOR.display_name, name = %name, id = %record.id, "Created");
        Ok(record)
    }

    /// Probe the server; `None` means the object is gone. An object under
    /// the same name with a different uuid is a replacement made elsewhere,
    /// so the tracked object counts as gone too.
    pub async fn read(&self, prior: &RecordOf<K>) -> Result<Option<RecordOf<K>>> {
        transition::<K>(&prior.name, LifecycleState::Present, LifecycleState::Reading);
        match self.client.read(&prior.name).await? {
            ReadOutcome::Found(object) => {
                if let Some(current) = object.meta.uuid().filter(|u| *u != prior.id) {
                    warn!(
                        kind = K::DESCRIPTOR.display_name,
                        name = %prior.name,
                        id = %prior.id,
                        current_id = %current,
                        "Object was replaced outside of reconciliation; import it to track the new one"
                    );
                    transition::<K>(&prior.name, LifecycleState::Reading, LifecycleState::Absent);
                    return Ok(None);
                }
                let record = self.record(object, Some(&prior.id))?;
                transition::<K>(&prior.name, LifecycleState::Reading, LifecycleState::Present);
                Ok(Some(record))
            }
            ReadOutcome::NotFound => {
                warn!(
                    kind = K::DESCRIPTOR.display_name,
                    name = %prior.name,
                    id = %prior.id,
                    "Object deleted outside of reconciliation"
                );
                transition::<K>(&prior.name, LifecycleState::Reading, LifecycleState::Absent);
                Ok(None)
            }
        }
    }

    /// Replace the object's spec in full.
    ///
    /// Changing a ForceNew field is a configuration error here; use
    /// [`Reconciler::apply`] to get a replacement instead.
    pub async fn update(&self, prior: &RecordOf<K>, desired: &K::Config) -> Result<RecordOf<K>> {
        let fields = K::force_new_changes(&prior.config, desired);
        if let Some(field) = fields.first() {
            return Err(Error::configuration_field(
                format!(
                    "{} '{}' cannot change {} in place; it must be replaced",
                    K::DESCRIPTOR.display_name,
                    prior.name,
                    fields.join(", ")
                ),
                *field,
            ));
        }
        let object = to_domain::<K>(desired)?;

        transition::<K>(&prior.name, LifecycleState::Present, LifecycleState::Updating);
        let updated = self.client.update(&prior.name, &object).await?;
        let record = self.record(updated, Some(&prior.id))?;
        transition::<K>(&prior.name, LifecycleState::Updating, LifecycleState::Present);
        Ok(record)
    }

    /// Delete the object; an object that is already gone counts as deleted
    pub async fn delete(&self, prior: &RecordOf<K>) -> Result<DeleteOutcome> {
        transition::<K>(&prior.name, LifecycleState::Present, LifecycleState::Deleting);
        let outcome = self.client.delete(&prior.name).await?;
        if outcome == DeleteOutcome::AlreadyAbsent {
            warn!(kind = K::DESCRIPTOR.display_name, name = %prior.name, "Object was already absent");
        }
        transition::<K>(&prior.name, LifecycleState::Deleting, LifecycleState::Absent);
        Ok(outcome)
    }

    /// Start tracking an object that exists on the server
    pub async fn import(&self, name: &str) -> Result<RecordOf<K>> {
        check_name::<K>(name)?;
        let object = self.client.import(name).await?;
        let record = self.record(object, None)?;
        info!(kind = K::DESCRIPTOR.display_name, name = %name, id = %record.id, "Imported");
        Ok(record)
    }

    fn record(&self, object: DomainOf<K>, expected_id: Option<&str>) -> Result<RecordOf<K>> {
        let id = object.meta.uuid().map(str::to_string).ok_or_else(|| {
            Error::invalid_response(format!(
                "{} '{}' response has no meta.uuid",
                K::DESCRIPTOR.display_name,
                object.meta.name
            ))
        })?;

        if let Some(expected) = expected_id {
            if expected != id {
                return Err(Error::invalid_response(format!(
                    "{} '{}' uuid changed from '{}' to '{}'",
                    K::DESCRIPTOR.display_name,
                    object.meta.name,
                    expected,
                    id
                )));
            }
        }

        RecordedState::from_domain::<K>(id, object)
    }
}

fn transition<K: PolicyResource>(name: &str, from: LifecycleState, to: LifecycleState) {
    tracing::debug!(
        kind = K::DESCRIPTOR.display_name,
        name = %name,
        from = %from,
        to = %to,
        "Lifecycle transition"
    );
}

#[cfg(test)]
mod tests;
