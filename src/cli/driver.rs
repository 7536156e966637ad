//! Per-kind orchestration of plan, apply, refresh, import and destroy
//!
//! Objects are processed one at a time. The state file is saved after every
//! successful operation, so whatever completed before a failure or a
//! cancellation stays recorded.

use std::path::PathBuf;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::errors::{Error, Result};
use crate::model::DeclaredState;
use crate::reconcile::{Action, RecordOf, Reconciler};
use crate::state::{StateFile, StoredKind};
use crate::translate::to_domain;
use crate::transport::Transport;

/// One planned or applied change
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    pub kind: &'static str,
    pub name: String,
    pub action: String,
}

impl Change {
    fn new<K: StoredKind>(name: &str, action: &Action) -> Self {
        Self { kind: K::SECTION, name: name.to_string(), action: action.to_string() }
    }
}

pub struct Driver<'a> {
    transport: &'a dyn Transport,
    cancel: CancellationToken,
    state_path: PathBuf,
    state: StateFile,
}

impl<'a> Driver<'a> {
    pub fn new(
        transport: &'a dyn Transport,
        cancel: CancellationToken,
        state_path: PathBuf,
        state: StateFile,
    ) -> Self {
        Self { transport, cancel, state_path, state }
    }

    pub fn state(&self) -> &StateFile {
        &self.state
    }

    fn reconciler<K: StoredKind>(&self) -> Reconciler<'a, K> {
        Reconciler::new(self.transport, self.cancel.clone())
    }

    /// Refresh and plan without changing the server or the state file
    pub async fn plan<K: StoredKind>(&self, declared: &DeclaredState) -> Result<Vec<Change>> {
        let reconciler = self.reconciler::<K>();
        let desired = K::declared(declared);
        for config in desired {
            to_domain::<K>(config)?;
        }

        let mut changes = Vec::new();
        for (name, prior) in orphans::<K>(&self.state, desired) {
            let refreshed = reconciler.read(&prior).await?;
            let action = Reconciler::<K>::plan(refreshed.as_ref(), None);
            changes.push(Change::new::<K>(&name, &action));
        }

        for config in desired {
            let name = K::declared_name(config);
            let refreshed = match K::records(&self.state).get(name) {
                Some(prior) => reconciler.read(prior).await?,
                None => None,
            };
            let action = Reconciler::<K>::plan(refreshed.as_ref(), Some(config));
            changes.push(Change::new::<K>(name, &action));
        }
        Ok(changes)
    }

    /// Converge the server on the declaration. Objects no longer declared
    /// are deleted first.
    pub async fn apply<K: StoredKind>(&mut self, declared: &DeclaredState) -> Result<Vec<Change>> {
        let reconciler = self.reconciler::<K>();
        let desired = K::declared(declared);
        for config in desired {
            to_domain::<K>(config)?;
        }

        let mut changes = Vec::new();
        for (name, prior) in orphans::<K>(&self.state, desired) {
            let outcome = reconciler.apply(Some(&prior), None).await?;
            self.commit::<K>(&name, outcome.record)?;
            changes.push(Change::new::<K>(&name, &outcome.action));
        }

        for config in desired {
            let name = K::declared_name(config);
            let prior = K::records(&self.state).get(name).cloned();
            let outcome = reconciler.apply(prior.as_ref(), Some(config)).await?;
            self.commit::<K>(name, outcome.record)?;
            changes.push(Change::new::<K>(name, &outcome.action));
        }
        Ok(changes)
    }

    /// Re-read every tracked object; vanished objects are dropped
    pub async fn refresh<K: StoredKind>(&mut self) -> Result<usize> {
        let reconciler = self.reconciler::<K>();
        let tracked: Vec<(String, RecordOf<K>)> =
            K::records(&self.state).iter().map(|(n, r)| (n.clone(), r.clone())).collect();

        for (name, prior) in &tracked {
            let refreshed = reconciler.read(prior).await?;
            self.commit::<K>(name, refreshed)?;
        }
        Ok(tracked.len())
    }

    /// Start tracking an existing server object
    pub async fn import<K: StoredKind>(&mut self, name: &str) -> Result<RecordOf<K>> {
        if K::records(&self.state).contains_key(name) {
            return Err(Error::configuration_field(
                format!("'{}' is already tracked", name),
                K::SECTION,
            ));
        }
        let record = self.reconciler::<K>().import(name).await?;
        self.commit::<K>(name, Some(record.clone()))?;
        Ok(record)
    }

    /// Delete every tracked object of this kind
    pub async fn destroy<K: StoredKind>(&mut self) -> Result<usize> {
        let reconciler = self.reconciler::<K>();
        let tracked: Vec<(String, RecordOf<K>)> =
            K::records(&self.state).iter().map(|(n, r)| (n.clone(), r.clone())).collect();

        for (name, prior) in &tracked {
            reconciler.delete(prior).await?;
            self.commit::<K>(name, None)?;
        }
        Ok(tracked.len())
    }

    fn commit<K: StoredKind>(&mut self, name: &str, record: Option<RecordOf<K>>) -> Result<()> {
        let records = K::records_mut(&mut self.state);
        match record {
            Some(record) => {
                records.insert(name.to_string(), record);
            }
            None => {
                if records.remove(name).is_some() {
                    info!(kind = K::SECTION, name = %name, "Stopped tracking object");
                }
            }
        }
        self.state.save(&self.state_path)
    }
}

/// Tracked objects whose name is no longer declared
fn orphans<K: StoredKind>(state: &StateFile, desired: &[K::Config]) -> Vec<(String, RecordOf<K>)> {
    K::records(state)
        .iter()
        .filter(|(name, _)| !desired.iter().any(|c| K::declared_name(c) == name.as_str()))
        .map(|(name, record)| (name.clone(), record.clone()))
        .collect()
}
