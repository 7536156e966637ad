use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ObjectMeta;
use crate::errors::Result;
use crate::translate::{DomainOf, PolicyResource};

/// What is known locally about one object after the last successful
/// operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedState<C> {
    /// Server-issued uuid; never changes for the life of the object
    pub id: String,

    /// Name used as the path key
    pub name: String,

    /// Configuration as reported by the server
    pub config: C,

    pub meta: ObjectMeta,

    /// Server-computed status, read only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<serde_json::Value>,

    pub synced_at: DateTime<Utc>,
}

impl<C> RecordedState<C> {
    /// Build a record from the server's authoritative copy
    pub(crate) fn from_domain<K>(id: String, object: DomainOf<K>) -> Result<Self>
    where
        K: PolicyResource<Config = C>,
    {
        let config = K::from_domain(&object);
        let status = object.status.as_ref().map(serde_json::to_value).transpose()?;

        Ok(Self {
            id,
            name: object.meta.name.clone(),
            config,
            meta: object.meta,
            status,
            synced_at: Utc::now(),
        })
    }
}
