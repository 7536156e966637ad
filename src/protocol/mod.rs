//! # Remote Object Protocol
//!
//! One authenticated exchange per verb against
//! `/configs/<group>/v1/tenant/default/<collection>[/<name>]`.
//!
//! - Success is HTTP 200 and nothing else; any other status becomes
//!   [`Error::RemoteRejection`] carrying the body verbatim.
//! - 404 on read is the [`ReadOutcome::NotFound`] outcome, on delete it is
//!   [`DeleteOutcome::AlreadyAbsent`], and on import it is
//!   [`Error::NotFound`].
//! - Write bodies carry `kind`, `api-version`, `meta` and `spec`; `status`
//!   is never sent.
//! - Every exchange races the caller's cancellation token. A cancelled
//!   exchange is abandoned and reported as [`Error::Cancelled`].

use std::marker::PhantomData;

use reqwest::Method;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, Instrument};

use crate::domain::{ObjectMeta, DEFAULT_TENANT};
use crate::errors::{Error, Result};
use crate::translate::{DomainOf, PolicyResource};
use crate::transport::{Transport, TransportRequest, TransportResponse};

const STATUS_OK: u16 = 200;
const STATUS_NOT_FOUND: u16 = 404;

/// Result of a read
#[derive(Debug, Clone, PartialEq)]
pub enum ReadOutcome<T> {
    Found(T),
    /// The object no longer exists on the server
    NotFound,
}

impl<T> ReadOutcome<T> {
    pub fn found(self) -> Option<T> {
        match self {
            ReadOutcome::Found(object) => Some(object),
            ReadOutcome::NotFound => None,
        }
    }
}

/// Result of a delete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The server answered 404; the object was already gone
    AlreadyAbsent,
}

/// Body of a create or update request
#[derive(Serialize)]
#[serde(rename_all = "kebab-case")]
struct WriteBody<'a, S> {
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_version: Option<&'a str>,
    meta: &'a ObjectMeta,
    spec: &'a S,
}

/// CRUD client for one resource kind
pub struct ObjectClient<'t, K> {
    transport: &'t dyn Transport,
    cancel: CancellationToken,
    _kind: PhantomData<fn() -> K>,
}

impl<'t, K: PolicyResource> ObjectClient<'t, K> {
    pub fn new(transport: &'t dyn Transport, cancel: CancellationToken) -> Self {
        Self { transport, cancel, _kind: PhantomData }
    }

    /// POST the object to its collection and decode the authoritative copy
    pub async fn create(&self, object: &DomainOf<K>) -> Result<DomainOf<K>> {
        let name = object.meta.name.as_str();
        let span = crate::remote_span!("create", K::DESCRIPTOR.display_name, name);
        async {
            let request = TransportRequest::new(Method::POST, collection_path::<K>())
                .with_body(encode_write_body::<K>(object)?);
            let response = self.exchange("create", name, request).await?;
            decode::<K>(expect_ok::<K>("create", name, response)?)
        }
        .instrument(span)
        .await
    }

    /// GET the object by name
    pub async fn read(&self, name: &str) -> Result<ReadOutcome<DomainOf<K>>> {
        let span = crate::remote_span!("read", K::DESCRIPTOR.display_name, name);
        async {
            let request = TransportRequest::new(Method::GET, object_path::<K>(name));
            let response = self.exchange("read", name, request).await?;
            if response.status == STATUS_NOT_FOUND {
                debug!("Object not found on server");
                return Ok(ReadOutcome::NotFound);
            }
            Ok::<_, Error>(ReadOutcome::Found(decode::<K>(expect_ok::<K>("read", name, response)?)?))
        }
        .instrument(span)
        .await
    }

    /// PUT the complete object, replacing whatever the server holds
    pub async fn update(&self, name: &str, object: &DomainOf<K>) -> Result<DomainOf<K>> {
        let span = crate::remote_span!("update", K::DESCRIPTOR.display_name, name);
        async {
            let request = TransportRequest::new(Method::PUT, object_path::<K>(name))
                .with_body(encode_write_body::<K>(object)?);
            let response = self.exchange("update", name, request).await?;
            decode::<K>(expect_ok::<K>("update", name, response)?)
        }
        .instrument(span)
        .await
    }

    /// DELETE the object by name
    pub async fn delete(&self, name: &str) -> Result<DeleteOutcome> {
        let span = crate::remote_span!("delete", K::DESCRIPTOR.display_name, name);
        async {
            let request = TransportRequest::new(Method::DELETE, object_path::<K>(name));
            let response = self.exchange("delete", name, request).await?;
            if response.status == STATUS_NOT_FOUND {
                debug!("Object already absent");
                return Ok(DeleteOutcome::AlreadyAbsent);
            }
            expect_ok::<K>("delete", name, response)?;
            Ok::<_, Error>(DeleteOutcome::Deleted)
        }
        .instrument(span)
        .await
    }

    /// GET an object this tool never created; absence is an error
    pub async fn import(&self, name: &str) -> Result<DomainOf<K>> {
        let span = crate::remote_span!("import", K::DESCRIPTOR.display_name, name);
        async {
            let request = TransportRequest::new(Method::GET, object_path::<K>(name));
            let response = self.exchange("import", name, request).await?;
            if response.status == STATUS_NOT_FOUND {
                return Err(Error::not_found(K::DESCRIPTOR.display_name, name));
            }
            decode::<K>(expect_ok::<K>("import", name, response)?)
        }
        .instrument(span)
        .await
    }

    async fn exchange(
        &self,
        verb: &str,
        name: &str,
        request: TransportRequest,
    ) -> Result<TransportResponse> {
        debug!(method = %request.method, path = %request.path, "Remote request");
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                Err(Error::cancelled(format!("{} {} '{}'", verb, K::DESCRIPTOR.display_name, name)))
            }
            response = self.transport.send(request) => response,
        }
    }
}

fn collection_path<K: PolicyResource>() -> String {
    K::DESCRIPTOR.collection_path(DEFAULT_TENANT)
}

fn object_path<K: PolicyResource>(name: &str) -> String {
    K::DESCRIPTOR.object_path(DEFAULT_TENANT, name)
}

fn encode_write_body<K: PolicyResource>(object: &DomainOf<K>) -> Result<String> {
    let body = WriteBody {
        kind: object.kind.as_deref(),
        api_version: object.api_version.as_deref(),
        meta: &object.meta,
        spec: &object.spec,
    };
    let json = serde_json::to_string(&body).map_err(|e| {
        Error::serialization(format!("Failed to encode {}", K::DESCRIPTOR.display_name), e)
    })?;
    debug!(body = %json, "Request body");
    Ok(json)
}

fn expect_ok<K: PolicyResource>(verb: &str, name: &str, response: TransportResponse) -> Result<String> {
    if response.status == STATUS_OK {
        return Ok(response.body);
    }
    Err(Error::remote_rejection(
        format!("{} {} '{}'", verb, K::DESCRIPTOR.display_name, name),
        response.status,
        response.body,
    ))
}

fn decode<K: PolicyResource>(body: String) -> Result<DomainOf<K>> {
    serde_json::from_str(&body).map_err(|e| {
        Error::serialization(format!("Failed to decode {} response", K::DESCRIPTOR.display_name), e)
    })
}
