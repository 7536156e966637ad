//! Scripted transport for protocol and reconciler tests

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::Method;

use super::{Transport, TransportRequest, TransportResponse};
use crate::errors::{Error, Result};

enum Reply {
    Respond(u16, String),
    Fail(String),
    Hang,
}

/// Answers requests from a fixed script and records every request it sees
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<TransportRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queue a response
    pub(crate) fn reply<B: Into<String>>(self, status: u16, body: B) -> Self {
        self.push(Reply::Respond(status, body.into()))
    }

    /// Queue a 200 response with a JSON body
    pub(crate) fn ok_json(self, body: serde_json::Value) -> Self {
        self.reply(200, body.to_string())
    }

    /// Queue a connection failure
    pub(crate) fn fail<S: Into<String>>(self, message: S) -> Self {
        self.push(Reply::Fail(message.into()))
    }

    /// Queue a request that never completes
    pub(crate) fn hang(self) -> Self {
        self.push(Reply::Hang)
    }

    fn push(self, reply: Reply) -> Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    /// Every request sent so far
    pub(crate) fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// `(method, path)` of every request sent so far
    pub(crate) fn calls(&self) -> Vec<(Method, String)> {
        self.requests().into_iter().map(|r| (r.method, r.path)).collect()
    }

    /// Parsed body of the n-th request
    pub(crate) fn body_json(&self, index: usize) -> serde_json::Value {
        let requests = self.requests();
        let body = requests[index].body.as_deref().expect("request has no body");
        serde_json::from_str(body).expect("request body is not JSON")
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse> {
        let reply = {
            self.requests.lock().unwrap().push(request.clone());
            self.replies.lock().unwrap().pop_front()
        };

        match reply {
            Some(Reply::Respond(status, body)) => Ok(TransportResponse { status, body }),
            Some(Reply::Fail(message)) => Err(Error::transport(message)),
            Some(Reply::Hang) => std::future::pending().await,
            None => panic!("unexpected request: {} {}", request.method, request.path),
        }
    }
}
