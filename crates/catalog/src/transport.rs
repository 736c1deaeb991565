//! Port definition for single HTTP attempts.
//!
//! The resolver never talks HTTP itself. It hands each candidate to a
//! [`Transport`] chosen by the candidate's [`Protocol`]; infrastructure crates
//! supply the real adapters and tests supply in-memory fakes.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::endpoints::{EndpointCandidate, HttpMethod, Protocol};

/// Result of one HTTP attempt.
///
/// `success` is `true` only when the request completed without a transport
/// error and the status was 2xx. Transport errors are reported as
/// `(false, "", 0)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub success: bool,
    pub body: String,
    pub status: u16,
}

impl Attempt {
    /// An attempt that completed with `status` and `body`.
    pub fn completed(status: u16, body: impl Into<String>) -> Self {
        Self {
            success: (200..300).contains(&status),
            body: body.into(),
            status,
        }
    }

    /// An attempt that never produced a response.
    pub fn transport_failure() -> Self {
        Self {
            success: false,
            body: String::new(),
            status: 0,
        }
    }
}

/// What a transport sends for one attempt.
///
/// Form transports post `params` (plus the credential); JSON transports send
/// `params` as the query string on GET and `body` on POST.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    pub params: Vec<(String, String)>,
    pub body: Option<Value>,
}

/// Performs one HTTP attempt for one protocol family.
///
/// Implementations must never panic or return an error: every failure is an
/// [`Attempt`] with `success == false`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, method: HttpMethod, path: &str, payload: &Payload) -> Attempt;
}

/// The pair of transports the resolver dispatches over.
#[derive(Clone)]
pub struct Transports {
    pub form: Arc<dyn Transport>,
    pub json: Arc<dyn Transport>,
}

impl Transports {
    pub fn new(form: Arc<dyn Transport>, json: Arc<dyn Transport>) -> Self {
        Self { form, json }
    }

    /// The transport serving `protocol`.
    pub fn for_protocol(&self, protocol: Protocol) -> &dyn Transport {
        match protocol {
            Protocol::FormEncoded => self.form.as_ref(),
            Protocol::Json => self.json.as_ref(),
        }
    }
}

impl std::fmt::Debug for Transports {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transports").finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Operation request
// ---------------------------------------------------------------------------

/// Everything one logical operation may send, across both generations.
///
/// [`OperationRequest::payload_for`] projects it onto the [`Payload`] a given
/// candidate understands.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationRequest {
    form: BTreeMap<String, String>,
    query: BTreeMap<String, String>,
    body: Option<Value>,
    path_params: BTreeMap<String, String>,
}

impl OperationRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// A field understood by both generations: form field and query parameter.
    #[must_use]
    pub fn field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        self.form.insert(key.clone(), value.clone());
        self.query.insert(key, value);
        self
    }

    /// A field sent only to form-encoded candidates.
    #[must_use]
    pub fn form_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.form.insert(key.into(), value.into());
        self
    }

    /// A parameter sent only to JSON GET candidates.
    #[must_use]
    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// The body sent to JSON POST candidates.
    #[must_use]
    pub fn json_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// A value for a `{name}` placeholder in candidate paths.
    #[must_use]
    pub fn path_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_params.insert(key.into(), value.into());
        self
    }

    /// Renders `candidate`'s path, or `None` if a placeholder is unfilled.
    pub fn path_for(&self, candidate: &EndpointCandidate) -> Option<String> {
        candidate.render_path(|name| self.path_params.get(name).map(String::as_str))
    }

    /// The payload `candidate` should receive.
    pub fn payload_for(&self, candidate: &EndpointCandidate) -> Payload {
        let pairs = |map: &BTreeMap<String, String>| {
            map.iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect::<Vec<_>>()
        };
        match (candidate.protocol, candidate.method) {
            (Protocol::FormEncoded, _) => Payload {
                params: pairs(&self.form),
                body: None,
            },
            (Protocol::Json, HttpMethod::Get) => Payload {
                params: pairs(&self.query),
                body: None,
            },
            (Protocol::Json, HttpMethod::Post) => Payload {
                params: Vec::new(),
                body: self.body.clone(),
            },
        }
    }
}
