//! Endpoint cascade resolution.
//!
//! For one logical operation the resolver walks the candidate list strictly in
//! order, one attempt per candidate, and stops at the first attempt that
//! reports success. Later candidates are never contacted once one succeeds,
//! even if they might return richer data. Nothing is remembered between calls:
//! every call restarts from the first candidate.

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::endpoints::{EndpointCandidate, Operation};
use crate::transport::{OperationRequest, Transports};
use crate::ClientError;

/// The candidate that answered and its raw response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub candidate: EndpointCandidate,
    /// Zero-based position of `candidate` in the cascade.
    pub attempt_index: usize,
    pub status: u16,
    pub body: String,
}

/// Runs endpoint cascades over a pair of transports.
#[derive(Debug, Clone)]
pub struct Resolver {
    transports: Transports,
}

impl Resolver {
    pub fn new(transports: Transports) -> Self {
        Self { transports }
    }

    /// Runs the static cascade configured for `operation`.
    pub async fn resolve(
        &self,
        operation: Operation,
        request: &OperationRequest,
        cancel: &CancellationToken,
    ) -> Result<Resolution, ClientError> {
        self.run_cascade(operation.as_str(), operation.candidates(), request, cancel)
            .await
    }

    /// Tries `candidates` in order and returns the first successful attempt.
    ///
    /// Fails with [`ClientError::EndpointsExhausted`] when every candidate
    /// fails, or [`ClientError::Cancelled`] when `cancel` fires first.
    /// Cancellation is observed before each attempt and while it is in flight.
    pub async fn run_cascade(
        &self,
        operation: &str,
        candidates: &[EndpointCandidate],
        request: &OperationRequest,
        cancel: &CancellationToken,
    ) -> Result<Resolution, ClientError> {
        for (index, candidate) in candidates.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(ClientError::cancelled(operation));
            }

            let Some(path) = request.path_for(candidate) else {
                warn!(
                    operation,
                    endpoint = %candidate,
                    "path parameter missing; skipping candidate"
                );
                continue;
            };
            let payload = request.payload_for(candidate);
            let transport = self.transports.for_protocol(candidate.protocol);

            let attempt = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ClientError::cancelled(operation)),
                attempt = transport.execute(candidate.method, &path, &payload) => attempt,
            };

            if attempt.success {
                info!(
                    operation,
                    endpoint = %candidate,
                    attempt = index + 1,
                    status = attempt.status,
                    "endpoint succeeded"
                );
                return Ok(Resolution {
                    candidate: *candidate,
                    attempt_index: index,
                    status: attempt.status,
                    body: attempt.body,
                });
            }

            debug!(
                operation,
                endpoint = %candidate,
                status = attempt.status,
                "endpoint failed"
            );
        }

        error!(
            operation,
            candidates = candidates.len(),
            "all endpoints failed"
        );
        Err(ClientError::exhausted(operation))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::*;
    use crate::endpoints::HttpMethod;
    use crate::transport::{Attempt, Payload, Transport};

    /// Answers from a path → (status, body) table and records every call.
    #[derive(Default)]
    struct ScriptedTransport {
        routes: HashMap<String, (u16, String)>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedTransport {
        fn route(mut self, path: &str, status: u16, body: &str) -> Self {
            self.routes
                .insert(path.to_string(), (status, body.to_string()));
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn execute(&self, _method: HttpMethod, path: &str, _payload: &Payload) -> Attempt {
            self.calls.lock().unwrap().push(path.to_string());
            match self.routes.get(path) {
                Some((status, body)) => Attempt::completed(*status, body.clone()),
                None => Attempt::transport_failure(),
            }
        }
    }

    /// Never completes; used to observe cancellation of an in-flight attempt.
    struct HangingTransport;

    #[async_trait]
    impl Transport for HangingTransport {
        async fn execute(&self, _: HttpMethod, _: &str, _: &Payload) -> Attempt {
            std::future::pending::<Attempt>().await
        }
    }

    const CASCADE: &[EndpointCandidate] = &[
        EndpointCandidate::form("/a"),
        EndpointCandidate::form("/b"),
        EndpointCandidate::json_get("/c"),
        EndpointCandidate::json_get("/d"),
    ];

    fn resolver(form: Arc<ScriptedTransport>, json: Arc<ScriptedTransport>) -> Resolver {
        Resolver::new(Transports::new(form, json))
    }

    #[tokio::test]
    async fn test_all_candidates_failing_yields_exhaustion() {
        let form = Arc::new(ScriptedTransport::default().route("/a", 500, "err"));
        let json = Arc::new(ScriptedTransport::default().route("/d", 404, ""));
        let r = resolver(form.clone(), json.clone());

        let err = r
            .run_cascade("get_things", CASCADE, &OperationRequest::new(), &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(err, ClientError::exhausted("get_things"));
        assert_eq!(form.calls(), vec!["/a", "/b"]);
        assert_eq!(json.calls(), vec!["/c", "/d"]);
    }

    #[tokio::test]
    async fn test_first_success_stops_the_cascade() {
        let form = Arc::new(ScriptedTransport::default().route("/a", 503, "down"));
        let json = Arc::new(
            ScriptedTransport::default()
                .route("/c", 200, "third")
                .route("/d", 200, "fourth"),
        );
        let r = resolver(form.clone(), json.clone());

        let hit = r
            .run_cascade("op", CASCADE, &OperationRequest::new(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(hit.body, "third");
        assert_eq!(hit.attempt_index, 2);
        assert_eq!(hit.candidate.path, "/c");
        assert_eq!(json.calls(), vec!["/c"], "/d must never be invoked");
    }

    #[tokio::test]
    async fn test_every_call_restarts_from_the_first_candidate() {
        let form = Arc::new(ScriptedTransport::default().route("/b", 200, "[]"));
        let json = Arc::new(ScriptedTransport::default());
        let r = resolver(form.clone(), json);
        let cancel = CancellationToken::new();

        for _ in 0..2 {
            r.run_cascade("op", CASCADE, &OperationRequest::new(), &cancel)
                .await
                .unwrap();
        }
        assert_eq!(form.calls(), vec!["/a", "/b", "/a", "/b"]);
    }

    #[tokio::test]
    async fn test_unfilled_placeholder_skips_candidate() {
        const WITH_PARAM: &[EndpointCandidate] = &[
            EndpointCandidate::json_get("/orders/{orderId}"),
            EndpointCandidate::json_get("/orders"),
        ];
        let json = Arc::new(ScriptedTransport::default().route("/orders", 200, "[]"));
        let r = resolver(Arc::new(ScriptedTransport::default()), json.clone());

        let hit = r
            .run_cascade("op", WITH_PARAM, &OperationRequest::new(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(hit.attempt_index, 1);
        assert_eq!(json.calls(), vec!["/orders"]);
    }

    #[tokio::test]
    async fn test_cancelled_before_start_sends_nothing() {
        let form = Arc::new(ScriptedTransport::default().route("/a", 200, "[]"));
        let r = resolver(form.clone(), Arc::new(ScriptedTransport::default()));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = r
            .run_cascade("op", CASCADE, &OperationRequest::new(), &cancel)
            .await
            .unwrap_err();
        assert_eq!(err, ClientError::cancelled("op"));
        assert!(form.calls().is_empty());
    }

    #[tokio::test]
    async fn test_cancellation_interrupts_in_flight_attempt() {
        let r = Resolver::new(Transports::new(
            Arc::new(HangingTransport),
            Arc::new(HangingTransport),
        ));
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let err = r
            .run_cascade("op", CASCADE, &OperationRequest::new(), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Cancelled { .. }));
    }
}
