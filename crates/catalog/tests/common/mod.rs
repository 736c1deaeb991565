//! In-memory transports shared by the client integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use catalog::{Attempt, CatalogClient, HttpMethod, Payload, Transport, Transports};

/// One recorded call.
#[derive(Debug, Clone)]
pub struct Call {
    pub method: HttpMethod,
    pub path: String,
    pub payload: Payload,
}

/// Answers by path; unrouted paths are transport failures.
#[derive(Default)]
pub struct RoutedTransport {
    routes: Mutex<HashMap<String, Attempt>>,
    rejected: Mutex<Vec<(String, String)>>,
    calls: Mutex<Vec<Call>>,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl RoutedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_delay(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay: Some(delay),
            ..Self::default()
        })
    }

    pub fn route(&self, path: &str, status: u16, body: &str) {
        self.routes
            .lock()
            .unwrap()
            .insert(path.to_string(), Attempt::completed(status, body));
    }

    /// Fails any call carrying `key=value`, whatever its path.
    pub fn reject_param(&self, key: &str, value: &str) {
        self.rejected
            .lock()
            .unwrap()
            .push((key.to_string(), value.to_string()));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.path).collect()
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for RoutedTransport {
    async fn execute(&self, method: HttpMethod, path: &str, payload: &Payload) -> Attempt {
        self.calls.lock().unwrap().push(Call {
            method,
            path: path.to_string(),
            payload: payload.clone(),
        });

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let rejected = self
            .rejected
            .lock()
            .unwrap()
            .iter()
            .any(|pair| payload.params.contains(pair));
        if rejected {
            return Attempt::completed(500, "rejected");
        }

        self.routes
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .unwrap_or_else(Attempt::transport_failure)
    }
}

/// A client over the two fakes.
pub fn client(form: &Arc<RoutedTransport>, json: &Arc<RoutedTransport>) -> CatalogClient {
    CatalogClient::new(Transports::new(form.clone(), json.clone()))
}

/// The form-encoded value of `key` in a recorded call.
pub fn param<'a>(call: &'a Call, key: &str) -> Option<&'a str> {
    call.payload
        .params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}
