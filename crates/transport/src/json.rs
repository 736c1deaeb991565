//! Current-generation JSON adapter.
//!
//! GET candidates receive the payload parameters as a query string; POST
//! candidates receive the payload body as JSON with every `null` member
//! removed. Authentication is a bearer header only.

use async_trait::async_trait;
use catalog::{Attempt, ClientConfig, HttpMethod, Payload, Transport};
use reqwest::header::ACCEPT;
use serde_json::Value;
use tracing::debug;

use crate::exchange::complete;

const JSON_ACCEPT: &str = "application/json";

#[derive(Debug, Clone)]
pub struct JsonTransport {
    http: reqwest::Client,
    config: ClientConfig,
}

impl JsonTransport {
    pub fn new(http: reqwest::Client, config: ClientConfig) -> Self {
        Self { http, config }
    }
}

#[async_trait]
impl Transport for JsonTransport {
    async fn execute(&self, method: HttpMethod, path: &str, payload: &Payload) -> Attempt {
        let url = self.config.url_for(path);
        let debug_enabled = self.config.debug();

        let request = match method {
            HttpMethod::Get => {
                if debug_enabled {
                    debug!(%url, params = ?payload.params, "sending GET");
                }
                self.http.get(&url).query(&payload.params)
            }
            HttpMethod::Post => {
                let body = payload.body.clone().map(prune_nulls).unwrap_or(Value::Null);
                if debug_enabled {
                    debug!(%url, %body, "sending POST");
                }
                self.http.post(&url).json(&body)
            }
        };

        let sent = request
            .header(ACCEPT, JSON_ACCEPT)
            .bearer_auth(self.config.token())
            .send()
            .await;

        complete(sent, &url, debug_enabled).await
    }
}

/// Removes `null` object members at every depth. Array elements are kept,
/// nulls included, so positions do not shift.
pub fn prune_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, prune_nulls(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(prune_nulls).collect()),
        other => other,
    }
}
