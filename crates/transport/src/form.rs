//! Legacy form-encoded adapter.
//!
//! Every request is a POST with an `application/x-www-form-urlencoded` body.
//! The credential travels three ways: as a `token` form field, as a bearer
//! `Authorization` header and as `X-Auth-Token`. Servers in the wild disagree
//! on which one they read.

use async_trait::async_trait;
use catalog::{Attempt, ClientConfig, HttpMethod, Payload, Transport};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use tracing::debug;
use url::form_urlencoded;

use crate::exchange::{complete, REDACTED};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=UTF-8";
const FORM_ACCEPT: &str = "application/json, text/plain, */*";
const TOKEN_FIELD: &str = "token";
const TOKEN_HEADER: &str = "X-Auth-Token";

#[derive(Debug, Clone)]
pub struct FormTransport {
    http: reqwest::Client,
    config: ClientConfig,
}

impl FormTransport {
    pub fn new(http: reqwest::Client, config: ClientConfig) -> Self {
        Self { http, config }
    }

    /// Caller params named `token` are dropped; the configured credential is
    /// the only `token` field sent.
    fn encode(params: &[(String, String)], token: &str) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params.iter().filter(|(key, _)| key != TOKEN_FIELD))
            .append_pair(TOKEN_FIELD, token)
            .finish()
    }
}

#[async_trait]
impl Transport for FormTransport {
    /// Always POSTs; the legacy family has no GET endpoints, so `method` is
    /// ignored.
    async fn execute(&self, _method: HttpMethod, path: &str, payload: &Payload) -> Attempt {
        let url = self.config.url_for(path);
        let token = self.config.token();

        if self.config.debug() {
            debug!(%url, form = %Self::encode(&payload.params, REDACTED), "posting form");
        }

        let sent = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .header(ACCEPT, FORM_ACCEPT)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header(TOKEN_HEADER, token)
            .body(Self::encode(&payload.params, token))
            .send()
            .await;

        complete(sent, &url, self.config.debug()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_appends_token_last() {
        let params = vec![
            ("limit".to_string(), "50".to_string()),
            ("data".to_string(), r#"[{"a":"b c"}]"#.to_string()),
        ];
        let encoded = FormTransport::encode(&params, "t0k");
        assert!(encoded.starts_with("limit=50&data="));
        assert!(encoded.ends_with("&token=t0k"));
        assert!(!encoded.contains(' '));
    }

    #[test]
    fn test_caller_token_param_cannot_override_credential() {
        let params = vec![
            ("token".to_string(), "forged".to_string()),
            ("page".to_string(), "2".to_string()),
        ];
        let encoded = FormTransport::encode(&params, "t0k");
        let tokens: Vec<_> = form_urlencoded::parse(encoded.as_bytes())
            .filter(|(key, _)| key == TOKEN_FIELD)
            .map(|(_, value)| value.into_owned())
            .collect();
        assert_eq!(tokens, ["t0k"]);
        assert!(encoded.starts_with("page=2&"));
    }
}
