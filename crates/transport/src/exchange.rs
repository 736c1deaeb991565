//! Response handling shared by both adapters.

use catalog::Attempt;
use tracing::{debug, warn};

use crate::TransportError;

/// Longest response excerpt written to debug logs.
pub(crate) const LOGGED_BODY_LIMIT: usize = 500;

/// Placeholder logged in place of the credential.
pub(crate) const REDACTED: &str = "<redacted>";

/// Turns the outcome of `send()` into an [`Attempt`].
///
/// Transport errors, including a body that cannot be read, are logged as
/// [`TransportError`] and become [`Attempt::transport_failure`]. Non-2xx
/// responses keep their body.
pub(crate) async fn complete(
    sent: Result<reqwest::Response, reqwest::Error>,
    url: &str,
    log_bodies: bool,
) -> Attempt {
    let response = match sent {
        Ok(response) => response,
        Err(err) => {
            let error = TransportError::Request(err);
            warn!(%url, %error, "request failed");
            return Attempt::transport_failure();
        }
    };

    let status = response.status().as_u16();
    let accepted = response.status().is_success();
    let body = match response.text().await {
        Ok(body) => body,
        Err(source) => {
            let error = TransportError::Body { status, source };
            warn!(%url, %error, "request failed");
            return Attempt::transport_failure();
        }
    };

    if !accepted {
        let error = TransportError::Status(status);
        debug!(%url, %error, "request rejected");
    }

    if log_bodies {
        debug!(%url, status, body = %excerpt(&body), "response received");
    }
    Attempt::completed(status, body)
}

/// The first [`LOGGED_BODY_LIMIT`] characters of `body`.
pub(crate) fn excerpt(body: &str) -> String {
    match body.char_indices().nth(LOGGED_BODY_LIMIT) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
