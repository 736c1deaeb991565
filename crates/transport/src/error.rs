//! Transport failures.
//!
//! Only [`TransportError::ClientBuild`] is returned to a caller. The others
//! describe a single request; they are logged and the request is reported as
//! an unsuccessful [`catalog::Attempt`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    /// The HTTP client could not be constructed (e.g. the TLS backend failed
    /// to initialise).
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    /// No response arrived: connection, DNS, TLS or timeout failure.
    #[error("request failed before a response arrived: {0}")]
    Request(#[source] reqwest::Error),

    /// A response arrived but its body could not be read.
    #[error("failed to read response body (status {status}): {source}")]
    Body {
        status: u16,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered outside the 2xx range.
    #[error("server answered with status {0}")]
    Status(u16),
}
