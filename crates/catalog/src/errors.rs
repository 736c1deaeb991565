//! Error taxonomy for the catalog client.
//!
//! [`ClientError`] names every way a logical operation can fail. It never
//! crosses the public client surface: each public operation converts it into
//! a failed [`crate::ResultEnvelope`] whose single message is the error's
//! `Display` text.
//!
//! Per-attempt transport failures are not represented here. The adapters
//! absorb them into a failed [`crate::Attempt`], which the resolver treats as
//! "try the next candidate".

use thiserror::Error;

/// Failures of a logical catalog operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Every candidate endpoint of the operation's cascade failed.
    #[error("all endpoints failed for {operation}")]
    EndpointsExhausted {
        /// Display name of the logical operation (e.g. `"get_products"`).
        operation: String,
    },

    /// The winning endpoint answered with an empty or blank body.
    #[error("empty response")]
    EmptyResponse,

    /// The body matched neither the wrapped envelope nor the bare target type.
    ///
    /// The raw body is discarded.
    #[error("failed to parse response")]
    ParseFailure,

    /// The wrapped envelope reported `success = false` without any message.
    #[error("upstream reported failure")]
    UpstreamRejected,

    /// The caller cancelled the operation before it completed.
    #[error("{operation} was cancelled")]
    Cancelled {
        /// Display name of the logical operation.
        operation: String,
    },

    /// The client configuration is invalid.
    ///
    /// Produced at construction time; no request is ever sent with an
    /// invalid configuration.
    #[error("configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },
}

impl ClientError {
    /// Builds an [`ClientError::EndpointsExhausted`] for `operation`.
    pub fn exhausted(operation: impl Into<String>) -> Self {
        Self::EndpointsExhausted {
            operation: operation.into(),
        }
    }

    /// Builds a [`ClientError::Cancelled`] for `operation`.
    pub fn cancelled(operation: impl Into<String>) -> Self {
        Self::Cancelled {
            operation: operation.into(),
        }
    }
}
