//! HTTP adapters for the catalog client.
//!
//! Implements the [`catalog::Transport`] port twice: [`FormTransport`] for the
//! legacy form-encoded endpoint family and [`JsonTransport`] for the current
//! JSON family. Both share one connection pool.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate must not contain domain rules. It turns a
//! [`catalog::Payload`] into one HTTP request and the response into a
//! [`catalog::Attempt`]; candidate ordering, envelope parsing and fallback all
//! live in `catalog`.

mod exchange;
pub mod error;
pub mod form;
pub mod json;

use std::sync::Arc;

use catalog::{ClientConfig, Transports};

pub use error::TransportError;
pub use form::FormTransport;
pub use json::JsonTransport;

/// Builds both adapters over a single shared `reqwest::Client`.
pub fn http_transports(config: &ClientConfig) -> Result<Transports, TransportError> {
    let http = reqwest::Client::builder()
        .build()
        .map_err(TransportError::ClientBuild)?;
    Ok(Transports::new(
        Arc::new(FormTransport::new(http.clone(), config.clone())),
        Arc::new(JsonTransport::new(http, config.clone())),
    ))
}
