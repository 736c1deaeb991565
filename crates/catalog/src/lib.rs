//! Resilient catalog/order client for T-Soft storefront backends.
//!
//! A storefront exposes the same business operations through two endpoint
//! generations: a legacy form-encoded API and a current JSON API, each with
//! several path variants. This crate hides that churn: every operation walks an
//! ordered candidate cascade, normalizes whatever envelope shape answers, and
//! returns a uniform [`ResultEnvelope`].
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate performs no network I/O.
//! It defines the [`Transport`] port; the `transport` crate supplies the HTTP
//! adapters.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`ProductCode`, `OrderId`, `RequestId`, etc.) |
//! | [`types`] | Shared value types (`Text`, `ListQuery`, `Timestamp`) |
//! | [`errors`] | `ClientError` |
//! | [`envelope`] | `ResultEnvelope` and the wrapped wire shape |
//! | [`models`] | Records exchanged with the backend |
//! | [`normalize`] | Response-body normalization and key folding |
//! | [`endpoints`] | Candidate cascades per operation |
//! | [`transport`] | The `Transport` port and per-operation request data |
//! | [`resolver`] | Sequential candidate fallback |
//! | [`category_tree`] | Forest reconciliation and breadcrumb labeling |
//! | [`bulk`] | Bounded-parallel per-key fetches |
//! | [`enrichment`] | Joining categories and images onto products |
//! | [`config`] | Validated connection settings |
//! | [`client`] | `CatalogClient`, the public operation surface |

pub mod bulk;
pub mod category_tree;
pub mod client;
pub mod config;
pub mod endpoints;
pub mod enrichment;
pub mod envelope;
pub mod errors;
pub mod identifiers;
pub mod models;
pub mod normalize;
pub mod resolver;
pub mod transport;
pub mod types;

pub use client::CatalogClient;
pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use endpoints::{EndpointCandidate, HttpMethod, Operation, Protocol};
pub use envelope::ResultEnvelope;
pub use errors::ClientError;
pub use identifiers::{CategoryCode, CustomerId, OrderId, ProductCode, RequestId};
pub use models::{
    BatchOutcome, CargoCompany, Category, Customer, FailedProduct, NewProduct, Order,
    OrderDetail, OrderStatusInfo, PaymentType, Product, ProductImage,
};
pub use transport::{Attempt, Payload, Transport, Transports};
pub use types::{ListQuery, Text, Timestamp};
