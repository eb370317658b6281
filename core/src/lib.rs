//! I/O-free client core for the hosted recommendation engine.
//!
//! # Overview
//! Turns engine operations into signed `HttpRequest` values and parses
//! `HttpResponse` values without touching the network (host-does-IO pattern).
//! Whoever owns a transport executes the actual HTTP round-trip, which keeps
//! the core deterministic and testable.
//!
//! # Design
//! - `Request` is the catalog of engine operations; each variant knows its
//!   method, path and parameters.
//! - `RecommClient` is stateless; it holds the endpoint, database id and
//!   secret token used for signing.
//! - Parameters are forwarded verbatim. The engine validates ids, timestamps
//!   and ReQL expressions and reports violations through `ApiError`.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod error;
pub mod http;
pub mod options;
pub mod requests;
pub mod signing;
pub mod types;

pub use client::{RecommClient, DEFAULT_BASE_URL};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use options::{
    DetailViewOptions, InteractionOptions, ItemRecommendationOptions, ListOptions, RecommendationOptions,
    SetValuesOptions,
};
pub use requests::Request;
pub use types::{
    BatchOutcome, DetailView, Listing, PropertyInfo, PropertyType, Purchase, PurchaseRecord, Timestamp, Values,
};
