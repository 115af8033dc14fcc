//! Rust client library for the SmartData REST APIs.
//!
//! SmartData exposes two roots: the "in" API administers streams and sources,
//! the "out" API serves stream contents. Every request carries the caller's
//! `login`/`password` pair as headers.
//!
//! Public API layers:
//! - [`SmartDataClient`]/[`BlockingSmartDataClient`]: list and fetch streams
//!   and sources, or send raw requests to either root.
//! - [`DataStream`]/[`DataSource`] (and their blocking counterparts): entity
//!   handles with data, field and administration operations.
//! - [`callback`]: continuation-style delivery for callers that do not await.
//! - [`ClientError`]: unified error type used by all clients.

mod blocking_client;
pub mod callback;
mod client;
mod config;
mod entity;
mod error;
mod params;
mod record;
mod request;

/// Blocking client and its entity handles.
pub use blocking_client::{BlockingDataSource, BlockingDataStream, BlockingSmartDataClient};
/// Async client.
pub use client::SmartDataClient;
pub use config::{ClientConfig, Credentials, DEFAULT_IN_API, DEFAULT_OUT_API};
/// Async entity handles.
pub use entity::{DataSource, DataStream};
/// Error type returned by all client operations.
pub use error::ClientError;
pub use params::{DataQuery, MappingProposal, Pagination, SortOrder, ValuesQuery};
pub use record::{ID_FIELD, Record};
pub use request::{
    Api, LOGIN_HEADER, PASSWORD_HEADER, PreparedRequest, RequestOptions, SUPPORTED_METHODS,
    prepare, query_pairs,
};
pub use reqwest::Method;
