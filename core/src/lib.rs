//! Synchronous client for a cluster-management HTTP service.
//!
//! # Overview
//! The remote service fronts a pool of managed game servers and a
//! pending-player queue. This crate wraps its HTTP contract with typed
//! request/response handling: a blocking [`Transport`] executes one
//! exchange per call, [`ClusterClient`] exposes one wrapper per endpoint,
//! and the [`sink`] module prints or persists responses as indented JSON.
//!
//! # Design
//! - `Transport` holds the injected base URL and one configured agent with
//!   a bounded per-request timeout; there are no retries.
//! - Each operation is a single request-response exchange returning exactly
//!   one envelope or one [`TransportError`].
//! - Bodies decode as far as safely possible: a JSON-labelled payload that
//!   fails to parse stays available as raw text without failing the call.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod error;
pub mod http;
pub mod sink;
pub mod transport;
pub mod types;

pub use client::ClusterClient;
pub use error::TransportError;
pub use http::{Method, Payload, Request, ResponseEnvelope};
pub use sink::{persist, print, render, Indent, SinkError};
pub use transport::{Transport, DEFAULT_TIMEOUT};
pub use types::{
    ActionOutcome, Health, HostMetrics, LogQuery, PlayerId, QueueCount, QueueView, ServerRecord,
};
