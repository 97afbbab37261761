//! Error types for the cluster API client.
//!
//! # Design
//! `Remote` carries the status code and raw body because operators read
//! those directly when a management call is rejected. `Timeout` is separate
//! from `Network` so a slow cluster is distinguishable from an unreachable
//! one. `Decode` failures do not invalidate the HTTP exchange itself.

use std::fmt;

/// Errors returned by the transport and the endpoint wrappers.
#[derive(Debug)]
pub enum TransportError {
    /// The descriptor failed local validation or body serialization; no
    /// request was sent.
    InvalidRequest(String),

    /// The connection could not be established (refused, DNS failure, ...).
    Network(String),

    /// The bounded per-request timeout elapsed.
    Timeout,

    /// The server answered with a status >= 400. Not a transport failure.
    Remote { status: u16, body: String },

    /// The response body was not valid JSON (or not the expected shape)
    /// where JSON was expected.
    Decode(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::InvalidRequest(msg) => {
                write!(f, "invalid request: {msg}")
            }
            TransportError::Network(msg) => write!(f, "network error: {msg}"),
            TransportError::Timeout => write!(f, "request timed out"),
            TransportError::Remote { status, body } => {
                write!(f, "HTTP {status}: {body}")
            }
            TransportError::Decode(msg) => write!(f, "decode failed: {msg}"),
        }
    }
}

impl std::error::Error for TransportError {}
