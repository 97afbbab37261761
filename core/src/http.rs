//! HTTP request and response types shared by the transport and the
//! endpoint catalog.
//!
//! # Design
//! Requests and responses are plain owned data. A `Request` describes one
//! outbound exchange before any I/O happens; the transport executes it and
//! hands back a `ResponseEnvelope` with the body decoded as far as safely
//! possible. A JSON-labelled body that fails to parse stays available as raw
//! text, so "transport succeeded, payload wasn't JSON" never masquerades as
//! a transport failure.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::TransportError;

/// HTTP method for a request. The remote contract only uses GET and POST.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// An outbound HTTP request described as plain data.
///
/// Paths are relative to the transport's base URL and must start with `/`.
/// Built by the endpoint catalog, executed by [`crate::Transport::send`].
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl Request {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Attach a JSON body and the matching content-type header.
    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self, TransportError> {
        let body = serde_json::to_string(body)
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
        self.headers
            .push(("content-type".to_string(), "application/json".to_string()));
        self.body = Some(body);
        Ok(self)
    }
}

/// Response body, decoded as far as the content type allows.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Content-Type indicated JSON and the body parsed.
    Json(Value),
    /// Anything else, including JSON-labelled bodies that failed to parse.
    Text(String),
    Empty,
}

impl Payload {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Payload::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Raw textual form of the body, for error reporting.
    pub fn raw_text(&self) -> String {
        match self {
            Payload::Json(value) => value.to_string(),
            Payload::Text(text) => text.clone(),
            Payload::Empty => String::new(),
        }
    }
}

/// A received HTTP response.
///
/// Constructed by the transport after one exchange. Status and headers stay
/// accessible even when the payload turned out not to be JSON.
#[derive(Debug, Clone)]
pub struct ResponseEnvelope {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub payload: Payload,
}

impl ResponseEnvelope {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Case-insensitive header lookup; first match wins.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Turn a status >= 400 into [`TransportError::Remote`], keeping the raw
    /// body for the operator.
    pub fn require_success(self) -> Result<Self, TransportError> {
        if self.status >= 400 {
            return Err(TransportError::Remote {
                status: self.status,
                body: self.payload.raw_text(),
            });
        }
        Ok(self)
    }

    /// The parsed JSON payload, or [`TransportError::Decode`] if the body
    /// was not valid JSON.
    pub fn json(&self) -> Result<&Value, TransportError> {
        match &self.payload {
            Payload::Json(value) => Ok(value),
            Payload::Text(_) => Err(TransportError::Decode(
                "body is not valid JSON".to_string(),
            )),
            Payload::Empty => Err(TransportError::Decode("body is empty".to_string())),
        }
    }

    /// Deserialize the JSON payload into a typed value.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, TransportError> {
        let value = self.json()?;
        serde_json::from_value(value.clone()).map_err(|e| TransportError::Decode(e.to_string()))
    }
}
