//! Blocking HTTP executor for request descriptors.
//!
//! # Design
//! One configured `ureq::Agent` per transport: non-2xx statuses come back as
//! data (`http_status_as_error(false)`) so status interpretation stays with
//! the caller, and a single global timeout bounds every request. The base
//! URL is injected at construction; descriptors carry relative paths. No
//! retries — every operation is one request, one response.

use std::time::Duration;

use log::debug;
use serde_json::Value;

use crate::error::TransportError;
use crate::http::{Method, Payload, Request, ResponseEnvelope};

/// Bound on each request unless the caller configures its own.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Executes [`Request`] values against a fixed base URL.
#[derive(Debug)]
pub struct Transport {
    base_url: String,
    agent: ureq::Agent,
}

impl Transport {
    pub fn new(base_url: &str) -> Self {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Perform exactly one blocking HTTP exchange.
    ///
    /// Returns one envelope or one error, never both. A body that fails to
    /// parse as JSON is kept as [`Payload::Text`] rather than failing the
    /// call.
    pub fn send(&self, request: &Request) -> Result<ResponseEnvelope, TransportError> {
        if request.path.is_empty() || !request.path.starts_with('/') {
            return Err(TransportError::InvalidRequest(format!(
                "path must be non-empty and start with '/': {:?}",
                request.path
            )));
        }

        let url = format!("{}{}", self.base_url, request.path);
        debug!("{} {}", request.method.as_str(), url);

        let result = match request.method {
            Method::Get => {
                let mut req = self.agent.get(&url);
                for (key, value) in &request.query {
                    req = req.query(key.as_str(), value.as_str());
                }
                for (name, value) in &request.headers {
                    req = req.header(name.as_str(), value.as_str());
                }
                req.call()
            }
            Method::Post => {
                let mut req = self.agent.post(&url);
                for (key, value) in &request.query {
                    req = req.query(key.as_str(), value.as_str());
                }
                for (name, value) in &request.headers {
                    req = req.header(name.as_str(), value.as_str());
                }
                match &request.body {
                    Some(body) => req.send(body.as_bytes()),
                    None => req.send_empty(),
                }
            }
        };

        let mut response = result.map_err(classify)?;

        let status = response.status().as_u16();
        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let is_json = headers.iter().any(|(name, value)| {
            name.eq_ignore_ascii_case("content-type")
                && value.to_ascii_lowercase().contains("json")
        });

        let text = response
            .body_mut()
            .read_to_string()
            .map_err(classify)?;

        let payload = if text.is_empty() {
            Payload::Empty
        } else if is_json {
            match serde_json::from_str::<Value>(&text) {
                Ok(value) => Payload::Json(value),
                Err(_) => Payload::Text(text),
            }
        } else {
            Payload::Text(text)
        };

        debug!("{} {} -> {}", request.method.as_str(), url, status);
        Ok(ResponseEnvelope {
            status,
            headers,
            payload,
        })
    }
}

/// Map a ureq failure onto the error taxonomy. Timeouts get their own
/// variant; everything else transport-level is `Network`.
fn classify(err: ureq::Error) -> TransportError {
    match err {
        ureq::Error::Timeout(_) => TransportError::Timeout,
        ureq::Error::Io(io) if io.kind() == std::io::ErrorKind::TimedOut => TransportError::Timeout,
        other => TransportError::Network(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_stripped() {
        let transport = Transport::new("http://localhost:8080/");
        assert_eq!(transport.base_url(), "http://localhost:8080");
    }

    #[test]
    fn empty_path_is_rejected_before_io() {
        let transport = Transport::new("http://localhost:8080");
        let err = transport.send(&Request::get("")).unwrap_err();
        assert!(matches!(err, TransportError::InvalidRequest(_)));
    }

    #[test]
    fn relative_path_without_slash_is_rejected() {
        let transport = Transport::new("http://localhost:8080");
        let err = transport.send(&Request::get("queue/list")).unwrap_err();
        assert!(matches!(err, TransportError::InvalidRequest(_)));
    }

    #[test]
    fn connection_refused_maps_to_network() {
        // Port 1 on localhost is not listening.
        let transport = Transport::with_timeout("http://127.0.0.1:1", Duration::from_secs(1));
        let err = transport.send(&Request::get("/queue/count")).unwrap_err();
        assert!(
            matches!(err, TransportError::Network(_) | TransportError::Timeout),
            "expected Network or Timeout, got {err:?}"
        );
    }
}
