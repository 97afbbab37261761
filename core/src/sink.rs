//! Output handling for envelopes: console rendering and file persistence.
//!
//! # Design
//! Persisted files are written atomically: the payload is serialized fully
//! in memory, written to a sibling `.tmp` file, then renamed over the
//! destination. A non-JSON payload or an I/O failure never leaves a partial
//! file behind. Console output is a status line plus the payload at 2-space
//! indent; persisted files take 2- or 4-space indent per call site.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::http::{Payload, ResponseEnvelope};

/// Indentation of persisted JSON files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Indent {
    #[default]
    Two,
    Four,
}

impl Indent {
    fn as_bytes(self) -> &'static [u8] {
        match self {
            Indent::Two => b"  ",
            Indent::Four => b"    ",
        }
    }
}

/// Errors from [`persist`].
#[derive(Debug)]
pub enum SinkError {
    /// The envelope's payload is not JSON; nothing was written.
    NotJson,
    Io(std::io::Error),
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkError::NotJson => write!(f, "response body is not JSON"),
            SinkError::Io(err) => write!(f, "file write failed: {err}"),
        }
    }
}

impl std::error::Error for SinkError {}

impl From<std::io::Error> for SinkError {
    fn from(err: std::io::Error) -> Self {
        SinkError::Io(err)
    }
}

/// Human-readable form of an envelope: a status line, then the payload.
pub fn render(envelope: &ResponseEnvelope) -> String {
    let mut out = format!("HTTP {}\n", envelope.status);
    match &envelope.payload {
        Payload::Json(value) => {
            out.push_str(&serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string()));
        }
        Payload::Text(text) => out.push_str(text),
        Payload::Empty => out.push_str("(empty body)"),
    }
    out
}

/// Render to stdout.
pub fn print(envelope: &ResponseEnvelope) {
    println!("{}", render(envelope));
}

/// Write the JSON payload to `path`, atomically, at the given indent.
pub fn persist(envelope: &ResponseEnvelope, path: &Path, indent: Indent) -> Result<(), SinkError> {
    let value = match &envelope.payload {
        Payload::Json(value) => value,
        _ => return Err(SinkError::NotJson),
    };

    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(indent.as_bytes());
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut ser)
        .map_err(|err| SinkError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, err)))?;

    let tmp = tmp_path(path);
    if let Err(err) = fs::write(&tmp, &buf) {
        let _ = fs::remove_file(&tmp);
        return Err(SinkError::Io(err));
    }
    fs::rename(&tmp, path).map_err(|err| {
        let _ = fs::remove_file(&tmp);
        SinkError::Io(err)
    })?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "out".into());
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn json_envelope(status: u16, value: Value) -> ResponseEnvelope {
        ResponseEnvelope {
            status,
            headers: Vec::new(),
            payload: Payload::Json(value),
        }
    }

    #[test]
    fn render_uses_two_space_indent() {
        let envelope = json_envelope(200, json!({"count": 3}));
        let out = render(&envelope);
        assert!(out.starts_with("HTTP 200\n"));
        assert!(out.contains("\n  \"count\": 3"), "got: {out}");
    }

    #[test]
    fn render_raw_text_and_empty() {
        let text = ResponseEnvelope {
            status: 200,
            headers: Vec::new(),
            payload: Payload::Text("plain".to_string()),
        };
        assert_eq!(render(&text), "HTTP 200\nplain");

        let empty = ResponseEnvelope {
            status: 204,
            headers: Vec::new(),
            payload: Payload::Empty,
        };
        assert_eq!(render(&empty), "HTTP 204\n(empty body)");
    }

    #[test]
    fn persist_roundtrips_deep_equal() {
        let entries: Vec<Value> = (0..500)
            .map(|i| json!({"index": i, "message": format!("event {i}")}))
            .collect();
        let original = Value::Array(entries);
        let envelope = json_envelope(200, original.clone());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs.json");
        persist(&envelope, &path, Indent::Two).unwrap();

        assert!(fs::metadata(&path).unwrap().len() > 0);
        let reread: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(reread, original);
    }

    #[test]
    fn persist_four_space_indent() {
        let envelope = json_envelope(200, json!({"name": "lobby"}));
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("response_server.json");
        persist(&envelope, &path, Indent::Four).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("\n    \"name\""), "got: {written}");
    }

    #[test]
    fn persist_refuses_non_json_without_touching_the_file() {
        let envelope = ResponseEnvelope {
            status: 200,
            headers: Vec::new(),
            payload: Payload::Text("not json".to_string()),
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let err = persist(&envelope, &path, Indent::Two).unwrap_err();
        assert!(matches!(err, SinkError::NotJson));
        assert!(!path.exists());
    }

    #[test]
    fn persist_replaces_existing_file_completely() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        fs::write(&path, "{\"stale\": true, \"padding\": \"xxxxxxxxxxxxxxxx\"}").unwrap();

        let envelope = json_envelope(200, json!({"fresh": 1}));
        persist(&envelope, &path, Indent::Two).unwrap();

        let reread: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(reread, json!({"fresh": 1}));
    }
}
