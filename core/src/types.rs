//! Wire DTOs for the cluster management API.
//!
//! # Design
//! These types mirror the service's JSON schema but are defined
//! independently of the mock-server crate; integration tests catch schema
//! drift. Field names follow the wire (`maxPlayers`, `process_cpu_percent`),
//! not Rust convention, via serde renames. Responses whose shape varies by
//! server version (server list, cluster logs, diagnostics) intentionally
//! have no DTO and stay untyped envelopes.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A managed game server as the cluster's add/list endpoints describe it.
///
/// The client only marshals this; name uniqueness and port validity are
/// enforced remotely.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServerRecord {
    pub name: String,
    pub ip: String,
    pub port: u16,
    pub max_players: u32,
}

/// Representation of entries returned by `/queue/list`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueueView {
    /// Player names, the server default.
    #[default]
    Names,
    /// Stable identifiers, requested with `type=uuids`.
    Uuids,
}

/// Identifier accepted by `/queue/remove`. The `type` discriminator on the
/// wire is `"username"` or `"uuid"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerId {
    Username(String),
    Uuid(Uuid),
}

/// Body for `/queue/remove`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueRemoval {
    pub player: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl From<&PlayerId> for QueueRemoval {
    fn from(id: &PlayerId) -> Self {
        match id {
            PlayerId::Username(name) => QueueRemoval {
                player: name.clone(),
                kind: "username".to_string(),
            },
            PlayerId::Uuid(uuid) => QueueRemoval {
                player: uuid.to_string(),
                kind: "uuid".to_string(),
            },
        }
    }
}

/// Response of `/queue/count`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct QueueCount {
    pub count: u64,
}

/// CPU readings reported by `/metrics/{ip}`. Additional fields the server
/// may send are ignored.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct HostMetrics {
    pub process_cpu_percent: f64,
    pub system_cpu_percent: f64,
}

/// The `{success, message}` pair every management endpoint answers with.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionOutcome {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

/// Response of `/health`.
#[derive(Debug, Clone, Deserialize)]
pub struct Health {
    pub status: String,
    #[serde(default)]
    pub uptime_ms: u64,
}

/// Body for `/broadcast/` and `/broadcast/{server}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Broadcast {
    pub message: String,
}

/// Body for the name-keyed `/server/*` management calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerName {
    pub name: String,
}

/// Optional filters for `/cluster/logs`.
#[derive(Debug, Clone, Default)]
pub struct LogQuery {
    pub limit: Option<u32>,
    pub player: Option<String>,
}
