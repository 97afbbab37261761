//! In-memory double of the cluster management service.
//!
//! Implements the HTTP contract the client is written against: player
//! queue, per-host metrics, broadcast, cluster logs, and server management,
//! over shared in-memory state. Response bodies follow the real service's
//! `{success, message, ...}` convention. Used as a dev-dependency by the
//! core crate's integration tests and runnable standalone for manual poking.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QueuedPlayer {
    pub name: String,
    pub uuid: Uuid,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ManagedServer {
    pub name: String,
    pub ip: String,
    pub port: u16,
    pub max_players: u32,
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Debug)]
pub struct ClusterState {
    pub queue: Vec<QueuedPlayer>,
    pub servers: Vec<ManagedServer>,
    pub log: Vec<Value>,
    /// Per-host metric samples keyed by ip, as the spigot side reports them.
    pub metrics: HashMap<String, Value>,
    started: Instant,
}

impl ClusterState {
    pub fn new() -> Self {
        Self {
            queue: Vec::new(),
            servers: Vec::new(),
            log: Vec::new(),
            metrics: HashMap::new(),
            started: Instant::now(),
        }
    }

    pub fn log_event(&mut self, kind: &str, message: String, player: Option<String>) {
        let event = json!({
            "sequence": self.log.len(),
            "type": kind,
            "message": message,
            "player": player,
            "timestamp_ms": epoch_ms(),
        });
        self.log.push(event);
    }
}

impl Default for ClusterState {
    fn default() -> Self {
        Self::new()
    }
}

pub type Db = Arc<RwLock<ClusterState>>;

pub fn db() -> Db {
    Arc::new(RwLock::new(ClusterState::new()))
}

pub fn app() -> Router {
    app_with(db())
}

pub fn app_with(db: Db) -> Router {
    Router::new()
        .route("/queue/list", get(queue_list))
        .route("/queue/count", get(queue_count))
        .route("/queue/remove", post(queue_remove))
        .route("/metrics/queue", get(queue_metrics))
        .route("/metrics/{ip}", get(host_metrics))
        .route("/broadcast/", post(broadcast_all))
        .route("/broadcast/{server}", post(broadcast_server))
        .route("/cluster/logs", get(cluster_logs))
        .route("/server/list", get(server_list))
        .route("/server/add", post(server_add))
        .route("/server/enable", post(server_enable))
        .route("/server/disable", post(server_disable))
        .route("/server/remove", post(server_remove))
        .route("/server/test", get(server_test))
        .route("/health", get(health))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with(listener: TcpListener, db: Db) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(db)).await
}

fn success(message: &str) -> Value {
    json!({"success": true, "message": message})
}

fn failure(message: &str) -> Value {
    json!({"success": false, "message": message})
}

fn epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[derive(Deserialize)]
struct QueueListParams {
    #[serde(rename = "type")]
    kind: Option<String>,
}

async fn queue_list(
    State(db): State<Db>,
    Query(params): Query<QueueListParams>,
) -> Json<Vec<String>> {
    let state = db.read().await;
    let entries = match params.kind.as_deref() {
        Some("uuids") => state.queue.iter().map(|p| p.uuid.to_string()).collect(),
        _ => state.queue.iter().map(|p| p.name.clone()).collect(),
    };
    Json(entries)
}

async fn queue_count(State(db): State<Db>) -> Json<Value> {
    let state = db.read().await;
    Json(json!({"count": state.queue.len()}))
}

#[derive(Deserialize)]
struct QueueRemoveBody {
    player: String,
    #[serde(rename = "type")]
    kind: String,
}

async fn queue_remove(
    State(db): State<Db>,
    Json(body): Json<QueueRemoveBody>,
) -> (StatusCode, Json<Value>) {
    let mut state = db.write().await;
    let before = state.queue.len();
    match body.kind.as_str() {
        "username" => state.queue.retain(|p| p.name != body.player),
        "uuid" => {
            let uuid = match Uuid::parse_str(&body.player) {
                Ok(uuid) => uuid,
                Err(_) => {
                    return (StatusCode::BAD_REQUEST, Json(failure("Invalid UUID format")));
                }
            };
            state.queue.retain(|p| p.uuid != uuid);
        }
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(failure("Invalid type. Valid types: username, uuid")),
            );
        }
    }

    if state.queue.len() < before {
        state.log_event(
            "queue_remove",
            format!("Player {} removed from queue", body.player),
            Some(body.player.clone()),
        );
        (
            StatusCode::OK,
            Json(success(&format!(
                "Player {} removed from queue",
                body.player
            ))),
        )
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(failure(&format!(
                "Player {} not found in queue",
                body.player
            ))),
        )
    }
}

async fn queue_metrics(State(db): State<Db>) -> Json<Value> {
    let state = db.read().await;
    Json(json!({
        "queue_length": state.queue.len(),
        "oldest_wait_seconds": 0,
    }))
}

async fn host_metrics(
    State(db): State<Db>,
    Path(ip): Path<String>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let state = db.read().await;
    match state.metrics.get(&ip) {
        Some(sample) => Ok(Json(sample.clone())),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(failure(&format!("No metrics reported for {ip}"))),
        )),
    }
}

#[derive(Deserialize)]
struct BroadcastBody {
    message: String,
}

async fn broadcast_all(
    State(db): State<Db>,
    Json(body): Json<BroadcastBody>,
) -> Json<Value> {
    let mut state = db.write().await;
    state.log_event("broadcast", body.message.clone(), None);
    let mut response = success("Message broadcasted successfully to all players");
    response["broadcastMessage"] = json!(body.message);
    Json(response)
}

async fn broadcast_server(
    State(db): State<Db>,
    Path(server): Path<String>,
    Json(body): Json<BroadcastBody>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let mut state = db.write().await;
    if !state.servers.iter().any(|s| s.name == server) {
        return Err((
            StatusCode::NOT_FOUND,
            Json(failure(&format!("Server '{server}' not found"))),
        ));
    }
    state.log_event(
        "broadcast",
        format!("[{server}] {}", body.message),
        None,
    );
    let mut response = success("Message broadcasted successfully");
    response["targetServer"] = json!(server);
    response["broadcastMessage"] = json!(body.message);
    Ok(Json(response))
}

#[derive(Deserialize)]
struct LogParams {
    limit: Option<usize>,
    player: Option<String>,
}

async fn cluster_logs(
    State(db): State<Db>,
    Query(params): Query<LogParams>,
) -> Json<Value> {
    let state = db.read().await;
    let mut events: Vec<Value> = match &params.player {
        Some(player) => state
            .log
            .iter()
            .filter(|e| e["player"] == json!(player))
            .cloned()
            .collect(),
        None => state.log.clone(),
    };
    if let Some(limit) = params.limit {
        if events.len() > limit {
            events = events.split_off(events.len() - limit);
        }
    }
    Json(Value::Array(events))
}

async fn server_list(State(db): State<Db>) -> Json<Value> {
    let state = db.read().await;
    let mut response = success("Server list retrieved successfully");
    response["servers"] = json!(state.servers);
    response["totalServers"] = json!(state.servers.len());
    Json(response)
}

#[derive(Deserialize)]
struct AddServerBody {
    name: String,
    ip: String,
    port: u16,
    #[serde(rename = "maxPlayers", default = "default_max_players")]
    max_players: u32,
}

fn default_max_players() -> u32 {
    100
}

async fn server_add(
    State(db): State<Db>,
    Json(body): Json<AddServerBody>,
) -> (StatusCode, Json<Value>) {
    if body.port == 0 {
        return (
            StatusCode::BAD_REQUEST,
            Json(failure("Port must be between 1 and 65535")),
        );
    }
    if body.max_players == 0 {
        return (
            StatusCode::BAD_REQUEST,
            Json(failure("Max players must be greater than 0")),
        );
    }

    let mut state = db.write().await;
    if state.servers.iter().any(|s| s.name == body.name) {
        return (
            StatusCode::CONFLICT,
            Json(failure(&format!(
                "Server with name '{}' already exists",
                body.name
            ))),
        );
    }

    state.servers.push(ManagedServer {
        name: body.name.clone(),
        ip: body.ip.clone(),
        port: body.port,
        max_players: body.max_players,
        enabled: false,
    });
    state.log_event(
        "server_add",
        format!("Server {} registered", body.name),
        None,
    );

    let mut response = success("Server added successfully");
    response["serverName"] = json!(body.name);
    response["serverIp"] = json!(body.ip);
    response["serverPort"] = json!(body.port);
    response["maxPlayers"] = json!(body.max_players);
    (StatusCode::OK, Json(response))
}

#[derive(Deserialize)]
struct ServerNameBody {
    name: String,
}

async fn server_enable(
    State(db): State<Db>,
    Json(body): Json<ServerNameBody>,
) -> (StatusCode, Json<Value>) {
    set_enabled(db, &body.name, true).await
}

async fn server_disable(
    State(db): State<Db>,
    Json(body): Json<ServerNameBody>,
) -> (StatusCode, Json<Value>) {
    set_enabled(db, &body.name, false).await
}

async fn set_enabled(db: Db, name: &str, enabled: bool) -> (StatusCode, Json<Value>) {
    let mut state = db.write().await;
    let found = state
        .servers
        .iter_mut()
        .find(|s| s.name == name)
        .map(|server| server.enabled = enabled)
        .is_some();
    if !found {
        return (
            StatusCode::NOT_FOUND,
            Json(failure(&format!("Server '{name}' not found"))),
        );
    }

    let verb = if enabled { "enabled" } else { "disabled" };
    state.log_event("server_state", format!("Server {name} {verb}"), None);
    let mut response = success(&format!("Server {verb} successfully"));
    let key = if enabled {
        "enabledServer"
    } else {
        "disabledServer"
    };
    response[key] = json!(name);
    (StatusCode::OK, Json(response))
}

async fn server_remove(
    State(db): State<Db>,
    Json(body): Json<ServerNameBody>,
) -> (StatusCode, Json<Value>) {
    let mut state = db.write().await;
    let before = state.servers.len();
    state.servers.retain(|s| s.name != body.name);
    if state.servers.len() < before {
        state.log_event(
            "server_remove",
            format!("Server {} removed", body.name),
            None,
        );
        let mut response = success("Server removed successfully");
        response["removedServer"] = json!(body.name);
        (StatusCode::OK, Json(response))
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(failure(&format!("Server '{}' not found", body.name))),
        )
    }
}

async fn server_test(State(db): State<Db>) -> Json<Value> {
    let state = db.read().await;
    Json(json!({
        "success": true,
        "message": "Cluster API reachable",
        "registeredServers": state.servers.len(),
    }))
}

async fn health(State(db): State<Db>) -> Json<Value> {
    let state = db.read().await;
    Json(json!({
        "status": "healthy",
        "timestamp_ms": epoch_ms(),
        "uptime_ms": state.started.elapsed().as_millis() as u64,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn managed_server_serializes_to_camel_case() {
        let server = ManagedServer {
            name: "lobby".to_string(),
            ip: "localhost".to_string(),
            port: 30001,
            max_players: 1,
            enabled: true,
        };
        let json = serde_json::to_value(&server).unwrap();
        assert_eq!(json["name"], "lobby");
        assert_eq!(json["maxPlayers"], 1);
        assert_eq!(json["enabled"], true);
        assert!(json.get("max_players").is_none());
    }

    #[test]
    fn add_server_body_defaults_max_players() {
        let body: AddServerBody =
            serde_json::from_str(r#"{"name":"lobby","ip":"localhost","port":30001}"#).unwrap();
        assert_eq!(body.max_players, 100);
    }

    #[test]
    fn add_server_body_rejects_out_of_range_port() {
        let result: Result<AddServerBody, _> =
            serde_json::from_str(r#"{"name":"x","ip":"y","port":70000}"#);
        assert!(result.is_err());
    }

    #[test]
    fn log_event_sequence_increments() {
        let mut state = ClusterState::new();
        state.log_event("broadcast", "one".to_string(), None);
        state.log_event("broadcast", "two".to_string(), Some("nath".to_string()));
        assert_eq!(state.log[0]["sequence"], 0);
        assert_eq!(state.log[1]["sequence"], 1);
        assert_eq!(state.log[1]["player"], "nath");
    }
}
