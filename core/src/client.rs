//! Typed wrappers over the transport for each remote operation.
//!
//! # Design
//! `ClusterClient` owns a [`Transport`] and exposes one method per endpoint.
//! Descriptor construction lives in standalone builder functions so request
//! shape is unit-testable without I/O. Every wrapper converts a status >=
//! 400 into [`TransportError::Remote`]; endpoints with a known response
//! shape decode into a DTO, the rest (log dumps, diagnostics, server list)
//! hand back the raw envelope.

use crate::error::TransportError;
use crate::http::{Request, ResponseEnvelope};
use crate::transport::Transport;
use crate::types::{
    ActionOutcome, Broadcast, Health, HostMetrics, LogQuery, PlayerId, QueueCount, QueueRemoval,
    QueueView, ServerName, ServerRecord,
};

/// Synchronous client for the cluster management API.
#[derive(Debug)]
pub struct ClusterClient {
    transport: Transport,
}

impl ClusterClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            transport: Transport::new(base_url),
        }
    }

    /// Use a transport configured by the caller (custom timeout).
    pub fn with_transport(transport: Transport) -> Self {
        Self { transport }
    }

    fn send(&self, request: Request) -> Result<ResponseEnvelope, TransportError> {
        self.transport.send(&request)?.require_success()
    }

    /// GET `/queue/list`, optionally as UUIDs.
    pub fn queue_list(&self, view: QueueView) -> Result<Vec<String>, TransportError> {
        self.send(queue_list_request(view))?.decode()
    }

    /// GET `/queue/count`.
    pub fn queue_count(&self) -> Result<QueueCount, TransportError> {
        self.send(Request::get("/queue/count"))?.decode()
    }

    /// POST `/queue/remove` with a name- or UUID-keyed identifier.
    pub fn queue_remove(&self, player: &PlayerId) -> Result<ActionOutcome, TransportError> {
        self.send(queue_remove_request(player)?)?.decode()
    }

    /// GET `/metrics/queue`. The payload shape is server-defined.
    pub fn queue_metrics(&self) -> Result<ResponseEnvelope, TransportError> {
        self.send(Request::get("/metrics/queue"))
    }

    /// GET `/metrics/{ip}` and extract the CPU readings.
    pub fn host_metrics(&self, ip: &str) -> Result<HostMetrics, TransportError> {
        self.send(host_metrics_request(ip))?.decode()
    }

    /// POST `/broadcast/` to every server.
    pub fn broadcast(&self, message: &str) -> Result<ActionOutcome, TransportError> {
        self.send(broadcast_request(None, message)?)?.decode()
    }

    /// POST `/broadcast/{server}` to a single server.
    pub fn broadcast_to(&self, server: &str, message: &str) -> Result<ActionOutcome, TransportError> {
        self.send(broadcast_request(Some(server), message)?)?.decode()
    }

    /// GET `/cluster/logs`. Large structured payload, commonly persisted.
    pub fn cluster_logs(&self, query: &LogQuery) -> Result<ResponseEnvelope, TransportError> {
        self.send(cluster_logs_request(query))
    }

    /// GET `/server/list`.
    pub fn server_list(&self) -> Result<ResponseEnvelope, TransportError> {
        self.send(Request::get("/server/list"))
    }

    /// POST `/server/add`.
    pub fn server_add(&self, record: &ServerRecord) -> Result<ActionOutcome, TransportError> {
        self.send(Request::post("/server/add").json(record)?)?.decode()
    }

    /// POST `/server/enable`.
    pub fn server_enable(&self, name: &str) -> Result<ActionOutcome, TransportError> {
        self.send(server_name_request("/server/enable", name)?)?.decode()
    }

    /// POST `/server/disable`.
    pub fn server_disable(&self, name: &str) -> Result<ActionOutcome, TransportError> {
        self.send(server_name_request("/server/disable", name)?)?.decode()
    }

    /// POST `/server/remove`.
    pub fn server_remove(&self, name: &str) -> Result<ActionOutcome, TransportError> {
        self.send(server_name_request("/server/remove", name)?)?.decode()
    }

    /// GET `/server/test`, an opaque diagnostic endpoint.
    pub fn server_test(&self) -> Result<ResponseEnvelope, TransportError> {
        self.send(Request::get("/server/test"))
    }

    /// GET `/health`.
    pub fn health(&self) -> Result<Health, TransportError> {
        self.send(Request::get("/health"))?.decode()
    }
}

fn queue_list_request(view: QueueView) -> Request {
    let request = Request::get("/queue/list");
    match view {
        QueueView::Names => request,
        QueueView::Uuids => request.query("type", "uuids"),
    }
}

fn queue_remove_request(player: &PlayerId) -> Result<Request, TransportError> {
    Request::post("/queue/remove").json(&QueueRemoval::from(player))
}

fn host_metrics_request(ip: &str) -> Request {
    Request::get(format!("/metrics/{ip}"))
}

fn broadcast_request(target: Option<&str>, message: &str) -> Result<Request, TransportError> {
    let path = match target {
        None => "/broadcast/".to_string(),
        Some(server) => format!("/broadcast/{server}"),
    };
    Request::post(path).json(&Broadcast {
        message: message.to_string(),
    })
}

fn cluster_logs_request(query: &LogQuery) -> Request {
    let mut request = Request::get("/cluster/logs");
    if let Some(limit) = query.limit {
        request = request.query("limit", limit.to_string());
    }
    if let Some(player) = &query.player {
        request = request.query("player", player);
    }
    request
}

fn server_name_request(path: &str, name: &str) -> Result<Request, TransportError> {
    Request::post(path).json(&ServerName {
        name: name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{Method, Payload};
    use serde_json::{json, Value};
    use uuid::Uuid;

    fn body_json(request: &Request) -> Value {
        serde_json::from_str(request.body.as_deref().unwrap()).unwrap()
    }

    #[test]
    fn queue_list_request_default_has_no_query() {
        let req = queue_list_request(QueueView::Names);
        assert_eq!(req.method, Method::Get);
        assert_eq!(req.path, "/queue/list");
        assert!(req.query.is_empty());
        assert!(req.body.is_none());
    }

    #[test]
    fn queue_list_request_uuids_sets_type_param() {
        let req = queue_list_request(QueueView::Uuids);
        assert_eq!(
            req.query,
            vec![("type".to_string(), "uuids".to_string())]
        );
    }

    #[test]
    fn queue_remove_request_by_username() {
        let req = queue_remove_request(&PlayerId::Username("nath".to_string())).unwrap();
        assert_eq!(req.method, Method::Post);
        assert_eq!(req.path, "/queue/remove");
        let body = body_json(&req);
        assert_eq!(body["player"], "nath");
        assert_eq!(body["type"], "username");
    }

    #[test]
    fn queue_remove_request_by_uuid() {
        let req = queue_remove_request(&PlayerId::Uuid(Uuid::nil())).unwrap();
        let body = body_json(&req);
        assert_eq!(body["player"], "00000000-0000-0000-0000-000000000000");
        assert_eq!(body["type"], "uuid");
    }

    #[test]
    fn host_metrics_request_embeds_ip_in_path() {
        let req = host_metrics_request("26.177.172.5");
        assert_eq!(req.method, Method::Get);
        assert_eq!(req.path, "/metrics/26.177.172.5");
    }

    #[test]
    fn broadcast_request_to_all_servers() {
        let req = broadcast_request(None, "restart in 5 minutes").unwrap();
        assert_eq!(req.method, Method::Post);
        assert_eq!(req.path, "/broadcast/");
        assert_eq!(body_json(&req)["message"], "restart in 5 minutes");
    }

    #[test]
    fn broadcast_request_to_single_server() {
        let req = broadcast_request(Some("lobby"), "hello").unwrap();
        assert_eq!(req.path, "/broadcast/lobby");
    }

    #[test]
    fn cluster_logs_request_without_filters() {
        let req = cluster_logs_request(&LogQuery::default());
        assert_eq!(req.path, "/cluster/logs");
        assert!(req.query.is_empty());
    }

    #[test]
    fn cluster_logs_request_with_filters() {
        let query = LogQuery {
            limit: Some(100),
            player: Some("nath".to_string()),
        };
        let req = cluster_logs_request(&query);
        assert_eq!(
            req.query,
            vec![
                ("limit".to_string(), "100".to_string()),
                ("player".to_string(), "nath".to_string()),
            ]
        );
    }

    #[test]
    fn server_add_body_matches_wire_schema() {
        let record = ServerRecord {
            name: "survival-1".to_string(),
            ip: "192.168.1.100".to_string(),
            port: 25565,
            max_players: 50,
        };
        let req = Request::post("/server/add").json(&record).unwrap();
        let body = body_json(&req);
        assert_eq!(body["name"], "survival-1");
        assert_eq!(body["ip"], "192.168.1.100");
        assert_eq!(body["port"], 25565);
        assert_eq!(body["maxPlayers"], 50);
    }

    #[test]
    fn server_name_request_shape() {
        let req = server_name_request("/server/enable", "survival-1").unwrap();
        assert_eq!(req.method, Method::Post);
        assert_eq!(req.path, "/server/enable");
        assert_eq!(body_json(&req)["name"], "survival-1");
    }

    #[test]
    fn typed_decode_of_queue_count_envelope() {
        let envelope = ResponseEnvelope {
            status: 200,
            headers: Vec::new(),
            payload: Payload::Json(json!({"count": 3})),
        };
        let count: QueueCount = envelope.decode().unwrap();
        assert_eq!(count.count, 3);
    }

    #[test]
    fn typed_decode_of_host_metrics_envelope() {
        let envelope = ResponseEnvelope {
            status: 200,
            headers: Vec::new(),
            payload: Payload::Json(
                json!({"process_cpu_percent": 12.5, "system_cpu_percent": 40.1}),
            ),
        };
        let metrics: HostMetrics = envelope.decode().unwrap();
        assert_eq!(metrics.process_cpu_percent, 12.5);
        assert_eq!(metrics.system_cpu_percent, 40.1);
    }

    #[test]
    fn typed_decode_of_wrong_shape_is_decode_error() {
        let envelope = ResponseEnvelope {
            status: 200,
            headers: Vec::new(),
            payload: Payload::Json(json!({"unexpected": true})),
        };
        let err = envelope.decode::<QueueCount>().unwrap_err();
        assert!(matches!(err, TransportError::Decode(_)));
    }
}
