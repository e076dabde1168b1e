// Server and cluster introspection model types

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::decode;
use crate::error::{ClientError, Result};

/// Naming subsystem metrics.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerMetrics {
    pub status: String,
    pub service_count: u64,
    pub instance_count: u64,
    pub raft_notify_task_count: u64,
    pub responsible_service_count: u64,
    pub responsible_instance_count: u64,
    pub client_count: u64,
    pub cpu: f64,
    pub load: f64,
    pub mem: f64,
}

/// One member of the server cluster.
#[derive(Clone, Debug, Default)]
pub struct ServerMember {
    pub ip: String,
    pub port: u16,
    pub state: Option<String>,
}

impl ServerMember {
    /// The member's port moved from `servePort` to `port` across releases.
    pub(crate) fn from_json(value: &Value) -> Result<Self> {
        let ip = decode::get_str(value, "ip", &[])?
            .ok_or_else(|| ClientError::decode("server member has no 'ip' field"))?;
        let port = decode::get_u64(value, "port", &["servePort"])?.unwrap_or(8848) as u16;
        let state = decode::get_str(value, "state", &["status"])?;
        Ok(Self { ip, port, state })
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.ip, self.port)
    }
}

/// Operational switches of the naming subsystem. Only the commonly consulted
/// subset is modeled; unknown switches are ignored.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSwitches {
    pub name: String,
    pub checksum: String,
    pub client_beat_interval: u64,
    pub default_push_cache_millis: u64,
    pub default_cache_millis: u64,
    pub push_enabled: bool,
    pub distro_enabled: bool,
    pub health_check_enabled: bool,
    pub check_times: u32,
}

/// The current raft leader, as reported by the v1 raft endpoint.
#[derive(Clone, Debug, Default)]
pub struct RaftLeader {
    pub ip: String,
    pub state: Option<String>,
    pub term: Option<i64>,
    pub vote_for: Option<String>,
    pub heartbeat_due_ms: Option<i64>,
    pub leader_due_ms: Option<i64>,
}

impl RaftLeader {
    /// The endpoint nests the leader as a JSON document encoded into a
    /// string field, so this decodes two layers.
    pub(crate) fn from_json(value: &Value) -> Result<Option<Self>> {
        let Some(raw) = decode::get_str(value, "leader", &[])? else {
            return Ok(None);
        };
        let inner = decode::json_value(raw.as_bytes())?;
        let ip = decode::get_str(&inner, "ip", &[])?
            .ok_or_else(|| ClientError::decode("raft leader has no 'ip' field"))?;
        Ok(Some(Self {
            ip,
            state: decode::get_str(&inner, "state", &[])?,
            term: decode::get_i64(&inner, "term", &[])?,
            vote_for: decode::get_str(&inner, "voteFor", &[])?,
            heartbeat_due_ms: decode::get_i64(&inner, "heartbeatDueMs", &[])?,
            leader_due_ms: decode::get_i64(&inner, "leaderDueMs", &[])?,
        }))
    }
}
