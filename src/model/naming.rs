// Service discovery model types

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::{DEFAULT_GROUP_NAME, DEFAULT_NAMESPACE_ID};
use crate::decode;
use crate::error::Result;

/// Addressing key of a service: namespace, group and cluster all default,
/// only the service name is required.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ServiceKey {
    pub namespace_id: String,
    pub group: String,
    pub service_name: String,
    /// `None` queries across all clusters
    pub cluster: Option<String>,
}

impl ServiceKey {
    pub fn new(service_name: &str) -> Self {
        Self {
            namespace_id: DEFAULT_NAMESPACE_ID.to_string(),
            group: DEFAULT_GROUP_NAME.to_string(),
            service_name: service_name.to_string(),
            cluster: None,
        }
    }

    pub fn with_namespace(mut self, namespace_id: &str) -> Self {
        self.namespace_id = namespace_id.to_string();
        self
    }

    pub fn with_group(mut self, group: &str) -> Self {
        self.group = group.to_string();
        self
    }

    pub fn with_cluster(mut self, cluster: &str) -> Self {
        self.cluster = Some(cluster.to_string());
        self
    }
}

/// Whether an instance registration lives only as long as its owning client
/// session (ephemeral) or is persisted independently.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConsistencyType {
    #[default]
    Ephemeral,
    Persist,
}

impl ConsistencyType {
    pub fn is_ephemeral(&self) -> bool {
        matches!(self, ConsistencyType::Ephemeral)
    }
}

/// One registered network endpoint of a service.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Instance {
    pub instance_id: String,
    pub ip: String,
    pub port: u16,
    pub weight: f64,
    pub healthy: bool,
    pub enabled: bool,
    pub ephemeral: bool,
    pub cluster_name: String,
    pub service_name: String,
    pub metadata: HashMap<String, String>,
}

/// The instances of a service, as returned by the list endpoint.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InstancesList {
    pub name: String,
    pub group_name: String,
    pub clusters: String,
    pub cache_millis: u64,
    pub hosts: Vec<Instance>,
    pub last_ref_time: i64,
    pub checksum: String,
    pub reach_protection_threshold: bool,
}

/// An instance to register.
#[derive(Clone, Debug)]
pub struct NewInstance {
    pub service: ServiceKey,
    pub ip: String,
    pub port: u16,
    pub weight: Option<f64>,
    pub enabled: Option<bool>,
    pub healthy: Option<bool>,
    pub consistency: ConsistencyType,
    pub metadata: HashMap<String, String>,
}

impl NewInstance {
    pub fn new(service: ServiceKey, ip: &str, port: u16) -> Self {
        Self {
            service,
            ip: ip.to_string(),
            port,
            weight: None,
            enabled: None,
            healthy: None,
            consistency: ConsistencyType::Ephemeral,
            metadata: HashMap::new(),
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    pub fn with_healthy(mut self, healthy: bool) -> Self {
        self.healthy = Some(healthy);
        self
    }

    pub fn with_consistency(mut self, consistency: ConsistencyType) -> Self {
        self.consistency = consistency;
        self
    }

    pub fn with_metadata(mut self, metadata: HashMap<String, String>) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Lookup of one instance by service, ip and port.
#[derive(Clone, Debug)]
pub struct InstanceQuery {
    pub service: ServiceKey,
    pub ip: String,
    pub port: u16,
}

impl InstanceQuery {
    pub fn new(service: ServiceKey, ip: &str, port: u16) -> Self {
        Self {
            service,
            ip: ip.to_string(),
            port,
        }
    }
}

/// Lookup of the instance list of a service.
#[derive(Clone, Debug)]
pub struct InstancesQuery {
    pub service: ServiceKey,
    pub healthy_only: Option<bool>,
}

impl InstancesQuery {
    pub fn new(service: ServiceKey) -> Self {
        Self {
            service,
            healthy_only: None,
        }
    }

    pub fn healthy_only(mut self, healthy_only: bool) -> Self {
        self.healthy_only = Some(healthy_only);
        self
    }
}

/// A service definition.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Service {
    pub name: String,
    pub group_name: String,
    pub namespace_id: String,
    pub protect_threshold: f64,
    pub metadata: HashMap<String, String>,
}

/// A service to create or update.
#[derive(Clone, Debug)]
pub struct NewService {
    pub key: ServiceKey,
    pub protect_threshold: Option<f64>,
    pub metadata: HashMap<String, String>,
}

impl NewService {
    pub fn new(key: ServiceKey) -> Self {
        Self {
            key,
            protect_threshold: None,
            metadata: HashMap::new(),
        }
    }

    pub fn with_protect_threshold(mut self, threshold: f64) -> Self {
        self.protect_threshold = Some(threshold);
        self
    }

    pub fn with_metadata(mut self, metadata: HashMap<String, String>) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Server answer to an instance heartbeat.
#[derive(Clone, Debug, Default)]
pub struct HeartbeatInfo {
    /// Interval the server wants between beats, in millis.
    pub client_beat_interval: u64,
    pub code: i64,
    pub light_beat_enabled: bool,
}

impl HeartbeatInfo {
    pub(crate) fn from_json(value: &Value) -> Result<Self> {
        Ok(Self {
            client_beat_interval: decode::get_u64(value, "clientBeatInterval", &["interval"])?
                .unwrap_or(5000),
            code: decode::get_i64(value, "code", &[])?.unwrap_or(0),
            light_beat_enabled: decode::get_bool(value, "lightBeatEnabled", &[])?.unwrap_or(false),
        })
    }
}
