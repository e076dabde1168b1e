// Model types for Open API requests and responses

pub mod common;
pub mod config;
pub mod namespace;
pub mod naming;
pub mod server;

pub use common::{Page, PageQuery};
pub use config::{Config, ConfigKey, ConfigOperationType, ConfigType, HistoryConfig, NewConfig};
pub use namespace::Namespace;
pub use naming::{
    ConsistencyType, HeartbeatInfo, Instance, InstanceQuery, InstancesList, InstancesQuery,
    NewInstance, NewService, Service, ServiceKey,
};
pub use server::{RaftLeader, ServerMember, ServerMetrics, ServerSwitches};
