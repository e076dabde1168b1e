//! Client library for the Nacos HTTP Open API
//!
//! Covers configuration management with change notification, service
//! discovery, namespace administration and server introspection, against
//! either the v1 or the v2 API surface. Authentication tokens are acquired,
//! cached and refreshed transparently.
//!
//! # Example
//!
//! ```no_run
//! use nacos_openapi_client::{NacosClient, NacosClientConfig, ConfigKey};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = NacosClient::new(
//!     NacosClientConfig::new("http://127.0.0.1:8848").with_auth("nacos", "nacos"),
//! )?;
//!
//! client.publish_content("app.properties", "a=1").await?;
//! let content = client.get_content("app.properties").await?;
//! assert_eq!(content.as_deref(), Some("a=1"));
//! # Ok(())
//! # }
//! ```

mod auth;
mod client;
mod config;
mod constants;
mod decode;
mod error;
mod http;
mod model;
mod request;
mod watch;

pub use auth::Credential;
pub use client::NacosClient;
pub use config::{ApiVersion, NacosClientConfig};
pub use constants::{
    DEFAULT_CLUSTER_NAME, DEFAULT_GROUP_NAME, DEFAULT_NAMESPACE_ID, DEFAULT_PAGE_NUMBER,
    DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
pub use error::{ClientError, Result};
pub use model::{
    Config, ConfigKey, ConfigOperationType, ConfigType, HeartbeatInfo, HistoryConfig, Instance,
    InstanceQuery, InstancesList, InstancesQuery, Namespace, NewConfig, NewInstance, NewService,
    Page, PageQuery, RaftLeader, ServerMember, ServerMetrics, ServerSwitches, Service, ServiceKey,
    ConsistencyType,
};
pub use watch::{
    ConfigChangeEvent, ConfigChangeListener, FnConfigChangeListener, ListenerHandle,
};
