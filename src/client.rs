// NacosClient - facade for all Open API operations

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::auth::AuthManager;
use crate::config::{ApiVersion, NacosClientConfig};
use crate::constants::{DEFAULT_NAMESPACE_ID, v1_api_path, v2_api_path};
use crate::decode;
use crate::error::{ClientError, Result};
use crate::http::{HttpResponse, HttpTransport};
use crate::model::{
    Config, ConfigKey, HeartbeatInfo, HistoryConfig, Instance, InstanceQuery, InstancesList,
    InstancesQuery, Namespace, NewConfig, NewInstance, NewService, Page, PageQuery, RaftLeader,
    ServerMember, ServerMetrics, ServerSwitches, Service, ServiceKey,
};
use crate::request::ApiRequest;
use crate::watch::{
    ConfigChangeListener, ConfigFetcher, ConfigSnapshot, ConfigWatcher, ListenerHandle,
};

/// Open API client for Nacos: config CRUD and change notification, service
/// discovery, namespace management and server introspection, multiplexed
/// over one authenticated HTTP transport.
pub struct NacosClient {
    version: ApiVersion,
    transport: Arc<HttpTransport>,
    auth: Arc<AuthManager>,
    watcher: ConfigWatcher,
}

/// The v1 config endpoints call the namespace "tenant" and treat the public
/// namespace as the absent parameter.
fn tenant_param(namespace_id: &str) -> Option<String> {
    if namespace_id.is_empty() || namespace_id == DEFAULT_NAMESPACE_ID {
        None
    } else {
        Some(namespace_id.to_string())
    }
}

fn metadata_param(metadata: &HashMap<String, String>) -> Option<String> {
    if metadata.is_empty() {
        None
    } else {
        serde_json::to_string(metadata).ok()
    }
}

/// Fetch the raw content of a config, shared by the facade and the
/// watcher's poll loops.
async fn fetch_content(
    auth: &AuthManager,
    version: ApiVersion,
    key: &ConfigKey,
) -> Result<Option<String>> {
    let request = match version {
        ApiVersion::V1 => ApiRequest::get(v1_api_path::CONFIG)
            .param("dataId", key.data_id.as_str())
            .param("group", key.group.as_str())
            .param_opt("tenant", tenant_param(&key.namespace_id))
            .param_opt("tag", key.tag.clone()),
        ApiVersion::V2 => ApiRequest::get(v2_api_path::CONFIG)
            .param("dataId", key.data_id.as_str())
            .param("group", key.group.as_str())
            .param("namespaceId", key.namespace_id.as_str())
            .param_opt("tag", key.tag.clone()),
    };
    let path = request.path().to_string();
    let response = auth.execute(&request).await?;
    if response.status == 404 {
        return Ok(None);
    }
    check_status(&response, &path)?;

    match version {
        ApiVersion::V1 => Ok(Some(response.text()?.to_string())),
        ApiVersion::V2 => {
            let value = decode::json_value(&response.body).map_err(|e| e.at(&path))?;
            let data = decode::unwrap_envelope(value).map_err(|e| e.at(&path))?;
            match data {
                Value::Null => Ok(None),
                Value::String(content) => Ok(Some(content)),
                other => Err(ClientError::decode(format!(
                    "config content is not a string: {other}"
                ))
                .at(&path)),
            }
        }
    }
}

struct HttpConfigFetcher {
    auth: Arc<AuthManager>,
    version: ApiVersion,
}

#[async_trait]
impl ConfigFetcher for HttpConfigFetcher {
    async fn fetch(&self, key: &ConfigKey) -> Result<Option<ConfigSnapshot>> {
        let content = fetch_content(&self.auth, self.version, key).await?;
        Ok(content.map(ConfigSnapshot::new))
    }
}

fn check_status(response: &HttpResponse, path: &str) -> Result<()> {
    if response.is_success() {
        return Ok(());
    }
    Err(ClientError::Server {
        endpoint: path.to_string(),
        status: response.status,
        body: response.text().unwrap_or("<non-text body>").to_string(),
    })
}

impl NacosClient {
    /// Create a new client with the given configuration. Authentication is
    /// lazy: the first request logs in.
    pub fn new(config: NacosClientConfig) -> Result<Self> {
        let transport = Arc::new(HttpTransport::new(&config)?);
        let auth = Arc::new(AuthManager::new(transport.clone(), &config));
        let fetcher = Arc::new(HttpConfigFetcher {
            auth: auth.clone(),
            version: config.api_version,
        });
        let watcher = ConfigWatcher::new(
            fetcher,
            Duration::from_millis(config.poll_interval_ms),
            Duration::from_millis(config.poll_jitter_ms),
        );

        Ok(Self {
            version: config.api_version,
            transport,
            auth,
            watcher,
        })
    }

    /// Create a client for a single server address with credentials.
    pub fn from_server_addr(addr: &str, username: &str, password: &str) -> Result<Self> {
        Self::new(NacosClientConfig::new(addr).with_auth(username, password))
    }

    /// Stop all watcher loops and release the transport. Further calls fail
    /// fast with [`ClientError::Closed`].
    pub fn close(&self) {
        debug!("closing client");
        self.watcher.shutdown();
        self.transport.close();
    }

    async fn execute(&self, request: &ApiRequest) -> Result<HttpResponse> {
        self.auth.execute(request).await
    }

    /// Parse a response into its JSON payload, unwrapping the `{code,
    /// message, data}` envelope where the surface uses one.
    fn payload(&self, response: &HttpResponse, path: &str, enveloped: bool) -> Result<Value> {
        check_status(response, path)?;
        let value = decode::json_value(&response.body).map_err(|e| e.at(path))?;
        if enveloped {
            decode::unwrap_envelope(value).map_err(|e| e.at(path))
        } else {
            Ok(value)
        }
    }

    /// Interpret the answer of a mutating call. The v1 surface answers with
    /// the literal text "true" or "ok"; the v2 surface wraps a boolean.
    fn ok_response(&self, response: &HttpResponse, path: &str) -> Result<bool> {
        check_status(response, path)?;
        match self.version {
            ApiVersion::V1 => {
                let text = response.text()?.trim().to_string();
                Ok(text == "true" || text == "ok")
            }
            ApiVersion::V2 => {
                let value = decode::json_value(&response.body).map_err(|e| e.at(path))?;
                let data = decode::unwrap_envelope(value).map_err(|e| e.at(path))?;
                match data {
                    Value::Bool(b) => Ok(b),
                    Value::String(s) => Ok(s == "ok" || s == "true"),
                    Value::Null => Ok(true),
                    other => Err(ClientError::decode(format!(
                        "unexpected result payload: {other}"
                    ))
                    .at(path)),
                }
            }
        }
    }

    // ============================================================================
    // Config APIs
    // ============================================================================

    /// Get the plain content of a config, or `None` if it does not exist.
    pub async fn get_config_content(&self, key: &ConfigKey) -> Result<Option<String>> {
        fetch_content(&self.auth, self.version, key).await
    }

    /// Convenience wrapper: content by data id in the public namespace and
    /// default group.
    pub async fn get_content(&self, data_id: &str) -> Result<Option<String>> {
        self.get_config_content(&ConfigKey::new(data_id)).await
    }

    /// Get the full config object, or `None` if it does not exist.
    pub async fn get_config(&self, key: &ConfigKey) -> Result<Option<Config>> {
        let request = match self.version {
            ApiVersion::V1 => ApiRequest::get(v1_api_path::CONFIG)
                .param("dataId", key.data_id.as_str())
                .param("group", key.group.as_str())
                .param_opt("tenant", tenant_param(&key.namespace_id))
                .param_opt("tag", key.tag.clone())
                .param("show", "all"),
            ApiVersion::V2 => ApiRequest::get(v2_api_path::CONFIG)
                .param("dataId", key.data_id.as_str())
                .param("group", key.group.as_str())
                .param("namespaceId", key.namespace_id.as_str())
                .param_opt("tag", key.tag.clone())
                .param("show", "all"),
        };
        let path = request.path().to_string();
        let response = self.execute(&request).await?;
        if response.status == 404 {
            return Ok(None);
        }
        let data = self
            .payload(&response, &path, self.version == ApiVersion::V2)?;

        match data {
            Value::Null => Ok(None),
            // Some v2 servers answer `show=all` with the bare content.
            Value::String(content) => {
                let mut config = Config::default();
                config.namespace_id = key.namespace_id.clone();
                config.group = key.group.clone();
                config.data_id = key.data_id.clone();
                config.md5 = crate::watch::compute_md5(&content);
                config.content = content;
                Ok(Some(config))
            }
            object => Config::from_json(&object).map(Some).map_err(|e| e.at(&path)),
        }
    }

    /// Publish (create or update) a config. Returns whether the server
    /// accepted it.
    pub async fn publish_config(&self, new_config: &NewConfig) -> Result<bool> {
        let key = &new_config.key;
        let request = match self.version {
            ApiVersion::V1 => ApiRequest::post(v1_api_path::CONFIG)
                .param("dataId", key.data_id.as_str())
                .param("group", key.group.as_str())
                .param_opt("tenant", tenant_param(&key.namespace_id))
                .param_opt("tag", key.tag.clone()),
            ApiVersion::V2 => ApiRequest::post(v2_api_path::CONFIG)
                .param("dataId", key.data_id.as_str())
                .param("group", key.group.as_str())
                .param("namespaceId", key.namespace_id.as_str())
                .param_opt("tag", key.tag.clone()),
        };
        let request = request
            .param("content", new_config.content.as_str())
            .param_opt("type", new_config.config_type.map(|t| t.as_str()))
            .param_opt("appName", new_config.app_name.clone())
            .param_opt("desc", new_config.description.clone())
            .param_opt("configTags", new_config.tags.clone());
        let path = request.path().to_string();
        let response = self.execute(&request).await?;
        self.ok_response(&response, &path)
    }

    /// Convenience wrapper: publish plain content under a data id in the
    /// public namespace and default group.
    pub async fn publish_content(&self, data_id: &str, content: &str) -> Result<bool> {
        self.publish_config(&NewConfig::new(ConfigKey::new(data_id), content))
            .await
    }

    /// Delete a config. Returns whether the server deleted it.
    pub async fn delete_config(&self, key: &ConfigKey) -> Result<bool> {
        let request = match self.version {
            ApiVersion::V1 => ApiRequest::delete(v1_api_path::CONFIG)
                .param("dataId", key.data_id.as_str())
                .param("group", key.group.as_str())
                .param_opt("tenant", tenant_param(&key.namespace_id))
                .param_opt("tag", key.tag.clone()),
            ApiVersion::V2 => ApiRequest::delete(v2_api_path::CONFIG)
                .param("dataId", key.data_id.as_str())
                .param("group", key.group.as_str())
                .param("namespaceId", key.namespace_id.as_str())
                .param_opt("tag", key.tag.clone()),
        };
        let path = request.path().to_string();
        let response = self.execute(&request).await?;
        self.ok_response(&response, &path)
    }

    /// Get one page of the change history of a config.
    pub async fn get_history_configs(
        &self,
        key: &ConfigKey,
        page: PageQuery,
    ) -> Result<Page<HistoryConfig>> {
        page.validate()?;
        let request = match self.version {
            ApiVersion::V1 => ApiRequest::get(v1_api_path::CONFIG_HISTORY)
                .param("search", "accurate")
                .param("dataId", key.data_id.as_str())
                .param("group", key.group.as_str())
                .param_opt("tenant", tenant_param(&key.namespace_id)),
            ApiVersion::V2 => ApiRequest::get(v2_api_path::CONFIG_HISTORY_LIST)
                .param("dataId", key.data_id.as_str())
                .param("group", key.group.as_str())
                .param("namespaceId", key.namespace_id.as_str()),
        };
        let request = request
            .param("pageNo", page.page_number.to_string())
            .param("pageSize", page.page_size.to_string());
        let path = request.path().to_string();
        let response = self.execute(&request).await?;
        let data = self
            .payload(&response, &path, self.version == ApiVersion::V2)?;
        Page::from_json(&data, HistoryConfig::from_json).map_err(|e| e.at(&path))
    }

    /// Get one history revision of a config, or `None` if unknown.
    pub async fn get_history_config(
        &self,
        key: &ConfigKey,
        revision: i64,
    ) -> Result<Option<HistoryConfig>> {
        let path_const = match self.version {
            ApiVersion::V1 => v1_api_path::CONFIG_HISTORY,
            ApiVersion::V2 => v2_api_path::CONFIG_HISTORY,
        };
        self.history_lookup(path_const, key, "nid", revision).await
    }

    /// Get the revision directly preceding `revision`, or `None`.
    pub async fn get_previous_history_config(
        &self,
        key: &ConfigKey,
        revision: i64,
    ) -> Result<Option<HistoryConfig>> {
        let path_const = match self.version {
            ApiVersion::V1 => v1_api_path::CONFIG_HISTORY_PREVIOUS,
            ApiVersion::V2 => v2_api_path::CONFIG_HISTORY_PREVIOUS,
        };
        self.history_lookup(path_const, key, "id", revision).await
    }

    async fn history_lookup(
        &self,
        path: &str,
        key: &ConfigKey,
        revision_param: &str,
        revision: i64,
    ) -> Result<Option<HistoryConfig>> {
        let request = match self.version {
            ApiVersion::V1 => ApiRequest::get(path)
                .param("dataId", key.data_id.as_str())
                .param("group", key.group.as_str())
                .param_opt("tenant", tenant_param(&key.namespace_id)),
            ApiVersion::V2 => ApiRequest::get(path)
                .param("dataId", key.data_id.as_str())
                .param("group", key.group.as_str())
                .param("namespaceId", key.namespace_id.as_str()),
        };
        let request = request.param(revision_param, revision.to_string());
        let path = request.path().to_string();
        let response = self.execute(&request).await?;
        if response.status == 404 {
            return Ok(None);
        }
        let data = self
            .payload(&response, &path, self.version == ApiVersion::V2)?;
        match data {
            Value::Null => Ok(None),
            object => HistoryConfig::from_json(&object)
                .map(Some)
                .map_err(|e| e.at(&path)),
        }
    }

    /// Register a listener for changes of a config. The current content is
    /// fetched synchronously to seed change detection, so the listener only
    /// sees later changes.
    pub async fn subscribe_config(
        &self,
        key: ConfigKey,
        listener: Arc<dyn ConfigChangeListener>,
    ) -> Result<ListenerHandle> {
        self.watcher.subscribe(key, listener).await
    }

    /// Remove a config listener. The poll loop for its key stops when no
    /// listener remains.
    pub fn unsubscribe_config(&self, handle: ListenerHandle) -> bool {
        self.watcher.unsubscribe(handle)
    }

    // ============================================================================
    // Discovery: Instance APIs
    // ============================================================================

    fn instance_params(request: ApiRequest, service: &ServiceKey) -> ApiRequest {
        request
            .param("serviceName", service.service_name.as_str())
            .param("groupName", service.group.as_str())
            .param("namespaceId", service.namespace_id.as_str())
    }

    /// Register an instance under a service.
    pub async fn register_instance(&self, instance: &NewInstance) -> Result<bool> {
        let path = match self.version {
            ApiVersion::V1 => v1_api_path::INSTANCE,
            ApiVersion::V2 => v2_api_path::INSTANCE,
        };
        let request = Self::instance_params(ApiRequest::post(path), &instance.service)
            .param("ip", instance.ip.as_str())
            .param("port", instance.port.to_string())
            .param_opt("clusterName", instance.service.cluster.clone())
            .param_opt("weight", instance.weight.map(|w| w.to_string()))
            .param_opt("enabled", instance.enabled.map(|e| e.to_string()))
            .param_opt("healthy", instance.healthy.map(|h| h.to_string()))
            .param("ephemeral", instance.consistency.is_ephemeral().to_string())
            .param_opt("metadata", metadata_param(&instance.metadata));
        let path = request.path().to_string();
        let response = self.execute(&request).await?;
        self.ok_response(&response, &path)
    }

    /// Update a registered instance; parameters mirror registration.
    pub async fn update_instance(&self, instance: &NewInstance) -> Result<bool> {
        let path = match self.version {
            ApiVersion::V1 => v1_api_path::INSTANCE,
            ApiVersion::V2 => v2_api_path::INSTANCE,
        };
        let request = Self::instance_params(ApiRequest::put(path), &instance.service)
            .param("ip", instance.ip.as_str())
            .param("port", instance.port.to_string())
            .param_opt("clusterName", instance.service.cluster.clone())
            .param_opt("weight", instance.weight.map(|w| w.to_string()))
            .param_opt("enabled", instance.enabled.map(|e| e.to_string()))
            .param("ephemeral", instance.consistency.is_ephemeral().to_string())
            .param_opt("metadata", metadata_param(&instance.metadata));
        let path = request.path().to_string();
        let response = self.execute(&request).await?;
        self.ok_response(&response, &path)
    }

    /// Deregister an instance.
    pub async fn deregister_instance(&self, query: &InstanceQuery) -> Result<bool> {
        let path = match self.version {
            ApiVersion::V1 => v1_api_path::INSTANCE,
            ApiVersion::V2 => v2_api_path::INSTANCE,
        };
        let request = Self::instance_params(ApiRequest::delete(path), &query.service)
            .param("ip", query.ip.as_str())
            .param("port", query.port.to_string())
            .param_opt("clusterName", query.service.cluster.clone());
        let path = request.path().to_string();
        let response = self.execute(&request).await?;
        self.ok_response(&response, &path)
    }

    /// Look up one instance, or `None` if it is not registered.
    pub async fn get_instance(&self, query: &InstanceQuery) -> Result<Option<Instance>> {
        let path = match self.version {
            ApiVersion::V1 => v1_api_path::INSTANCE,
            ApiVersion::V2 => v2_api_path::INSTANCE,
        };
        let request = Self::instance_params(ApiRequest::get(path), &query.service)
            .param("ip", query.ip.as_str())
            .param("port", query.port.to_string())
            .param_opt("clusterName", query.service.cluster.clone());
        let path = request.path().to_string();
        let response = self.execute(&request).await?;
        if response.status == 404 {
            return Ok(None);
        }
        let data = self
            .payload(&response, &path, self.version == ApiVersion::V2)?;
        match data {
            Value::Null => Ok(None),
            object => serde_json::from_value(object)
                .map(Some)
                .map_err(|e| ClientError::decode(format!("invalid instance: {e}")).at(&path)),
        }
    }

    /// List the instances of a service.
    pub async fn get_instances_list(&self, query: &InstancesQuery) -> Result<InstancesList> {
        let path = match self.version {
            ApiVersion::V1 => v1_api_path::INSTANCE_LIST,
            ApiVersion::V2 => v2_api_path::INSTANCE_LIST,
        };
        let request = Self::instance_params(ApiRequest::get(path), &query.service)
            .param_opt("clusters", query.service.cluster.clone())
            .param_opt("healthyOnly", query.healthy_only.map(|h| h.to_string()));
        let path = request.path().to_string();
        let response = self.execute(&request).await?;
        let data = self
            .payload(&response, &path, self.version == ApiVersion::V2)?;
        serde_json::from_value(data)
            .map_err(|e| ClientError::decode(format!("invalid instance list: {e}")).at(&path))
    }

    /// Send one heartbeat for an ephemeral instance. Heartbeats are a
    /// v1-surface mechanism and keep that path on both versions.
    pub async fn send_heartbeat(&self, instance: &NewInstance) -> Result<HeartbeatInfo> {
        let beat = serde_json::json!({
            "serviceName": format!("{}@@{}", instance.service.group, instance.service.service_name),
            "ip": instance.ip,
            "port": instance.port,
            "cluster": instance.service.cluster.clone().unwrap_or_default(),
            "weight": instance.weight.unwrap_or(1.0),
            "metadata": instance.metadata,
        });
        let request = Self::instance_params(
            ApiRequest::put(v1_api_path::INSTANCE_BEAT),
            &instance.service,
        )
        .param("ip", instance.ip.as_str())
        .param("port", instance.port.to_string())
        .param("beat", beat.to_string());
        let path = request.path().to_string();
        let response = self.execute(&request).await?;
        check_status(&response, &path)?;
        let value = decode::json_value(&response.body).map_err(|e| e.at(&path))?;
        HeartbeatInfo::from_json(&value).map_err(|e| e.at(&path))
    }

    /// Flag a persistent instance healthy or unhealthy.
    pub async fn update_instance_health(
        &self,
        query: &InstanceQuery,
        healthy: bool,
    ) -> Result<bool> {
        let path = match self.version {
            ApiVersion::V1 => v1_api_path::INSTANCE_HEALTH,
            ApiVersion::V2 => v2_api_path::INSTANCE_HEALTH,
        };
        let request = Self::instance_params(ApiRequest::put(path), &query.service)
            .param("ip", query.ip.as_str())
            .param("port", query.port.to_string())
            .param_opt("clusterName", query.service.cluster.clone())
            .param("healthy", healthy.to_string());
        let path = request.path().to_string();
        let response = self.execute(&request).await?;
        self.ok_response(&response, &path)
    }

    // ============================================================================
    // Discovery: Service APIs
    // ============================================================================

    /// Create a service.
    pub async fn create_service(&self, service: &NewService) -> Result<bool> {
        self.service_upsert(service, false).await
    }

    /// Update a service.
    pub async fn update_service(&self, service: &NewService) -> Result<bool> {
        self.service_upsert(service, true).await
    }

    async fn service_upsert(&self, service: &NewService, update: bool) -> Result<bool> {
        let path = match self.version {
            ApiVersion::V1 => v1_api_path::SERVICE,
            ApiVersion::V2 => v2_api_path::SERVICE,
        };
        let request = if update {
            ApiRequest::put(path)
        } else {
            ApiRequest::post(path)
        };
        let request = Self::instance_params(request, &service.key)
            .param_opt(
                "protectThreshold",
                service.protect_threshold.map(|t| t.to_string()),
            )
            .param_opt("metadata", metadata_param(&service.metadata));
        let path = request.path().to_string();
        let response = self.execute(&request).await?;
        self.ok_response(&response, &path)
    }

    /// Delete a service. Fails server-side while instances remain.
    pub async fn delete_service(&self, key: &ServiceKey) -> Result<bool> {
        let path = match self.version {
            ApiVersion::V1 => v1_api_path::SERVICE,
            ApiVersion::V2 => v2_api_path::SERVICE,
        };
        let request = Self::instance_params(ApiRequest::delete(path), key);
        let path = request.path().to_string();
        let response = self.execute(&request).await?;
        self.ok_response(&response, &path)
    }

    /// Get a service definition, or `None` if unknown.
    pub async fn get_service(&self, key: &ServiceKey) -> Result<Option<Service>> {
        let path = match self.version {
            ApiVersion::V1 => v1_api_path::SERVICE,
            ApiVersion::V2 => v2_api_path::SERVICE,
        };
        let request = Self::instance_params(ApiRequest::get(path), key);
        let path = request.path().to_string();
        let response = self.execute(&request).await?;
        if response.status == 404 {
            return Ok(None);
        }
        let data = self
            .payload(&response, &path, self.version == ApiVersion::V2)?;
        match data {
            Value::Null => Ok(None),
            object => serde_json::from_value(object)
                .map(Some)
                .map_err(|e| ClientError::decode(format!("invalid service: {e}")).at(&path)),
        }
    }

    /// List service names in a namespace/group, one page at a time.
    pub async fn list_service_names(
        &self,
        namespace_id: &str,
        group: &str,
        page: PageQuery,
    ) -> Result<Page<String>> {
        page.validate()?;
        let path = match self.version {
            ApiVersion::V1 => v1_api_path::SERVICE_LIST,
            ApiVersion::V2 => v2_api_path::SERVICE_LIST,
        };
        let request = ApiRequest::get(path)
            .param("namespaceId", namespace_id)
            .param("groupName", group)
            .param("pageNo", page.page_number.to_string())
            .param("pageSize", page.page_size.to_string());
        let path = request.path().to_string();
        let response = self.execute(&request).await?;
        let data = self
            .payload(&response, &path, self.version == ApiVersion::V2)?;

        // The list answer is not a regular page: {count, doms} on v1,
        // {count, services} on v2.
        let total_count = decode::get_u64(&data, "count", &["totalCount"])?
            .unwrap_or(0);
        let names = match data.get("doms").or_else(|| data.get("services")) {
            Some(Value::Array(items)) => items
                .iter()
                .map(|v| {
                    v.as_str().map(str::to_string).ok_or_else(|| {
                        ClientError::decode(format!("service name is not a string: {v}"))
                            .at(&path)
                    })
                })
                .collect::<Result<Vec<_>>>()?,
            _ => Vec::new(),
        };
        let page_size = page.page_size as u64;
        Ok(Page {
            total_count,
            page_number: page.page_number as u64,
            pages_available: total_count.div_ceil(page_size),
            page_items: names,
        })
    }

    // ============================================================================
    // Namespace APIs
    // ============================================================================

    /// List all namespaces.
    pub async fn get_namespaces(&self) -> Result<Vec<Namespace>> {
        let path = match self.version {
            ApiVersion::V1 => v1_api_path::NAMESPACES,
            ApiVersion::V2 => v2_api_path::NAMESPACE_LIST,
        };
        let request = ApiRequest::get(path);
        let path = request.path().to_string();
        let response = self.execute(&request).await?;
        // The namespace console endpoints wrap their data on both surfaces.
        let data = self.payload(&response, &path, true)?;
        serde_json::from_value(data)
            .map_err(|e| ClientError::decode(format!("invalid namespace list: {e}")).at(&path))
    }

    /// Look up one namespace by id, or `None` if unknown.
    pub async fn get_namespace(&self, namespace_id: &str) -> Result<Option<Namespace>> {
        match self.version {
            // The v1 console has no single-namespace lookup.
            ApiVersion::V1 => Ok(self
                .get_namespaces()
                .await?
                .into_iter()
                .find(|n| n.namespace == namespace_id)),
            ApiVersion::V2 => {
                let request =
                    ApiRequest::get(v2_api_path::NAMESPACE).param("namespaceId", namespace_id);
                let path = request.path().to_string();
                let response = self.execute(&request).await?;
                if response.status == 404 {
                    return Ok(None);
                }
                let data = self.payload(&response, &path, true)?;
                match data {
                    Value::Null => Ok(None),
                    object => serde_json::from_value(object).map(Some).map_err(|e| {
                        ClientError::decode(format!("invalid namespace: {e}")).at(&path)
                    }),
                }
            }
        }
    }

    /// Create a namespace.
    pub async fn create_namespace(
        &self,
        namespace_id: &str,
        name: &str,
        description: &str,
    ) -> Result<bool> {
        let request = match self.version {
            ApiVersion::V1 => ApiRequest::post(v1_api_path::NAMESPACES)
                .param("customNamespaceId", namespace_id)
                .param("namespaceName", name)
                .param("namespaceDesc", description),
            ApiVersion::V2 => ApiRequest::post(v2_api_path::NAMESPACE)
                .param("namespaceId", namespace_id)
                .param("namespaceName", name)
                .param("namespaceDesc", description),
        };
        let path = request.path().to_string();
        let response = self.execute(&request).await?;
        self.ok_response(&response, &path)
    }

    /// Update a namespace.
    pub async fn update_namespace(
        &self,
        namespace_id: &str,
        name: &str,
        description: &str,
    ) -> Result<bool> {
        let request = match self.version {
            ApiVersion::V1 => ApiRequest::put(v1_api_path::NAMESPACES)
                .param("namespace", namespace_id)
                .param("namespaceShowName", name)
                .param("namespaceDesc", description),
            ApiVersion::V2 => ApiRequest::put(v2_api_path::NAMESPACE)
                .param("namespaceId", namespace_id)
                .param("namespaceName", name)
                .param("namespaceDesc", description),
        };
        let path = request.path().to_string();
        let response = self.execute(&request).await?;
        self.ok_response(&response, &path)
    }

    /// Delete a namespace.
    pub async fn delete_namespace(&self, namespace_id: &str) -> Result<bool> {
        let request = match self.version {
            ApiVersion::V1 => {
                ApiRequest::delete(v1_api_path::NAMESPACES).param("namespaceId", namespace_id)
            }
            ApiVersion::V2 => {
                ApiRequest::delete(v2_api_path::NAMESPACE).param("namespaceId", namespace_id)
            }
        };
        let path = request.path().to_string();
        let response = self.execute(&request).await?;
        self.ok_response(&response, &path)
    }

    // ============================================================================
    // Server APIs
    // ============================================================================

    /// Get the key/value state report of the answering server node.
    pub async fn get_server_state(&self) -> Result<HashMap<String, Option<String>>> {
        let request = ApiRequest::get(v1_api_path::SERVER_STATE);
        let path = request.path().to_string();
        let response = self.execute(&request).await?;
        check_status(&response, &path)?;
        decode::from_json_bytes(&response.body).map_err(|e| e.at(&path))
    }

    /// Get naming subsystem metrics.
    pub async fn get_server_metrics(&self) -> Result<ServerMetrics> {
        let request = ApiRequest::get(v1_api_path::OPERATOR_METRICS);
        let path = request.path().to_string();
        let response = self.execute(&request).await?;
        check_status(&response, &path)?;
        decode::from_json_bytes(&response.body).map_err(|e| e.at(&path))
    }

    /// List the members of the server cluster.
    pub async fn get_server_members(&self) -> Result<Vec<ServerMember>> {
        let request = ApiRequest::get(v1_api_path::OPERATOR_SERVERS);
        let path = request.path().to_string();
        let response = self.execute(&request).await?;
        check_status(&response, &path)?;
        let value = decode::json_value(&response.body).map_err(|e| e.at(&path))?;
        let members = match value.get("servers").or_else(|| value.get("data")) {
            Some(Value::Array(items)) => items
                .iter()
                .map(|v| ServerMember::from_json(v).map_err(|e| e.at(&path)))
                .collect::<Result<Vec<_>>>()?,
            _ => Vec::new(),
        };
        Ok(members)
    }

    /// Get the operational switches of the naming subsystem.
    pub async fn get_server_switches(&self) -> Result<ServerSwitches> {
        let request = ApiRequest::get(v1_api_path::OPERATOR_SWITCHES);
        let path = request.path().to_string();
        let response = self.execute(&request).await?;
        check_status(&response, &path)?;
        decode::from_json_bytes(&response.body).map_err(|e| e.at(&path))
    }

    // ============================================================================
    // Raft APIs
    // ============================================================================

    /// Get the current raft leader, or `None` if the cluster has none.
    pub async fn get_raft_leader(&self) -> Result<Option<RaftLeader>> {
        let request = ApiRequest::get(v1_api_path::RAFT_LEADER);
        let path = request.path().to_string();
        let response = self.execute(&request).await?;
        check_status(&response, &path)?;
        let value = decode::json_value(&response.body).map_err(|e| e.at(&path))?;
        RaftLeader::from_json(&value).map_err(|e| e.at(&path))
    }

    /// Issue a raft maintenance command.
    pub async fn raft_ops(&self, command: &str, value: &str, group_id: &str) -> Result<String> {
        let request = ApiRequest::post(v1_api_path::CORE_OPS_RAFT)
            .param("command", command)
            .param("value", value)
            .param("groupId", group_id);
        let path = request.path().to_string();
        let response = self.execute(&request).await?;
        check_status(&response, &path)?;
        Ok(response.text()?.to_string())
    }
}
