// Configuration model types

use serde_json::Value;

use crate::constants::{DEFAULT_GROUP_NAME, DEFAULT_NAMESPACE_ID};
use crate::decode;
use crate::error::{ClientError, Result};

/// Addressing key of one configuration entry. A watched resource is unique
/// by exactly this 4-tuple.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ConfigKey {
    /// Namespace (a.k.a. tenant); defaults to "public"
    pub namespace_id: String,
    /// Group; defaults to "DEFAULT_GROUP"
    pub group: String,
    /// Required config name
    pub data_id: String,
    /// Optional tag; `None` means the untagged config
    pub tag: Option<String>,
}

impl ConfigKey {
    /// Create a key for `data_id` in the public namespace and default group.
    pub fn new(data_id: &str) -> Self {
        Self {
            namespace_id: DEFAULT_NAMESPACE_ID.to_string(),
            group: DEFAULT_GROUP_NAME.to_string(),
            data_id: data_id.to_string(),
            tag: None,
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

    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tag = Some(tag.to_string());
        self
    }
}

impl std::fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.namespace_id, self.group, self.data_id)?;
        if let Some(tag) = &self.tag {
            write!(f, "#{tag}")?;
        }
        Ok(())
    }
}

/// Content type of a config entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigType {
    Properties,
    Json,
    Yaml,
    Xml,
    Html,
    Text,
}

impl ConfigType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigType::Properties => "properties",
            ConfigType::Json => "json",
            ConfigType::Yaml => "yaml",
            ConfigType::Xml => "xml",
            ConfigType::Html => "html",
            ConfigType::Text => "text",
        }
    }
}

/// A full configuration entry as returned by the server.
#[derive(Clone, Debug, Default)]
pub struct Config {
    pub id: Option<i64>,
    pub namespace_id: String,
    pub group: String,
    pub data_id: String,
    pub content: String,
    pub md5: String,
    pub config_type: Option<String>,
    pub app_name: Option<String>,
    pub description: Option<String>,
    pub tags: Option<String>,
    pub create_user: Option<String>,
    pub create_ip: Option<String>,
    pub create_time: Option<i64>,
    pub modify_time: Option<i64>,
}

impl Config {
    /// Decode from the JSON object the server returns. Built up field by
    /// field through the tolerant extractors because field names drifted
    /// across releases (`tenant` vs `namespaceId`, `desc` vs `description`).
    pub(crate) fn from_json(value: &Value) -> Result<Self> {
        let mut config = Config::default();
        config.id = decode::get_i64(value, "id", &[])?;
        config.namespace_id = decode::get_str(value, "namespaceId", &["tenant"])?
            .unwrap_or_else(|| DEFAULT_NAMESPACE_ID.to_string());
        config.group = decode::get_str(value, "group", &["groupName"])?
            .unwrap_or_else(|| DEFAULT_GROUP_NAME.to_string());
        config.data_id = decode::get_str(value, "dataId", &[])?
            .ok_or_else(|| ClientError::decode("config has no 'dataId' field"))?;
        config.content = decode::get_str(value, "content", &[])?.unwrap_or_default();
        config.md5 = decode::get_str(value, "md5", &[])?.unwrap_or_default();
        config.config_type = decode::get_str(value, "type", &["configType"])?;
        config.app_name = decode::get_str(value, "appName", &[])?;
        config.description = decode::get_str(value, "desc", &["description"])?;
        config.tags = decode::get_str(value, "configTags", &["tags"])?;
        config.create_user = decode::get_str(value, "createUser", &[])?;
        config.create_ip = decode::get_str(value, "createIp", &[])?;
        config.create_time = decode::get_i64(value, "createTime", &[])?;
        config.modify_time = decode::get_i64(value, "modifyTime", &[])?;
        Ok(config)
    }
}

/// A configuration entry to publish.
#[derive(Clone, Debug)]
pub struct NewConfig {
    pub key: ConfigKey,
    pub content: String,
    pub config_type: Option<ConfigType>,
    pub app_name: Option<String>,
    pub description: Option<String>,
    pub tags: Option<String>,
}

impl NewConfig {
    pub fn new(key: ConfigKey, content: &str) -> Self {
        Self {
            key,
            content: content.to_string(),
            config_type: None,
            app_name: None,
            description: None,
            tags: None,
        }
    }

    pub fn with_type(mut self, config_type: ConfigType) -> Self {
        self.config_type = Some(config_type);
        self
    }

    pub fn with_app_name(mut self, app_name: &str) -> Self {
        self.app_name = Some(app_name.to_string());
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_tags(mut self, tags: &str) -> Self {
        self.tags = Some(tags.to_string());
        self
    }
}

/// Kind of change recorded in a history entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigOperationType {
    Insert,
    Update,
    Delete,
}

impl ConfigOperationType {
    fn parse(s: &str) -> Result<Self> {
        match s.trim() {
            "I" | "INSERT" => Ok(ConfigOperationType::Insert),
            "U" | "UPDATE" => Ok(ConfigOperationType::Update),
            "D" | "DELETE" => Ok(ConfigOperationType::Delete),
            other => Err(ClientError::decode(format!(
                "unknown config operation type: '{other}'"
            ))),
        }
    }
}

/// One revision of a config, from the change history.
#[derive(Clone, Debug, Default)]
pub struct HistoryConfig {
    pub revision: i64,
    pub last_revision: Option<i64>,
    pub namespace_id: String,
    pub group: String,
    pub data_id: String,
    /// Absent in history listings; present when fetching one revision.
    pub content: Option<String>,
    pub md5: Option<String>,
    pub app_name: Option<String>,
    pub operator: Option<String>,
    pub operator_ip: Option<String>,
    pub operation_type: Option<ConfigOperationType>,
    /// Epoch millis, parsed from the fixed history timestamp format.
    pub created_time: Option<i64>,
    pub last_modified_time: Option<i64>,
}

impl HistoryConfig {
    pub(crate) fn from_json(value: &Value) -> Result<Self> {
        let mut history = HistoryConfig::default();
        // The revision travels under "id", sometimes as a numeric string.
        history.revision = decode::get_i64(value, "id", &["revision"])?
            .ok_or_else(|| ClientError::decode("history entry has no 'id' field"))?;
        history.last_revision = decode::get_i64(value, "lastId", &["lastRevision"])?;
        history.namespace_id = decode::get_str(value, "tenant", &["namespaceId"])?
            .unwrap_or_else(|| DEFAULT_NAMESPACE_ID.to_string());
        history.group = decode::get_str(value, "group", &["groupName"])?
            .unwrap_or_else(|| DEFAULT_GROUP_NAME.to_string());
        history.data_id = decode::get_str(value, "dataId", &[])?
            .ok_or_else(|| ClientError::decode("history entry has no 'dataId' field"))?;
        history.content = decode::get_str(value, "content", &[])?;
        history.md5 = decode::get_str(value, "md5", &[])?;
        history.app_name = decode::get_str(value, "appName", &[])?;
        history.operator = decode::get_str(value, "srcUser", &["operator"])?;
        history.operator_ip = decode::get_str(value, "srcIp", &["operatorIp"])?;
        history.operation_type = decode::get_str(value, "opType", &["operationType"])?
            .map(|s| ConfigOperationType::parse(&s))
            .transpose()?;
        history.created_time = decode::get_str(value, "createdTime", &[])?
            .map(|s| decode::parse_timestamp(&s))
            .transpose()?;
        history.last_modified_time = decode::get_str(value, "lastModifiedTime", &[])?
            .map(|s| decode::parse_timestamp(&s))
            .transpose()?;
        Ok(history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_config_key_defaults() {
        let key = ConfigKey::new("app.properties");
        assert_eq!(key.namespace_id, "public");
        assert_eq!(key.group, "DEFAULT_GROUP");
        assert_eq!(key.data_id, "app.properties");
        assert!(key.tag.is_none());
    }

    #[test]
    fn test_config_key_builder_and_display() {
        let key = ConfigKey::new("app.properties")
            .with_namespace("dev")
            .with_group("web")
            .with_tag("beta");
        assert_eq!(key.to_string(), "dev/web/app.properties#beta");
    }

    #[test]
    fn test_config_from_json_with_aliases() {
        let value = json!({
            "id": 7,
            "tenant": "dev",
            "group": "web",
            "dataId": "app.properties",
            "content": "a=1",
            "md5": "abc",
            "type": "properties",
            "appName": null
        });
        let config = Config::from_json(&value).unwrap();
        assert_eq!(config.id, Some(7));
        assert_eq!(config.namespace_id, "dev");
        assert_eq!(config.group, "web");
        assert_eq!(config.content, "a=1");
        assert_eq!(config.config_type.as_deref(), Some("properties"));
        assert!(config.app_name.is_none());
    }

    #[test]
    fn test_config_missing_data_id_is_decode_error() {
        assert!(Config::from_json(&json!({"content": "a=1"})).is_err());
    }

    #[test]
    fn test_history_config_from_json() {
        let value = json!({
            "id": "42",
            "lastId": 41,
            "tenant": "public",
            "group": "DEFAULT_GROUP",
            "dataId": "app.properties",
            "srcUser": "nacos",
            "srcIp": "127.0.0.1",
            "opType": "U ",
            "createdTime": "2010-05-05T00:00:00.000+08:00",
            "lastModifiedTime": "2010-05-06T00:00:00.000+08:00"
        });
        let history = HistoryConfig::from_json(&value).unwrap();
        assert_eq!(history.revision, 42);
        assert_eq!(history.last_revision, Some(41));
        assert_eq!(history.operator.as_deref(), Some("nacos"));
        assert_eq!(history.operation_type, Some(ConfigOperationType::Update));
        assert_eq!(history.created_time, Some(1273017600000));
        assert_eq!(history.last_modified_time, Some(1273104000000));
    }

    #[test]
    fn test_history_config_bad_timestamp_is_decode_error() {
        let value = json!({
            "id": 1,
            "dataId": "a",
            "createdTime": "yesterday"
        });
        assert!(HistoryConfig::from_json(&value).is_err());
    }

    #[test]
    fn test_operation_type_parse() {
        assert_eq!(
            ConfigOperationType::parse("I").unwrap(),
            ConfigOperationType::Insert
        );
        assert_eq!(
            ConfigOperationType::parse("DELETE").unwrap(),
            ConfigOperationType::Delete
        );
        assert!(ConfigOperationType::parse("X").is_err());
    }
}
