// Namespace model types

use serde::{Deserialize, Serialize};

/// Namespace information
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Namespace {
    pub namespace: String,
    pub namespace_show_name: String,
    #[serde(default)]
    pub namespace_desc: Option<String>,
    pub quota: i32,
    pub config_count: i32,
    #[serde(rename = "type")]
    pub type_: i32,
}

impl Default for Namespace {
    fn default() -> Self {
        Self {
            namespace: "public".to_string(),
            namespace_show_name: "Public".to_string(),
            namespace_desc: None,
            quota: 200,
            config_count: 0,
            type_: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_deserialization() {
        let json = r#"{
            "namespace": "dev",
            "namespaceShowName": "Development",
            "namespaceDesc": null,
            "quota": 200,
            "configCount": 3,
            "type": 2
        }"#;
        let ns: Namespace = serde_json::from_str(json).unwrap();
        assert_eq!(ns.namespace, "dev");
        assert_eq!(ns.namespace_show_name, "Development");
        assert!(ns.namespace_desc.is_none());
        assert_eq!(ns.config_count, 3);
        assert_eq!(ns.type_, 2);
    }

    #[test]
    fn test_namespace_serialization() {
        let ns = Namespace::default();
        let json = serde_json::to_string(&ns).unwrap();
        assert!(json.contains("\"namespace\":\"public\""));
        assert!(json.contains("\"type\":0"));
    }
}
