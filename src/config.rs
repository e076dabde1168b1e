// Configuration for NacosClient

/// The Open API surface to talk to. The v1 and v2 surfaces expose the same
/// logical operations under materially different endpoint shapes; both are
/// supported side by side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ApiVersion {
    #[default]
    V1,
    V2,
}

/// Configuration for the Nacos Open API client
#[derive(Clone, Debug)]
pub struct NacosClientConfig {
    /// Server addresses (e.g. ["http://127.0.0.1:8848"])
    pub server_addrs: Vec<String>,
    /// Username for authentication; empty means anonymous (auth disabled
    /// on the server)
    pub username: String,
    /// Password for authentication
    pub password: String,
    /// Connection timeout in milliseconds (default: 5000)
    pub connect_timeout_ms: u64,
    /// Read timeout in milliseconds (default: 30000)
    pub read_timeout_ms: u64,
    /// Context path (default: "nacos")
    pub context_path: String,
    /// Which Open API surface to use (default: v1)
    pub api_version: ApiVersion,
    /// Remaining token lifetime below which the client re-authenticates
    /// before attaching the token (default: 300 seconds)
    pub token_refresh_window_secs: u64,
    /// Base interval between config change polls (default: 30000 ms)
    pub poll_interval_ms: u64,
    /// Random jitter applied to each poll interval, in either direction
    /// (default: 3000 ms)
    pub poll_jitter_ms: u64,
}

impl Default for NacosClientConfig {
    fn default() -> Self {
        Self {
            server_addrs: vec!["http://127.0.0.1:8848".to_string()],
            username: String::new(),
            password: String::new(),
            connect_timeout_ms: 5000,
            read_timeout_ms: 30000,
            context_path: "nacos".to_string(),
            api_version: ApiVersion::V1,
            token_refresh_window_secs: 300,
            poll_interval_ms: 30000,
            poll_jitter_ms: 3000,
        }
    }
}

impl NacosClientConfig {
    /// Create a new config with a single server address
    pub fn new(server_addr: &str) -> Self {
        Self {
            server_addrs: vec![server_addr.to_string()],
            ..Default::default()
        }
    }

    /// Create a config with multiple server addresses
    pub fn with_servers(server_addrs: Vec<String>) -> Self {
        Self {
            server_addrs,
            ..Default::default()
        }
    }

    /// Set authentication credentials
    pub fn with_auth(mut self, username: &str, password: &str) -> Self {
        self.username = username.to_string();
        self.password = password.to_string();
        self
    }

    /// Set timeouts
    pub fn with_timeouts(mut self, connect_ms: u64, read_ms: u64) -> Self {
        self.connect_timeout_ms = connect_ms;
        self.read_timeout_ms = read_ms;
        self
    }

    /// Set context path
    pub fn with_context_path(mut self, path: &str) -> Self {
        self.context_path = path.to_string();
        self
    }

    /// Select the Open API surface
    pub fn with_api_version(mut self, version: ApiVersion) -> Self {
        self.api_version = version;
        self
    }

    /// Set the proactive token refresh window
    pub fn with_token_refresh_window(mut self, secs: u64) -> Self {
        self.token_refresh_window_secs = secs;
        self
    }

    /// Set the config change poll interval and jitter
    pub fn with_poll_interval(mut self, interval_ms: u64, jitter_ms: u64) -> Self {
        self.poll_interval_ms = interval_ms;
        self.poll_jitter_ms = jitter_ms;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = NacosClientConfig::default();
        assert_eq!(config.server_addrs, vec!["http://127.0.0.1:8848"]);
        assert!(config.username.is_empty());
        assert_eq!(config.connect_timeout_ms, 5000);
        assert_eq!(config.read_timeout_ms, 30000);
        assert_eq!(config.context_path, "nacos");
        assert_eq!(config.api_version, ApiVersion::V1);
        assert_eq!(config.token_refresh_window_secs, 300);
        assert_eq!(config.poll_interval_ms, 30000);
    }

    #[test]
    fn test_config_builder() {
        let config = NacosClientConfig::new("http://example.com:8848")
            .with_auth("admin", "secret")
            .with_timeouts(3000, 15000)
            .with_context_path("")
            .with_api_version(ApiVersion::V2)
            .with_token_refresh_window(60)
            .with_poll_interval(10000, 1000);

        assert_eq!(config.server_addrs, vec!["http://example.com:8848"]);
        assert_eq!(config.username, "admin");
        assert_eq!(config.password, "secret");
        assert_eq!(config.connect_timeout_ms, 3000);
        assert_eq!(config.read_timeout_ms, 15000);
        assert!(config.context_path.is_empty());
        assert_eq!(config.api_version, ApiVersion::V2);
        assert_eq!(config.token_refresh_window_secs, 60);
        assert_eq!(config.poll_interval_ms, 10000);
        assert_eq!(config.poll_jitter_ms, 1000);
    }

    #[test]
    fn test_config_with_servers() {
        let config = NacosClientConfig::with_servers(vec![
            "http://server1:8848".to_string(),
            "http://server2:8848".to_string(),
        ]);
        assert_eq!(config.server_addrs.len(), 2);
    }
}
