//! HTTP transport for the Open API
//!
//! The transport executes one [`ApiRequest`] at a time over a pooled
//! `reqwest` client and surfaces the raw status and body. It never retries
//! and never interprets status codes; that is the business of the auth
//! layer and the domain operations sitting above it.

use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use bytes::Bytes;
use reqwest::Client;
use tracing::{debug, warn};

use crate::config::NacosClientConfig;
use crate::error::{ClientError, Result};
use crate::request::{ApiRequest, Method};

/// Raw result of one executed request.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// View the body as UTF-8 text.
    pub fn text(&self) -> Result<&str> {
        std::str::from_utf8(&self.body)
            .map_err(|_| ClientError::decode("response body is not valid UTF-8"))
    }
}

/// HTTP transport with connection pooling and server failover rotation.
///
/// A connection error rotates to the next configured server so the *next*
/// call lands elsewhere, but the failed call itself is surfaced, not
/// retried.
pub struct HttpTransport {
    client: Client,
    server_addrs: Vec<String>,
    context_path: String,
    current_server_index: RwLock<usize>,
    closed: AtomicBool,
}

impl HttpTransport {
    pub fn new(config: &NacosClientConfig) -> Result<Self> {
        if config.server_addrs.is_empty() {
            return Err(ClientError::Validation(
                "at least one server address is required".to_string(),
            ));
        }
        let client = Client::builder()
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .timeout(Duration::from_millis(config.read_timeout_ms))
            .build()
            .map_err(|e| ClientError::Transport {
                endpoint: String::new(),
                source: e,
            })?;

        Ok(Self {
            client,
            server_addrs: config.server_addrs.clone(),
            context_path: config.context_path.clone(),
            current_server_index: RwLock::new(0),
            closed: AtomicBool::new(false),
        })
    }

    /// Get the current server URL
    fn current_server(&self) -> &str {
        let index = *self
            .current_server_index
            .read()
            .unwrap_or_else(|e| e.into_inner());
        &self.server_addrs[index]
    }

    /// Switch to the next server (for failover)
    fn switch_to_next_server(&self) {
        let mut index = self
            .current_server_index
            .write()
            .unwrap_or_else(|e| e.into_inner());
        *index = (*index + 1) % self.server_addrs.len();
        debug!("switched to server index {}", *index);
    }

    /// Build full URL with context path
    fn build_url(&self, path: &str) -> String {
        let base_url = self.current_server();
        if self.context_path.is_empty() {
            format!("{}{}", base_url, path)
        } else {
            format!(
                "{}/{}{}",
                base_url,
                self.context_path.trim_start_matches('/'),
                path
            )
        }
    }

    /// Execute a request, returning the raw status and body.
    pub async fn execute(&self, request: &ApiRequest) -> Result<HttpResponse> {
        if self.closed.load(Ordering::Acquire) {
            return Err(ClientError::Closed);
        }

        let url = self.build_url(request.path());
        let mut builder = match request.method() {
            // GET and DELETE carry parameters in the query string; POST and
            // PUT carry them as a form body, per the Open API convention.
            Method::Get => self.client.get(&url).query(request.params()),
            Method::Delete => self.client.delete(&url).query(request.params()),
            Method::Post => self.client.post(&url).form(request.params()),
            Method::Put => self.client.put(&url).form(request.params()),
        };
        for (name, value) in request.headers() {
            builder = builder.header(name, value);
        }

        let response = match builder.send().await {
            Ok(r) => r,
            Err(e) => {
                warn!("request to {} failed: {}, rotating server", request.path(), e);
                self.switch_to_next_server();
                return Err(ClientError::Transport {
                    endpoint: request.path().to_string(),
                    source: e,
                });
            }
        };

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| ClientError::Transport {
                endpoint: request.path().to_string(),
                source: e,
            })?;

        Ok(HttpResponse { status, body })
    }

    /// Close the transport. Pooled connections are released when the inner
    /// client drops; any call made after this fails fast with
    /// [`ClientError::Closed`].
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport(config: NacosClientConfig) -> HttpTransport {
        HttpTransport::new(&config).unwrap()
    }

    #[test]
    fn test_build_url_with_context() {
        let t = transport(NacosClientConfig::new("http://localhost:8848"));
        assert_eq!(
            t.build_url("/v1/cs/configs"),
            "http://localhost:8848/nacos/v1/cs/configs"
        );
    }

    #[test]
    fn test_build_url_no_context() {
        let t = transport(NacosClientConfig::new("http://localhost:8848").with_context_path(""));
        assert_eq!(
            t.build_url("/v1/cs/configs"),
            "http://localhost:8848/v1/cs/configs"
        );
    }

    #[test]
    fn test_build_url_leading_slash_context() {
        let t = transport(NacosClientConfig::new("http://localhost:8848").with_context_path("/nacos"));
        assert_eq!(
            t.build_url("/v1/test"),
            "http://localhost:8848/nacos/v1/test"
        );
    }

    #[test]
    fn test_no_servers_is_validation_error() {
        let config = NacosClientConfig::with_servers(vec![]);
        assert!(matches!(
            HttpTransport::new(&config),
            Err(ClientError::Validation(_))
        ));
    }

    #[test]
    fn test_server_rotation() {
        let t = transport(NacosClientConfig::with_servers(vec![
            "http://a:8848".to_string(),
            "http://b:8848".to_string(),
        ]));
        assert_eq!(t.current_server(), "http://a:8848");
        t.switch_to_next_server();
        assert_eq!(t.current_server(), "http://b:8848");
        t.switch_to_next_server();
        assert_eq!(t.current_server(), "http://a:8848");
    }

    #[tokio::test]
    async fn test_execute_after_close_fails_fast() {
        let t = transport(NacosClientConfig::new("http://localhost:1"));
        t.close();
        assert!(t.is_closed());
        let err = t
            .execute(&ApiRequest::get("/v1/cs/configs"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Closed));
    }
}
