//! Authentication manager: token acquisition, caching and transparent refresh
//!
//! Every outgoing request passes through here. The manager keeps one
//! credential per client instance, replaces it wholesale on refresh, and
//! re-authenticates synchronously when the remaining lifetime drops below
//! the configured refresh window. A request rejected with 401/403 despite a
//! seemingly valid token invalidates the cached credential and is re-issued
//! exactly once with a fresh one.

use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::config::{ApiVersion, NacosClientConfig};
use crate::constants::{ACCESS_TOKEN_PARAM, v1_api_path, v2_api_path};
use crate::decode;
use crate::error::{ClientError, Result};
use crate::http::{HttpResponse, HttpTransport};
use crate::request::ApiRequest;

/// One issued access token. Never mutated: a refresh installs a new
/// credential and the old one is discarded.
#[derive(Clone, Debug)]
pub struct Credential {
    pub access_token: String,
    pub token_ttl: Duration,
    pub global_admin: bool,
    issued_at: Instant,
}

impl Credential {
    fn from_login_response(body: &[u8]) -> Result<Self> {
        let value = decode::json_value(body)?;
        let access_token = decode::get_str(&value, "accessToken", &["token"])?
            .ok_or_else(|| ClientError::Auth("login response carried no access token".to_string()))?;
        let ttl_secs = decode::get_u64(&value, "tokenTtl", &["ttl"])?.unwrap_or(18000);
        let global_admin = decode::get_bool(&value, "globalAdmin", &[])?.unwrap_or(false);

        Ok(Self {
            access_token,
            token_ttl: Duration::from_secs(ttl_secs),
            global_admin,
            issued_at: Instant::now(),
        })
    }

    /// Remaining lifetime as measured on the local clock.
    pub fn remaining(&self) -> Duration {
        self.token_ttl.saturating_sub(self.issued_at.elapsed())
    }
}

/// Owns the credential state machine and wraps the transport with token
/// attachment and the bounded one-retry policy on rejection.
pub struct AuthManager {
    transport: Arc<HttpTransport>,
    username: String,
    password: String,
    login_path: &'static str,
    refresh_window: Duration,
    credential: RwLock<Option<Arc<Credential>>>,
    // Serializes logins so concurrent callers produce exactly one network
    // login and observe the same credential.
    login_lock: Mutex<()>,
}

impl AuthManager {
    pub fn new(transport: Arc<HttpTransport>, config: &NacosClientConfig) -> Self {
        let login_path = match config.api_version {
            ApiVersion::V1 => v1_api_path::AUTH_LOGIN,
            ApiVersion::V2 => v2_api_path::AUTH_LOGIN,
        };
        Self {
            transport,
            username: config.username.clone(),
            password: config.password.clone(),
            login_path,
            refresh_window: Duration::from_secs(config.token_refresh_window_secs),
            credential: RwLock::new(None),
            login_lock: Mutex::new(()),
        }
    }

    /// Whether this client authenticates at all. An empty username means the
    /// server runs with auth disabled and requests go out untouched.
    pub fn enabled(&self) -> bool {
        !self.username.is_empty()
    }

    fn cached(&self) -> Option<Arc<Credential>> {
        self.credential
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn store(&self, credential: Arc<Credential>) {
        *self.credential.write().unwrap_or_else(|e| e.into_inner()) = Some(credential);
    }

    /// Drop the cached credential, but only if it is still the one the
    /// caller saw rejected; a racing refresh may already have replaced it.
    fn invalidate(&self, rejected: &Arc<Credential>) {
        let mut guard = self.credential.write().unwrap_or_else(|e| e.into_inner());
        if let Some(current) = guard.as_ref()
            && Arc::ptr_eq(current, rejected)
        {
            *guard = None;
        }
    }

    fn is_fresh(&self, credential: &Credential) -> bool {
        credential.remaining() > self.refresh_window
    }

    /// Perform the login call and install the resulting credential.
    async fn login(&self) -> Result<Arc<Credential>> {
        let request = ApiRequest::post(self.login_path)
            .param("username", self.username.as_str())
            .param("password", self.password.as_str());
        let response = self.transport.execute(&request).await?;

        if !response.is_success() {
            return Err(ClientError::Auth(format!(
                "login rejected with status {}",
                response.status
            )));
        }

        let credential = Arc::new(Credential::from_login_response(&response.body)?);
        debug!(
            "authenticated, token expires in {} seconds",
            credential.token_ttl.as_secs()
        );
        self.store(credential.clone());
        Ok(credential)
    }

    /// Get a credential whose remaining lifetime is above the refresh
    /// window, logging in if the cached one is absent or expiring.
    pub async fn credential(&self) -> Result<Arc<Credential>> {
        if let Some(credential) = self.cached()
            && self.is_fresh(&credential)
        {
            return Ok(credential);
        }

        let _guard = self.login_lock.lock().await;
        // Re-check under the lock: a concurrent caller may have logged in
        // while this one was waiting.
        if let Some(credential) = self.cached()
            && self.is_fresh(&credential)
        {
            return Ok(credential);
        }
        self.login().await
    }

    /// Attach a valid token to the request. In anonymous mode the request is
    /// returned unchanged.
    pub async fn attach(&self, request: &ApiRequest) -> Result<ApiRequest> {
        if !self.enabled() {
            return Ok(request.clone());
        }
        let credential = self.credential().await?;
        Ok(request.with_param(ACCESS_TOKEN_PARAM, credential.access_token.as_str()))
    }

    /// Execute a request with a token attached. A 401/403 answer despite a
    /// cached token (clock skew, server-side revocation) invalidates the
    /// credential and re-issues the request exactly once before surfacing
    /// the error.
    pub async fn execute(&self, request: &ApiRequest) -> Result<HttpResponse> {
        if !self.enabled() {
            return self.transport.execute(request).await;
        }

        let credential = self.credential().await?;
        let response = self
            .transport
            .execute(&request.with_param(ACCESS_TOKEN_PARAM, credential.access_token.as_str()))
            .await?;
        if !is_rejected(&response) {
            return Ok(response);
        }

        warn!(
            "request to {} rejected with status {}, re-authenticating",
            request.path(),
            response.status
        );
        self.invalidate(&credential);
        let credential = self.credential().await?;
        let response = self
            .transport
            .execute(&request.with_param(ACCESS_TOKEN_PARAM, credential.access_token.as_str()))
            .await?;
        if is_rejected(&response) {
            return Err(ClientError::Auth(format!(
                "request to {} rejected with status {} after re-authentication",
                request.path(),
                response.status
            )));
        }
        Ok(response)
    }
}

fn is_rejected(response: &HttpResponse) -> bool {
    response.status == 401 || response.status == 403
}
