//! Client error types for the Nacos Open API SDK

/// Error type for all client operations.
///
/// "Not found" is never an error: operations looking up a single resource
/// return `Ok(None)` when the server has no such resource.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Network, connection or timeout failure. Safe for the caller to retry.
    #[error("transport error calling {endpoint}: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a payload the client could not interpret.
    /// Indicates a protocol mismatch; never retried.
    #[error("decode error at {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    /// Login failed, or the server kept rejecting a freshly acquired token.
    #[error("auth failed: {0}")]
    Auth(String),

    /// Caller-supplied parameters violate a documented constraint.
    /// Raised before any network call is made.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The server answered with a non-success status.
    #[error("server returned status {status} for {endpoint}: {body}")]
    Server {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// The client was closed; no further requests are possible.
    #[error("client is closed")]
    Closed,
}

impl ClientError {
    /// Build a decode error with no endpoint attached yet; the call site
    /// that knows the endpoint fills it in via [`ClientError::at`].
    pub(crate) fn decode(message: impl Into<String>) -> Self {
        ClientError::Decode {
            endpoint: String::new(),
            message: message.into(),
        }
    }

    /// Attach the endpoint to a decode error raised below the transport layer.
    pub(crate) fn at(self, endpoint: &str) -> Self {
        match self {
            ClientError::Decode { endpoint: e, message } if e.is_empty() => ClientError::Decode {
                endpoint: endpoint.to_string(),
                message,
            },
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
