//! Immutable request descriptors consumed by the transport
//!
//! A request is built once, then shared freely: attaching an access token
//! produces a new descriptor rather than mutating the original.

/// HTTP method of an [`ApiRequest`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

/// An immutable description of one Open API call: endpoint path, method,
/// keyed parameters and optional headers.
///
/// GET and DELETE requests carry their parameters in the query string;
/// POST and PUT requests carry them as a URL-encoded form body, which is
/// the convention the Nacos Open API expects.
#[derive(Clone, Debug)]
pub struct ApiRequest {
    method: Method,
    path: String,
    params: Vec<(String, String)>,
    headers: Vec<(String, String)>,
}

impl ApiRequest {
    fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            params: Vec::new(),
            headers: Vec::new(),
        }
    }

    pub fn get(path: &str) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: &str) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: &str) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn delete(path: &str) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Add a parameter.
    pub fn param(mut self, name: &str, value: impl Into<String>) -> Self {
        self.params.push((name.to_string(), value.into()));
        self
    }

    /// Add a parameter only if a value is present; `None` means the
    /// parameter is omitted from the wire entirely.
    pub fn param_opt(self, name: &str, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(v) => self.param(name, v),
            None => self,
        }
    }

    /// Add a header.
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    /// Produce a copy of this request with one extra parameter. Used by the
    /// auth layer to attach the access token without touching the original.
    pub fn with_param(&self, name: &str, value: impl Into<String>) -> Self {
        self.clone().param(name, value)
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let req = ApiRequest::get("/v1/cs/configs")
            .param("dataId", "app.properties")
            .param("group", "DEFAULT_GROUP")
            .header("Accept", "text/plain");

        assert_eq!(req.method(), Method::Get);
        assert_eq!(req.path(), "/v1/cs/configs");
        assert_eq!(req.params().len(), 2);
        assert_eq!(req.params()[0], ("dataId".to_string(), "app.properties".to_string()));
        assert_eq!(req.headers().len(), 1);
    }

    #[test]
    fn test_param_opt_none_is_omitted() {
        let req = ApiRequest::get("/v1/cs/configs")
            .param("dataId", "app.properties")
            .param_opt("tag", None::<String>)
            .param_opt("tenant", Some("dev"));

        let names: Vec<&str> = req.params().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["dataId", "tenant"]);
    }

    #[test]
    fn test_with_param_leaves_original_untouched() {
        let req = ApiRequest::post("/v1/cs/configs").param("dataId", "a");
        let attached = req.with_param("accessToken", "tok");

        assert_eq!(req.params().len(), 1);
        assert_eq!(attached.params().len(), 2);
        assert_eq!(attached.params()[1].0, "accessToken");
    }
}
