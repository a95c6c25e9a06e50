//! Request descriptions and the replay guard
//!
//! `ApiRequest` describes an outgoing call as rebuildable parts (method,
//! path, query, JSON body) rather than a built `reqwest::Request`, so the
//! replay engine can reissue the identical request with a fresh credential
//! header. `Attempt` threads the once-only retry flag alongside the request
//! instead of mutating the request itself.

use reqwest::Method;

/// Path prefix of credential-issuing endpoints (login, renewal). Requests
/// under it never get a bearer header and never enter the renewal flow.
pub const CREDENTIAL_PATH_PREFIX: &str = "/auth";

/// Path of the session-renewal endpoint, relative to the API base URL.
pub const RENEWAL_PATH: &str = "/auth/refresh";

/// A rebuildable description of one outgoing API call.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<serde_json::Value>,
}

impl ApiRequest {
    /// Describe a request to `path` (relative to the API base URL). A
    /// missing leading slash is added.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        let mut path = path.into();
        if !path.starts_with('/') {
            path.insert(0, '/');
        }
        Self {
            method,
            path,
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append one query pair.
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Attach a JSON body.
    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn body(&self) -> Option<&serde_json::Value> {
        self.body.as_ref()
    }

    /// Whether this request targets a credential-issuing endpoint.
    ///
    /// Exact-segment match: `/auth` and anything under `/auth/`, but not
    /// unrelated paths that merely share the prefix (`/authors`).
    pub fn is_credential_path(&self) -> bool {
        self.path == CREDENTIAL_PATH_PREFIX
            || self
                .path
                .strip_prefix(CREDENTIAL_PATH_PREFIX)
                .is_some_and(|rest| rest.starts_with('/'))
    }
}

/// One request plus its replay state. `retried` is set the first time the
/// request is reissued after a renewal; a request is renewal-retried at most
/// once.
#[derive(Debug)]
pub(crate) struct Attempt {
    pub request: ApiRequest,
    pub retried: bool,
}

impl Attempt {
    pub fn first(request: ApiRequest) -> Self {
        Self {
            request,
            retried: false,
        }
    }
}
