//! Per-call request options.

use bytes::Bytes;
use requests_params::{merge, Map, Value};

use crate::config::{ClientConfig, Timeout};
use crate::request::headers;

/// Optional inputs to a single request.
///
/// Every setter merges into what is already there: headers and map entries
/// are last-wins on key collision.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) params: Map,
    pub(crate) datas: Map,
    pub(crate) raw: Option<Bytes>,
    pub(crate) config: Option<ClientConfig>,
}

impl RequestOptions {
    /// Create an empty option set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Add several headers in order.
    pub fn headers<K, V, I>(mut self, headers: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Add bearer token authorization.
    pub fn bearer_auth(self, token: impl AsRef<str>) -> Self {
        self.header("authorization", format!("Bearer {}", token.as_ref()))
    }

    /// Set content type to JSON, routing structured data through the JSON encoder.
    pub fn json_content(self) -> Self {
        self.header("content-type", headers::CONTENT_TYPE_JSON)
    }

    /// Add one query parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Merge a map of query parameters.
    pub fn params(mut self, params: Map) -> Self {
        merge(&mut self.params, params);
        self
    }

    /// Add one body field.
    pub fn data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.datas.insert(key.into(), value.into());
        self
    }

    /// Merge a map of body fields.
    pub fn datas(mut self, datas: Map) -> Self {
        merge(&mut self.datas, datas);
        self
    }

    /// Send these bytes as the body, ignoring any body fields.
    pub fn raw_data(mut self, body: impl Into<Bytes>) -> Self {
        self.raw = Some(body.into());
        self
    }

    /// Per-call client overrides.
    pub fn config(mut self, config: ClientConfig) -> Self {
        match self.config.as_mut() {
            Some(existing) => existing.update(config),
            None => self.config = Some(config),
        }
        self
    }

    /// Per-call timeout override.
    pub fn timeout(self, timeout: Timeout) -> Self {
        self.config(ClientConfig::with_timeout(timeout))
    }
}
