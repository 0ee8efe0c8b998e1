//! Request construction.

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, USER_AGENT};
use reqwest::Method;
use requests_params::{build_query, Map, Order};
use url::Url;

use crate::config::ClientConfig;
use crate::error::HttpError;
use crate::options::RequestOptions;

/// Common HTTP headers.
pub mod headers {
    pub const CONTENT_TYPE_JSON: &str = "application/json";
    pub const CONTENT_TYPE_FORM: &str = "application/x-www-form-urlencoded";
    pub const DEFAULT_USER_AGENT: &str = concat!("requests-rs/", env!("CARGO_PKG_VERSION"));
}

/// A fully built request: method, URL with query, headers and final body.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Bytes,
    config: Option<ClientConfig>,
}

/// Headers every request starts from.
pub fn default_headers() -> HeaderMap {
    let mut map = HeaderMap::new();
    map.insert(
        USER_AGENT,
        HeaderValue::from_static(headers::DEFAULT_USER_AGENT),
    );
    map
}

/// Parse a header pair.
pub(crate) fn header_pair(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), HttpError> {
    let header_name = HeaderName::try_from(name).map_err(|e| HttpError::InvalidHeader {
        name: name.to_string(),
        message: e.to_string(),
    })?;
    let header_value = HeaderValue::try_from(value).map_err(|e| HttpError::InvalidHeader {
        name: name.to_string(),
        message: e.to_string(),
    })?;
    Ok((header_name, header_value))
}

impl Request {
    /// Build a request starting from [`default_headers`].
    pub fn build(method: Method, url: &str, options: RequestOptions) -> Result<Self, HttpError> {
        Self::build_with(method, url, &default_headers(), options)
    }

    /// Build a request starting from `base` headers.
    ///
    /// A raw body always wins over body fields. Without a raw body, fields
    /// are encoded according to the content type, which defaults to
    /// form-urlencoded. Params are appended to any query already in `url`.
    pub fn build_with(
        method: Method,
        url: &str,
        base: &HeaderMap,
        options: RequestOptions,
    ) -> Result<Self, HttpError> {
        let mut parsed = Url::parse(url).map_err(|source| HttpError::MalformedUrl {
            url: url.to_string(),
            source,
        })?;

        let RequestOptions {
            headers: option_headers,
            params,
            datas,
            raw,
            config,
        } = options;

        let mut header_map = base.clone();
        for (name, value) in &option_headers {
            let (name, value) = header_pair(name, value)?;
            header_map.insert(name, value);
        }

        if !header_map.contains_key(CONTENT_TYPE) {
            header_map.insert(
                CONTENT_TYPE,
                HeaderValue::from_static(headers::CONTENT_TYPE_FORM),
            );
        }

        let body = match raw {
            Some(raw) => raw,
            None if datas.is_empty() => Bytes::new(),
            None => encode_body(&header_map, &datas)?,
        };

        if !params.is_empty() {
            append_query(&mut parsed, &build_query(&params, Order::Insertion));
        }

        tracing::trace!(method = %method, url = %parsed, body_len = body.len(), "built request");

        Ok(Self {
            method,
            url: parsed,
            headers: header_map,
            body,
            config,
        })
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Per-call client overrides, if any were given.
    pub fn client_config(&self) -> Option<&ClientConfig> {
        self.config.as_ref()
    }

    /// The `Content-Type` header as a string, if present and printable.
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }
}

fn encode_body(header_map: &HeaderMap, datas: &Map) -> Result<Bytes, HttpError> {
    let content_type = header_map
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if content_type.contains("x-www-form-urlencoded") {
        Ok(Bytes::from(build_query(datas, Order::Insertion)))
    } else if content_type.contains("json") {
        serde_json::to_vec(datas)
            .map(Bytes::from)
            .map_err(HttpError::Encoding)
    } else {
        tracing::warn!(
            content_type,
            "no encoder for content type, body fields dropped"
        );
        Ok(Bytes::new())
    }
}

fn append_query(url: &mut Url, encoded: &str) {
    let query = match url.query() {
        Some(existing) if !existing.is_empty() => format!("{existing}&{encoded}"),
        _ => encoded.to_string(),
    };
    url.set_query(Some(&query));
}
