//! HTTP response with a lazily read, cached body.

use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::{StatusCode, Version};
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::HttpError;
use crate::render::{header_table, literal_body, ResponseDump};
use crate::request::Request;

/// A response together with the request that produced it.
///
/// The body stream is read on first access and cached; later reads never
/// touch the connection again. A failed read consumes the stream, and every
/// later read reports that failure.
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    version: Version,
    headers: HeaderMap,
    url: Url,
    stream: Option<reqwest::blocking::Response>,
    body: Option<Bytes>,
    read_error: Option<String>,
    request: Request,
}

impl Response {
    pub(crate) fn new(inner: reqwest::blocking::Response, request: Request) -> Self {
        Self {
            status: inner.status(),
            version: inner.version(),
            headers: inner.headers().clone(),
            url: inner.url().clone(),
            stream: Some(inner),
            body: None,
            read_error: None,
            request,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Final URL after any redirects the client followed.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The request that produced this response.
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Body bytes, read from the connection on first call.
    pub fn body(&mut self) -> Result<&Bytes, HttpError> {
        if let Some(message) = &self.read_error {
            return Err(HttpError::BodyLost(message.clone()));
        }
        if self.body.is_none() {
            let bytes = match self.stream.take() {
                Some(stream) => match stream.bytes() {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        self.read_error = Some(e.to_string());
                        return Err(HttpError::Read(e));
                    }
                },
                None => Bytes::new(),
            };
            tracing::trace!(len = bytes.len(), url = %self.url, "read response body");
            self.body = Some(bytes);
        }
        Ok(self.body.get_or_insert_with(Bytes::new))
    }

    /// Whether the body has already been read.
    pub fn is_body_cached(&self) -> bool {
        self.body.is_some()
    }

    /// Body as text, replacing invalid UTF-8.
    pub fn text(&mut self) -> Result<String, HttpError> {
        Ok(String::from_utf8_lossy(self.body()?).into_owned())
    }

    /// Parse the body as JSON.
    pub fn json<T: DeserializeOwned>(&mut self) -> Result<T, HttpError> {
        let status = self.status.as_u16();
        let bytes = self.body()?;
        serde_json::from_slice(bytes).map_err(|e| HttpError::Decode {
            status,
            body: String::from_utf8_lossy(bytes).to_string(),
            source: e,
        })
    }

    /// Convert 4xx/5xx statuses into errors carrying the body.
    pub fn error_for_status(&mut self) -> Result<(), HttpError> {
        let status = self.status;
        if !status.is_client_error() && !status.is_server_error() {
            return Ok(());
        }

        let body = self.text().unwrap_or_default();

        if status.is_server_error() {
            Err(HttpError::ServerError {
                status: status.as_u16(),
                body,
            })
        } else {
            Err(HttpError::ClientError {
                status: status.as_u16(),
                body,
            })
        }
    }

    /// YAML dump of status, headers, body and the originating request.
    ///
    /// Reads the body if it has not been read yet. A read failure is
    /// rendered into the body field instead of being returned.
    pub fn to_yaml(&mut self) -> Result<String, HttpError> {
        let body = match self.body() {
            Ok(bytes) => literal_body(bytes),
            Err(e) => format!("!!read body error: {e}"),
        };
        let dump = ResponseDump {
            status: self.status.to_string(),
            status_code: self.status.as_u16(),
            version: format!("{:?}", self.version),
            headers: header_table(&self.headers),
            body,
            request: self.request.dump(),
        };
        Ok(serde_yaml::to_string(&dump)?)
    }
}
