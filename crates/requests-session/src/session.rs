//! Long-lived session: shared client, cookie jar and default config.

use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::{Client, ClientBuilder};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Method;
use url::Url;

use crate::config::{ClientConfig, SessionConfig};
use crate::error::HttpError;
use crate::options::RequestOptions;
use crate::request::{default_headers, header_pair, Request};
use crate::response::Response;

/// Build the blocking client a session dispatches through.
///
/// The client-level timeout is disabled; every dispatch sets its own.
pub fn build_client(jar: Option<Arc<Jar>>) -> Result<Client, HttpError> {
    let mut builder = ClientBuilder::new().timeout(None::<Duration>);

    if let Some(jar) = jar {
        builder = builder.cookie_provider(jar);
    }

    builder.build().map_err(HttpError::ClientBuild)
}

/// A client with persistent cookies and default settings, reused across calls.
///
/// Requests are dispatched inline on the calling thread. The cookie jar is
/// shared mutable state: callers that use one session from several threads
/// must serialise access themselves, or give each thread its own session.
pub struct Session {
    client: Client,
    jar: Option<Arc<Jar>>,
    config: ClientConfig,
    default_headers: HeaderMap,
}

impl Session {
    /// Create a session with a fresh cookie jar and a 10 second timeout.
    pub fn new() -> Result<Self, HttpError> {
        Self::with_config(SessionConfig::default())
    }

    /// Create a session from explicit settings.
    pub fn with_config(config: SessionConfig) -> Result<Self, HttpError> {
        let jar = config.cookie_store.then(|| Arc::new(Jar::default()));
        let client = build_client(jar.clone())?;

        let mut headers = default_headers();
        if let Some(agent) = &config.user_agent {
            let value = HeaderValue::try_from(agent.as_str()).map_err(|e| {
                HttpError::InvalidHeader {
                    name: USER_AGENT.to_string(),
                    message: e.to_string(),
                }
            })?;
            headers.insert(USER_AGENT, value);
        }
        for (name, value) in &config.default_headers {
            let (name, value) = header_pair(name, value)?;
            headers.insert(name, value);
        }

        Ok(Self {
            client,
            jar,
            config: config.client_config()?,
            default_headers: headers,
        })
    }

    /// Wrap a pre-built client. Cookie handling is whatever that client does.
    pub fn with_client(client: Client) -> Result<Self, HttpError> {
        Ok(Self {
            client,
            jar: None,
            config: SessionConfig::default().client_config()?,
            default_headers: default_headers(),
        })
    }

    /// Update the session defaults. `Unchanged` fields are left alone.
    pub fn configure(&mut self, update: ClientConfig) {
        self.config.update(update);
        tracing::debug!(config = ?self.config, "session reconfigured");
    }

    /// Current session defaults.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get the inner reqwest client.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// The `Cookie` header value the session would send to `url`.
    pub fn cookies(&self, url: &Url) -> Option<String> {
        let jar = self.jar.as_ref()?;
        jar.cookies(url)
            .and_then(|v| v.to_str().ok().map(str::to_string))
    }

    /// Store a `Set-Cookie` style string as if `url` had sent it.
    ///
    /// Returns `false` when the session has no jar of its own.
    pub fn add_cookie(&self, cookie: &str, url: &Url) -> bool {
        match &self.jar {
            Some(jar) => {
                jar.add_cookie_str(cookie, url);
                true
            }
            None => false,
        }
    }

    /// Build a request with this session's default headers.
    pub fn build_request(
        &self,
        method: Method,
        url: &str,
        options: RequestOptions,
    ) -> Result<Request, HttpError> {
        Request::build_with(method, url, &self.default_headers, options)
    }

    /// Send a built request.
    ///
    /// A per-call timeout applies to this call only; the session defaults
    /// are not modified. On transport failure the error carries the request.
    pub fn dispatch(&self, request: Request) -> Result<Response, HttpError> {
        let timeout = self.config.effective_timeout(request.client_config());

        let mut builder = self
            .client
            .request(request.method().clone(), request.url().clone())
            .headers(request.headers().clone());
        if !request.body().is_empty() {
            builder = builder.body(request.body().to_vec());
        }
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        tracing::debug!("Making {} request to: {}", request.method(), request.url());
        match builder.send() {
            Ok(inner) => {
                tracing::debug!(
                    "{} response: {} {}",
                    request.method(),
                    inner.status(),
                    request.url()
                );
                Ok(Response::new(inner, request))
            }
            Err(e) => {
                tracing::debug!(error = %e, "{} {} failed", request.method(), request.url());
                Err(HttpError::dispatch(e, request))
            }
        }
    }

    /// Build and send a request.
    pub fn request(
        &self,
        method: Method,
        url: &str,
        options: RequestOptions,
    ) -> Result<Response, HttpError> {
        let request = self.build_request(method, url, options)?;
        self.dispatch(request)
    }

    pub fn get(&self, url: &str, options: RequestOptions) -> Result<Response, HttpError> {
        self.request(Method::GET, url, options)
    }

    pub fn post(&self, url: &str, options: RequestOptions) -> Result<Response, HttpError> {
        self.request(Method::POST, url, options)
    }

    pub fn put(&self, url: &str, options: RequestOptions) -> Result<Response, HttpError> {
        self.request(Method::PUT, url, options)
    }

    pub fn delete(&self, url: &str, options: RequestOptions) -> Result<Response, HttpError> {
        self.request(Method::DELETE, url, options)
    }
}
