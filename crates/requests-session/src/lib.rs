//! Session-based HTTP requests built from typed options.
//!
//! A [`Session`] owns a blocking client and a cookie jar. Each call takes
//! [`RequestOptions`] (headers, query params, body fields, raw body, per-call
//! config), builds a [`Request`] and returns a [`Response`] whose body is read
//! once and cached. Requests render as YAML (`Display`) or as a `curl`
//! command ([`Request::to_curl`]).

pub mod config;
pub mod error;
pub mod options;
pub mod render;
pub mod request;
pub mod response;
pub mod session;

pub use config::{ClientConfig, ConfigError, SessionConfig, Timeout};
pub use error::HttpError;
pub use options::RequestOptions;
pub use render::shell_escape;
pub use request::{default_headers, headers, Request};
pub use response::Response;
pub use session::{build_client, Session};

pub use requests_params::{map, Map, Value};
pub use reqwest::Method;
