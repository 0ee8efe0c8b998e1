//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueHint};
use requests_log::LogLevel;
use requests_session::{Method, RequestOptions, Timeout};

/// Send an HTTP request and print the response, a YAML dump or a curl command.
#[derive(Debug, Parser)]
#[command(name = "req", author, version, about, long_about = None)]
pub struct Cli {
    /// Request URL
    #[arg(value_hint = ValueHint::Url)]
    pub url: String,

    /// HTTP method
    #[arg(short = 'X', long, default_value = "GET", value_parser = parse_method)]
    pub method: Method,

    /// Header as `Name: value` (repeatable)
    #[arg(short = 'H', long = "header", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Query parameter as `key=value` (repeatable)
    #[arg(short = 'p', long = "param", value_parser = parse_pair)]
    pub params: Vec<(String, String)>,

    /// Body field as `key=value` (repeatable)
    #[arg(short = 'd', long = "data", value_parser = parse_pair)]
    pub data: Vec<(String, String)>,

    /// Encode body fields as JSON instead of form-urlencoded
    #[arg(long)]
    pub json: bool,

    /// Raw request body; body fields are ignored when set
    #[arg(long)]
    pub raw: Option<String>,

    /// Timeout in seconds for this call (-1 for none)
    #[arg(long, allow_hyphen_values = true)]
    pub timeout: Option<i64>,

    /// Session config file (YAML)
    #[arg(short, long, env = "REQUESTS_CONFIG", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Print the equivalent curl command
    #[arg(long)]
    pub curl: bool,

    /// Print a YAML dump of the response instead of the body
    #[arg(long)]
    pub dump: bool,

    /// Build the request and print it without sending
    #[arg(long)]
    pub dry_run: bool,

    /// Increase verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all logging except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    /// Log level from `-q`/`-v`, else `configured`, else warn.
    pub fn log_level(&self, configured: Option<LogLevel>) -> LogLevel {
        if self.quiet {
            LogLevel::Error
        } else if self.verbose > 0 {
            LogLevel::from_verbosity(self.verbose)
        } else {
            configured.unwrap_or(LogLevel::Warn)
        }
    }

    /// Translate the flags into request options.
    pub fn request_options(&self) -> Result<RequestOptions, String> {
        let mut options = RequestOptions::new().headers(self.headers.iter().cloned());

        if self.json {
            options = options.json_content();
        }
        for (k, v) in &self.params {
            options = options.param(k, v.as_str());
        }
        for (k, v) in &self.data {
            options = options.data(k, v.as_str());
        }
        if let Some(raw) = &self.raw {
            options = options.raw_data(raw.clone());
        }
        if let Some(secs) = self.timeout {
            let timeout = Timeout::from_secs(secs).map_err(|e| e.to_string())?;
            options = options.timeout(timeout);
        }

        Ok(options)
    }
}

/// Parse an HTTP method, case-insensitively.
pub fn parse_method(s: &str) -> Result<Method, String> {
    Method::from_bytes(s.to_ascii_uppercase().as_bytes())
        .map_err(|_| format!("invalid HTTP method: {s}"))
}

/// Parse `Name: value`.
pub fn parse_header(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once(':')
        .ok_or_else(|| format!("expected `Name: value`, got `{s}`"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("empty header name in `{s}`"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

/// Parse `key=value`; the value may be empty or contain further `=`.
pub fn parse_pair(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected `key=value`, got `{s}`"))?;
    if key.is_empty() {
        return Err(format!("empty key in `{s}`"));
    }
    Ok((key.to_string(), value.to_string()))
}
