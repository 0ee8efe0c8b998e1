//! Debug renderings: `curl` reproductions and YAML dumps.

use std::fmt;

use indexmap::IndexMap;
use reqwest::header::HeaderMap;
use serde::Serialize;

use crate::config::ClientConfig;
use crate::request::Request;

/// Quote `s` for a POSIX shell.
///
/// Strings made only of safe characters are returned bare; anything else is
/// single-quoted, with embedded `'` written as `'"'"'`.
pub fn shell_escape(s: &str) -> String {
    if s.is_empty() {
        return "''".to_string();
    }
    let safe = s
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "@%+=:,./_-".contains(c));
    if safe {
        return s.to_string();
    }
    format!("'{}'", s.replace('\'', r#"'"'"'"#))
}

/// Header map as name -> joined values, in map order.
pub(crate) fn header_table(headers: &HeaderMap) -> IndexMap<String, String> {
    headers
        .keys()
        .map(|name| {
            let joined = headers
                .get_all(name)
                .iter()
                .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
                .collect::<Vec<_>>()
                .join(", ");
            (name.as_str().to_string(), joined)
        })
        .collect()
}

/// Body text for a YAML dump. The trailing newline makes the emitter use a
/// literal block.
pub(crate) fn literal_body(body: &[u8]) -> String {
    format!("{}\n", String::from_utf8_lossy(body))
}

impl Request {
    /// Shell command reproducing this request with `curl`.
    pub fn to_curl(&self) -> String {
        let mut parts = vec![
            format!("curl -X {}", shell_escape(self.method().as_str())),
            shell_escape(self.url().as_str()),
        ];
        for (name, value) in header_table(self.headers()) {
            parts.push(format!("-H {}", shell_escape(&format!("{name}: {value}"))));
        }
        if !self.body().is_empty() {
            parts.push(format!(
                "-d {}",
                shell_escape(&String::from_utf8_lossy(self.body()))
            ));
        }
        parts.join(" \\\n")
    }

    pub(crate) fn dump(&self) -> RequestDump {
        RequestDump {
            method: self.method().to_string(),
            url: self.url().to_string(),
            headers: header_table(self.headers()),
            client_config: self.client_config().copied(),
            body: (!self.body().is_empty()).then(|| literal_body(self.body())),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct RequestDump {
    pub method: String,
    pub url: String,
    pub headers: IndexMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_config: Option<ClientConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ResponseDump {
    pub status: String,
    pub status_code: u16,
    pub version: String,
    pub headers: IndexMap<String, String>,
    pub body: String,
    pub request: RequestDump,
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let yaml = serde_yaml::to_string(&self.dump()).map_err(|_| fmt::Error)?;
        f.write_str(&yaml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::RequestOptions;
    use reqwest::Method;

    #[test]
    fn test_shell_escape() {
        assert_eq!(shell_escape(""), "''");
        assert_eq!(shell_escape("s2=post&x"), "'s2=post&x'");
        assert_eq!(shell_escape("plain-value_1.0"), "plain-value_1.0");
        assert_eq!(shell_escape(r#"{"raw":1}"#), r#"'{"raw":1}'"#);
        assert_eq!(shell_escape("it's"), r#"'it'"'"'s'"#);
    }

    #[test]
    fn test_curl_one_flag_per_header() {
        let req = Request::build(
            Method::POST,
            "http://example.com/post?a=1",
            RequestOptions::new()
                .header("Token", "abcd")
                .header("token", "efgh")
                .data("event", "post it"),
        )
        .unwrap();
        let curl = req.to_curl();
        let lines: Vec<&str> = curl.split(" \\\n").collect();

        assert_eq!(lines[0], "curl -X POST");
        assert_eq!(lines[1], "'http://example.com/post?a=1'");
        assert_eq!(lines.iter().filter(|l| l.starts_with("-H ")).count(), 3);
        assert!(lines.contains(&"-H 'token: efgh'"));
        assert_eq!(lines.last(), Some(&"-d event=post+it"));
    }

    #[test]
    fn test_curl_quotes_url_and_headers() {
        let req = Request::build(
            Method::GET,
            "http://example.com/a$(id)",
            RequestOptions::new()
                .header("X-Note", r#"say "hi" $(whoami) `id`"#)
                .header("X-Quote", "it's"),
        )
        .unwrap();
        let curl = req.to_curl();
        let lines: Vec<&str> = curl.split(" \\\n").collect();

        assert_eq!(lines[1], "'http://example.com/a$(id)'");
        assert!(lines.contains(&r#"-H 'x-note: say "hi" $(whoami) `id`'"#));
        assert!(lines.contains(&r#"-H 'x-quote: it'"'"'s'"#));
        assert!(!curl.contains("\"http"));
    }

    #[test]
    fn test_curl_quotes_extension_method() {
        let method = Method::from_bytes(b"PURGE$X").unwrap();
        let req = Request::build(method, "http://example.com/", RequestOptions::new()).unwrap();
        assert!(req.to_curl().starts_with("curl -X 'PURGE$X' \\\n"));
    }

    #[test]
    fn test_curl_without_body_has_no_data_flag() {
        let req = Request::build(Method::GET, "http://example.com/", RequestOptions::new()).unwrap();
        assert!(!req.to_curl().contains("-d "));
    }

    #[test]
    fn test_curl_escapes_body() {
        let req = Request::build(
            Method::POST,
            "http://example.com/",
            RequestOptions::new().json_content().raw_data(r#"{"raw":"it's"}"#),
        )
        .unwrap();
        assert!(req
            .to_curl()
            .ends_with(r#"-d '{"raw":"it'"'"'s"}'"#));
    }

    #[test]
    fn test_request_display_uses_literal_body() {
        let req = Request::build(
            Method::POST,
            "http://example.com/post",
            RequestOptions::new().data("a", "b"),
        )
        .unwrap();
        let yaml = req.to_string();
        assert!(yaml.contains("url: http://example.com/post"));
        assert!(yaml.contains("body: |"));
        assert!(yaml.contains("user-agent: requests-rs/"));
        assert!(!yaml.contains("client_config"));
    }

    #[test]
    fn test_request_display_without_body() {
        let req = Request::build(Method::GET, "http://example.com/", RequestOptions::new()).unwrap();
        assert!(!req.to_string().contains("body"));
    }
}
