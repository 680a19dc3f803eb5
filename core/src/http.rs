//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. `prepare`
//! builds `HttpRequest` values and `Outcome::settle` consumes `HttpResponse`
//! values without touching the network; a `Transport` performs the actual
//! exchange in between. All fields use owned types so values can cross the
//! worker-thread and FFI boundaries without lifetime concerns.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Method names are matched case-insensitively, so `"post"` is `Post`.
impl FromStr for HttpMethod {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            _ => Err(ConfigError::UnknownMethod(s.to_string())),
        }
    }
}

impl TryFrom<String> for HttpMethod {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// How a successful response body is handed to the success callback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    /// The empty string is accepted as an alias for `text`.
    #[default]
    #[serde(alias = "")]
    Text,
    #[serde(rename = "arraybuffer")]
    ArrayBuffer,
    Blob,
    Document,
    Json,
}

/// Lifecycle of a single exchange, numbered the way browsers number
/// `readyState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum ReadyState {
    Unsent = 0,
    Opened = 1,
    HeadersReceived = 2,
    Loading = 3,
    Done = 4,
}

impl ReadyState {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Body transfer progress. `total` is only known when the server announced
/// a Content-Length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub loaded: u64,
    pub total: Option<u64>,
}

impl Progress {
    pub fn length_computable(&self) -> bool {
        self.total.is_some()
    }
}

/// An HTTP request described as plain data.
///
/// Built by `prepare`. A `Transport` is responsible for executing it and
/// returning the corresponding `HttpResponse`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    /// `None` means the exchange may take as long as it needs.
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A successful response body, typed according to the requested
/// `ResponseType`.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Text(String),
    ArrayBuffer(Vec<u8>),
    Blob { bytes: Vec<u8>, mime_type: Option<String> },
    /// Markup text; no DOM is built.
    Document(String),
    /// `Null` when the body was not valid JSON.
    Json(serde_json::Value),
}

impl ResponseBody {
    /// Flatten the body back into bytes. JSON values are re-serialized.
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            ResponseBody::Text(s) | ResponseBody::Document(s) => s.into_bytes(),
            ResponseBody::ArrayBuffer(bytes) | ResponseBody::Blob { bytes, .. } => bytes,
            ResponseBody::Json(value) => value.to_string().into_bytes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_parses_case_insensitively() {
        assert_eq!("post".parse::<HttpMethod>().unwrap(), HttpMethod::Post);
        assert_eq!("Patch".parse::<HttpMethod>().unwrap(), HttpMethod::Patch);
        assert!(matches!(
            "HEAD".parse::<HttpMethod>(),
            Err(ConfigError::UnknownMethod(m)) if m == "HEAD"
        ));
    }

    #[test]
    fn ready_states_are_ordered_and_numbered() {
        assert!(ReadyState::Opened < ReadyState::HeadersReceived);
        assert!(ReadyState::Loading < ReadyState::Done);
        assert_eq!(ReadyState::Done.as_u8(), 4);
        assert_eq!(ReadyState::Unsent.as_u8(), 0);
    }

    #[test]
    fn header_lookup_ignores_case() {
        let response = HttpResponse {
            status: 200,
            status_text: "OK".to_string(),
            headers: vec![("Content-Type".to_string(), "text/plain".to_string())],
            body: Vec::new(),
        };
        assert_eq!(response.header("content-type"), Some("text/plain"));
        assert_eq!(response.header("content-length"), None);
    }

    #[test]
    fn json_body_flattens_to_serialized_text() {
        let body = ResponseBody::Json(serde_json::json!({"ok": true}));
        assert_eq!(body.into_bytes(), br#"{"ok":true}"#.to_vec());
    }
}
