//! Per-call request configuration.
//!
//! # Design
//! `RequestSettings` is the plain-data half: method, response type, timeout,
//! payload, headers and the async flag. It can be built in code or loaded from
//! JSON using the wrapper's option names (`type`, `async`, ...), with every
//! absent key falling back to its documented default. `RequestOptions` pairs
//! settings with the callbacks and is consumed by a single dispatch.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::error::ConfigError;
use crate::http::{HttpMethod, Progress, ReadyState, ResponseBody, ResponseType};

/// A single payload value. Stringifies the way a dynamically typed caller
/// would expect (`true`, `null`, `1`, `1.5`).
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::String(s) => f.write_str(s),
            Scalar::Int(n) => write!(f, "{n}"),
            Scalar::Float(x) if x.is_infinite() => {
                f.write_str(if *x > 0.0 { "Infinity" } else { "-Infinity" })
            }
            Scalar::Float(x) => write_float(f, *x),
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Null => f.write_str("null"),
        }
    }
}

/// Shortest round-trip digits, switching to exponent form outside
/// `[1e-6, 1e21)` with an explicit `+` on non-negative exponents.
fn write_float(f: &mut fmt::Formatter<'_>, x: f64) -> fmt::Result {
    if x == 0.0 {
        return f.write_str("0");
    }
    let magnitude = x.abs();
    if x.is_nan() || (1e-6..1e21).contains(&magnitude) {
        return write!(f, "{x}");
    }
    let exp = format!("{x:e}");
    match exp.split_once('e') {
        Some((mantissa, power)) if !power.starts_with('-') => write!(f, "{mantissa}e+{power}"),
        _ => f.write_str(&exp),
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::String(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::String(s)
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Int(n)
    }
}

impl From<i32> for Scalar {
    fn from(n: i32) -> Self {
        Scalar::Int(n.into())
    }
}

impl From<f64> for Scalar {
    fn from(x: f64) -> Self {
        Scalar::Float(x)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

impl TryFrom<serde_json::Value> for Scalar {
    type Error = serde_json::Value;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        use serde_json::Value;
        match value {
            Value::String(s) => Ok(Scalar::String(s)),
            Value::Bool(b) => Ok(Scalar::Bool(b)),
            Value::Null => Ok(Scalar::Null),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Ok(Scalar::Int(i)),
                None => Ok(Scalar::Float(n.as_f64().unwrap_or(f64::NAN))),
            },
            other => Err(other),
        }
    }
}

/// Data sent with a request: either key/value fields that get
/// percent-encoded, or a string that is used verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Fields(Vec<(String, Scalar)>),
    Raw(String),
}

impl Payload {
    pub fn fields<K, V, I>(fields: I) -> Self
    where
        K: Into<String>,
        V: Into<Scalar>,
        I: IntoIterator<Item = (K, V)>,
    {
        Payload::Fields(fields.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self {
        Payload::Raw(s.to_string())
    }
}

impl From<String> for Payload {
    fn from(s: String) -> Self {
        Payload::Raw(s)
    }
}

impl<K: Into<String>, V: Into<Scalar>> From<Vec<(K, V)>> for Payload {
    fn from(fields: Vec<(K, V)>) -> Self {
        Payload::fields(fields)
    }
}

impl<'de> Deserialize<'de> for Payload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Raw(String),
            Fields(serde_json::Map<String, serde_json::Value>),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Raw(s) => Ok(Payload::Raw(s)),
            Repr::Fields(map) => map
                .into_iter()
                .map(|(key, value)| match Scalar::try_from(value) {
                    Ok(scalar) => Ok((key, scalar)),
                    Err(_) => Err(<D::Error as serde::de::Error>::custom(ConfigError::NonScalarField { key })),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Payload::Fields),
        }
    }
}

fn deserialize_headers<'de, D>(deserializer: D) -> Result<Vec<(String, String)>, D::Error>
where
    D: Deserializer<'de>,
{
    let map = serde_json::Map::<String, serde_json::Value>::deserialize(deserializer)?;
    Ok(map
        .into_iter()
        .map(|(name, value)| match value {
            serde_json::Value::String(s) => (name, s),
            other => (name, other.to_string()),
        })
        .collect())
}

fn default_async() -> bool {
    true
}

/// The plain-data part of a request configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RequestSettings {
    pub method: HttpMethod,
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    /// Milliseconds; 0 disables the timeout.
    pub timeout: u64,
    pub data: Option<Payload>,
    #[serde(deserialize_with = "deserialize_headers")]
    pub headers: Vec<(String, String)>,
    /// Named after the wrapper's `async` option. `false` is accepted but the
    /// exchange still runs asynchronously.
    #[serde(rename = "async", default = "default_async")]
    pub asynchronous: bool,
}

impl Default for RequestSettings {
    fn default() -> Self {
        Self {
            method: HttpMethod::Get,
            response_type: ResponseType::Text,
            timeout: 0,
            data: None,
            headers: Vec::new(),
            asynchronous: default_async(),
        }
    }
}

impl RequestSettings {
    /// Load settings from a JSON object such as
    /// `{"method": "post", "type": "json", "data": {"q": "rust"}}`.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn timeout_duration(&self) -> Option<Duration> {
        (self.timeout > 0).then(|| Duration::from_millis(self.timeout))
    }
}

pub type StateCallback = Box<dyn FnMut(ReadyState) + Send>;
pub type ProgressCallback = Box<dyn FnMut(Progress) + Send>;
pub type SuccessCallback = Box<dyn FnOnce(ResponseBody) + Send>;
pub type StatusCallback = Box<dyn FnOnce(u16, String) + Send>;

/// Caller-supplied observers. Terminal callbacks are `FnOnce`: at most one
/// of `success`, `fail` and `error` ever runs.
#[derive(Default)]
pub struct Callbacks {
    pub state_change: Option<StateCallback>,
    pub progress: Option<ProgressCallback>,
    pub success: Option<SuccessCallback>,
    pub fail: Option<StatusCallback>,
    pub error: Option<StatusCallback>,
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("state_change", &self.state_change.is_some())
            .field("progress", &self.progress.is_some())
            .field("success", &self.success.is_some())
            .field("fail", &self.fail.is_some())
            .field("error", &self.error.is_some())
            .finish()
    }
}

/// Everything one call to `ajax` needs.
///
/// ```no_run
/// use ajax_core::{ajax, HttpMethod, RequestOptions};
///
/// ajax(
///     "http://localhost:3000/echo",
///     RequestOptions::new()
///         .method(HttpMethod::Post)
///         .data(vec![("name", "ferris")])
///         .on_success(|body| println!("{body:?}"))
///         .on_fail(|status, text| eprintln!("{status} {text}")),
/// );
/// ```
#[derive(Debug, Default)]
pub struct RequestOptions {
    pub settings: RequestSettings,
    pub callbacks: Callbacks,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_settings(settings: RequestSettings) -> Self {
        Self {
            settings,
            callbacks: Callbacks::default(),
        }
    }

    pub fn method(mut self, method: HttpMethod) -> Self {
        self.settings.method = method;
        self
    }

    pub fn response_type(mut self, response_type: ResponseType) -> Self {
        self.settings.response_type = response_type;
        self
    }

    /// Sub-millisecond precision is dropped; a zero duration disables the
    /// timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.settings.timeout = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn data(mut self, data: impl Into<Payload>) -> Self {
        self.settings.data = Some(data.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.settings.headers.push((name.into(), value.into()));
        self
    }

    pub fn asynchronous(mut self, asynchronous: bool) -> Self {
        self.settings.asynchronous = asynchronous;
        self
    }

    pub fn on_state_change(mut self, f: impl FnMut(ReadyState) + Send + 'static) -> Self {
        self.callbacks.state_change = Some(Box::new(f));
        self
    }

    pub fn on_progress(mut self, f: impl FnMut(Progress) + Send + 'static) -> Self {
        self.callbacks.progress = Some(Box::new(f));
        self
    }

    pub fn on_success(mut self, f: impl FnOnce(ResponseBody) + Send + 'static) -> Self {
        self.callbacks.success = Some(Box::new(f));
        self
    }

    /// Called with `(status, status_text)` when the server answered outside
    /// 200..=299.
    pub fn on_fail(mut self, f: impl FnOnce(u16, String) + Send + 'static) -> Self {
        self.callbacks.fail = Some(Box::new(f));
        self
    }

    /// Called with `(status, status_text)` when the exchange itself could not
    /// complete.
    pub fn on_error(mut self, f: impl FnOnce(u16, String) + Send + 'static) -> Self {
        self.callbacks.error = Some(Box::new(f));
        self
    }
}
