//! Settling a finished exchange into one of three outcomes.
//!
//! # Design
//! `Success`, `Fail` and `Error` stay distinct even though the last two carry
//! the same `(status, status_text)` shape: a server that answered 404 and a
//! connection that never came up are different problems for the caller.

use crate::error::TransportError;
use crate::http::{HttpResponse, ResponseBody, ResponseType};

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The server answered with a status in 200..=299.
    Success(ResponseBody),
    /// The server answered with any other status.
    Fail { status: u16, status_text: String },
    /// The exchange did not complete.
    Error { status: u16, status_text: String },
}

impl Outcome {
    pub fn settle(response: HttpResponse, response_type: ResponseType) -> Self {
        if (200..=299).contains(&response.status) {
            Outcome::Success(typed_body(response, response_type))
        } else {
            Outcome::Fail {
                status: response.status,
                status_text: response.status_text,
            }
        }
    }

    /// A transport that failed never saw a status line, so the pair is
    /// always `(0, "")`. The error itself is only logged.
    pub fn transport_error(_err: &TransportError) -> Self {
        Outcome::Error {
            status: 0,
            status_text: String::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }
}

fn typed_body(response: HttpResponse, response_type: ResponseType) -> ResponseBody {
    match response_type {
        ResponseType::Text => ResponseBody::Text(String::from_utf8_lossy(&response.body).into_owned()),
        ResponseType::Document => ResponseBody::Document(String::from_utf8_lossy(&response.body).into_owned()),
        ResponseType::ArrayBuffer => ResponseBody::ArrayBuffer(response.body),
        ResponseType::Blob => {
            let mime_type = response.header("content-type").map(str::to_string);
            ResponseBody::Blob {
                bytes: response.body,
                mime_type,
            }
        }
        ResponseType::Json => {
            ResponseBody::Json(serde_json::from_slice(&response.body).unwrap_or(serde_json::Value::Null))
        }
    }
}
