//! The seam between the dispatcher and the network.
//!
//! # Design
//! A `Transport` executes one `HttpRequest` and reports lifecycle events to
//! an `ExchangeObserver` as they happen. The dispatcher owns the `Opened` and
//! `Done` transitions; a transport reports everything in between. Status
//! codes are data, never errors: only an exchange that could not complete
//! returns `Err`.

use std::io::Read;

use ureq::http::header::CONTENT_LENGTH;

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Progress, ReadyState};

const CHUNK_SIZE: usize = 16 * 1024;

/// Receives lifecycle events while an exchange is in flight.
pub trait ExchangeObserver {
    fn ready_state(&mut self, state: ReadyState);
    fn progress(&mut self, progress: Progress);
}

pub trait Transport: Send + Sync + 'static {
    fn send(
        &self,
        request: &HttpRequest,
        observer: &mut dyn ExchangeObserver,
    ) -> Result<HttpResponse, TransportError>;
}

/// Blocking transport backed by `ureq`. Builds a fresh agent per exchange,
/// so nothing is pooled between calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct UreqTransport;

impl UreqTransport {
    fn agent(request: &HttpRequest) -> ureq::Agent {
        ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(request.timeout)
            .build()
            .new_agent()
    }
}

impl Transport for UreqTransport {
    fn send(
        &self,
        request: &HttpRequest,
        observer: &mut dyn ExchangeObserver,
    ) -> Result<HttpResponse, TransportError> {
        let agent = Self::agent(request);
        let url = request.url.as_str();
        let body = request.body.as_deref();

        let mut response = match request.method {
            HttpMethod::Get => with_headers(agent.get(url), &request.headers).call(),
            HttpMethod::Delete => with_headers(agent.delete(url), &request.headers).call(),
            HttpMethod::Post => {
                let builder = with_headers(agent.post(url), &request.headers);
                match body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
            HttpMethod::Put => {
                let builder = with_headers(agent.put(url), &request.headers);
                match body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
            HttpMethod::Patch => {
                let builder = with_headers(agent.patch(url), &request.headers);
                match body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
        }?;

        observer.ready_state(ReadyState::HeadersReceived);

        let status = response.status();
        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let total = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        tracing::debug!(status = status.as_u16(), ?total, "response head received");

        observer.ready_state(ReadyState::Loading);

        let mut reader = response.body_mut().as_reader();
        let mut body = Vec::new();
        let mut chunk = vec![0u8; CHUNK_SIZE];
        loop {
            let n = reader.read(&mut chunk).map_err(|e| match e.kind() {
                std::io::ErrorKind::TimedOut => TransportError::Timeout,
                _ => TransportError::Io(e),
            })?;
            if n == 0 {
                break;
            }
            body.extend_from_slice(&chunk[..n]);
            observer.progress(Progress {
                loaded: body.len() as u64,
                total,
            });
        }

        Ok(HttpResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
        })
    }
}

fn with_headers<B>(mut builder: ureq::RequestBuilder<B>, headers: &[(String, String)]) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}
