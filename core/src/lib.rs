//! Callback-based HTTP request helper.
//!
//! # Overview
//! `ajax(url, options)` performs exactly one HTTP exchange and reports its
//! lifecycle through optional callbacks: ready-state changes, body progress,
//! and exactly one of success, fail (the server answered outside 2xx) or
//! error (the exchange could not complete).
//!
//! # Design
//! - Request building (`prepare`) and response settling (`Outcome::settle`)
//!   are pure and deterministic; only a `Transport` touches the network.
//! - `UreqTransport` is the default transport; tests swap in scripted ones
//!   through `Dispatcher::with_transport`.
//! - Types use owned `String` / `Vec` fields so they can move to the worker
//!   thread and across the C ABI in `ajax-ffi`.

pub mod config;
pub mod dispatch;
pub mod encode;
pub mod error;
pub mod http;
pub mod outcome;
pub mod prepare;
pub mod transport;

pub use config::{Callbacks, Payload, RequestOptions, RequestSettings, Scalar};
pub use dispatch::{ajax, Dispatcher};
pub use encode::encode_payload;
pub use error::{ConfigError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Progress, ReadyState, ResponseBody, ResponseType};
pub use outcome::Outcome;
pub use prepare::prepare;
pub use transport::{ExchangeObserver, Transport, UreqTransport};
