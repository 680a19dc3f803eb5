//! The request dispatcher.
//!
//! # Design
//! `dispatch` prepares the request on the caller's thread, then moves the
//! exchange and every callback onto a dedicated worker thread and returns.
//! All callbacks of one exchange run on that worker, in lifecycle order, and
//! at most one terminal callback runs. There is no retry, no cancellation,
//! and no state shared between calls.

use std::sync::{mpsc, Arc};
use std::thread;

use uuid::Uuid;

use crate::config::{Callbacks, ProgressCallback, RequestOptions, StateCallback};
use crate::http::{HttpRequest, Progress, ReadyState, ResponseType};
use crate::outcome::Outcome;
use crate::prepare::prepare;
use crate::transport::{ExchangeObserver, Transport, UreqTransport};

/// Perform one HTTP exchange with the default `ureq` transport and report
/// the result through the callbacks in `options`.
pub fn ajax(url: &str, options: RequestOptions) {
    Dispatcher::new().dispatch(url, options);
}

#[derive(Debug, Clone)]
pub struct Dispatcher<T = UreqTransport> {
    transport: Arc<T>,
}

impl Dispatcher<UreqTransport> {
    pub fn new() -> Self {
        Self::with_transport(UreqTransport)
    }
}

impl Default for Dispatcher<UreqTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> Dispatcher<T> {
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    /// Start the exchange and return immediately.
    ///
    /// The worker holds off until this call releases it as its last
    /// statement, so no callback runs while `dispatch` is still executing.
    /// If the worker thread cannot be spawned the failure is only logged and
    /// no callback fires at all; reporting it through `error` here would run
    /// a callback before `dispatch` returns.
    pub fn dispatch(&self, url: &str, options: RequestOptions) {
        let RequestOptions { settings, callbacks } = options;
        let request = prepare(url, &settings);
        let response_type = settings.response_type;
        let request_id = Uuid::new_v4();

        if !settings.asynchronous {
            tracing::debug!(%request_id, "synchronous mode requested; dispatching asynchronously");
        }

        let transport = Arc::clone(&self.transport);
        let (release, released) = mpsc::channel::<()>();
        let spawned = thread::Builder::new()
            .name("ajax-exchange".to_string())
            .spawn(move || {
                if released.recv().is_err() {
                    return;
                }
                let span = tracing::debug_span!("ajax", %request_id, method = %request.method, url = %request.url);
                let _guard = span.enter();
                run_exchange(transport.as_ref(), &request, response_type, callbacks);
            });

        if let Err(err) = spawned {
            tracing::error!(%request_id, error = %err, "could not start exchange thread");
        }
        let _ = release.send(());
    }
}

/// Drive one exchange to completion on the current thread.
pub(crate) fn run_exchange<T: Transport + ?Sized>(
    transport: &T,
    request: &HttpRequest,
    response_type: ResponseType,
    callbacks: Callbacks,
) {
    let Callbacks {
        state_change,
        progress,
        success,
        fail,
        error,
    } = callbacks;

    let mut observer = CallbackObserver::new(state_change, progress);
    observer.ready_state(ReadyState::Opened);

    let outcome = match transport.send(request, &mut observer) {
        Ok(response) => {
            tracing::debug!(status = response.status, bytes = response.body.len(), "exchange complete");
            Outcome::settle(response, response_type)
        }
        Err(err) => {
            tracing::warn!(error = %err, "exchange failed");
            Outcome::transport_error(&err)
        }
    };

    observer.ready_state(ReadyState::Done);

    match outcome {
        Outcome::Success(body) => {
            if let Some(success) = success {
                success(body);
            }
        }
        Outcome::Fail { status, status_text } => {
            if let Some(fail) = fail {
                fail(status, status_text);
            }
        }
        Outcome::Error { status, status_text } => {
            if let Some(error) = error {
                error(status, status_text);
            }
        }
    }
}

/// Forwards transport events to the caller's callbacks. Ready states only
/// ever move forward, and each one is reported once.
struct CallbackObserver {
    state: ReadyState,
    on_state_change: Option<StateCallback>,
    on_progress: Option<ProgressCallback>,
}

impl CallbackObserver {
    fn new(on_state_change: Option<StateCallback>, on_progress: Option<ProgressCallback>) -> Self {
        Self {
            state: ReadyState::Unsent,
            on_state_change,
            on_progress,
        }
    }
}

impl ExchangeObserver for CallbackObserver {
    fn ready_state(&mut self, state: ReadyState) {
        if state <= self.state {
            return;
        }
        self.state = state;
        if let Some(f) = self.on_state_change.as_mut() {
            f(state);
        }
    }

    fn progress(&mut self, progress: Progress) {
        if let Some(f) = self.on_progress.as_mut() {
            f(progress);
        }
    }
}
