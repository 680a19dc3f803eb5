//! End-to-end exchanges against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives `ajax` over real HTTP
//! through the default `ureq` transport. Every callback forwards into a
//! channel; once the worker thread drops the callbacks the channel closes and
//! the collected events describe the whole exchange.

use std::net::SocketAddr;
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use ajax_core::{ajax, HttpMethod, Payload, RequestOptions, RequestSettings, ResponseBody, ResponseType};
use mock_server::Echo;

#[derive(Debug, PartialEq)]
enum Event {
    State(u8),
    Progress { loaded: u64, total: Option<u64> },
    Success(ResponseBody),
    Fail(u16, String),
    Error(u16, String),
}

fn start_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

/// Run one exchange and return every event it produced, in order.
fn exchange(url: &str, options: RequestOptions) -> Vec<Event> {
    let (tx, rx) = mpsc::channel();
    let (t1, t2, t3, t4, t5) = (tx.clone(), tx.clone(), tx.clone(), tx.clone(), tx);
    let options = options
        .on_state_change(move |s| t1.send(Event::State(s.as_u8())).unwrap())
        .on_progress(move |p| {
            t2.send(Event::Progress {
                loaded: p.loaded,
                total: p.total,
            })
            .unwrap()
        })
        .on_success(move |b| t3.send(Event::Success(b)).unwrap())
        .on_fail(move |s, t| t4.send(Event::Fail(s, t)).unwrap())
        .on_error(move |s, t| t5.send(Event::Error(s, t)).unwrap());

    ajax(url, options);
    drain(rx)
}

fn drain(rx: Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.recv_timeout(Duration::from_secs(10)) {
        events.push(event);
    }
    events
}

fn terminal(events: &[Event]) -> &Event {
    let terminals: Vec<&Event> = events
        .iter()
        .filter(|e| matches!(e, Event::Success(_) | Event::Fail(..) | Event::Error(..)))
        .collect();
    assert_eq!(terminals.len(), 1, "expected exactly one terminal event: {events:?}");
    terminals[0]
}

fn states(events: &[Event]) -> Vec<u8> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::State(s) => Some(*s),
            _ => None,
        })
        .collect()
}

fn echoed(events: &[Event]) -> Echo {
    match terminal(events) {
        Event::Success(ResponseBody::Json(value)) => serde_json::from_value(value.clone()).unwrap(),
        other => panic!("expected JSON success, got {other:?}"),
    }
}

#[test]
fn get_sends_fields_as_query_string() {
    let addr = start_server();
    let events = exchange(
        &format!("http://{addr}/echo"),
        RequestOptions::new()
            .response_type(ResponseType::Json)
            .data(Payload::fields(vec![("q", "rust lang"), ("a&b", "c&d")])),
    );

    let echo = echoed(&events);
    assert_eq!(echo.method, "GET");
    assert_eq!(echo.query.as_deref(), Some("q=rust%20lang&a&b=c%26d"));
    assert!(echo.body.is_empty());
    assert_eq!(echo.headers.get("x-requested-with").map(String::as_str), Some("XMLHttpRequest"));
    assert_eq!(states(&events), vec![1, 2, 3, 4]);
}

#[test]
fn post_sends_form_body() {
    let addr = start_server();
    let events = exchange(
        &format!("http://{addr}/echo"),
        RequestOptions::new()
            .method(HttpMethod::Post)
            .response_type(ResponseType::Json)
            .data(vec![("name", "Ferris Crab"), ("age", "9")]),
    );

    let echo = echoed(&events);
    assert_eq!(echo.method, "POST");
    assert_eq!(echo.query, None);
    assert_eq!(echo.body, "name=Ferris%20Crab&age=9");
    assert_eq!(
        echo.headers.get("content-type").map(String::as_str),
        Some("application/x-www-form-urlencoded")
    );
}

#[test]
fn caller_headers_reach_the_server() {
    let addr = start_server();
    let events = exchange(
        &format!("http://{addr}/echo"),
        RequestOptions::new()
            .method(HttpMethod::Delete)
            .response_type(ResponseType::Json)
            .header("X-Api-Key", "secret")
            .header("X-Requested-With", "custom"),
    );

    let echo = echoed(&events);
    assert_eq!(echo.method, "DELETE");
    assert_eq!(echo.headers.get("x-api-key").map(String::as_str), Some("secret"));
    assert_eq!(echo.headers.get("x-requested-with").map(String::as_str), Some("custom"));
}

#[test]
fn settings_loaded_from_json_drive_the_exchange() {
    let addr = start_server();
    let settings = RequestSettings::from_json(
        r#"{"method": "patch", "type": "json", "data": "raw=1", "headers": {"X-From": "config"}}"#,
    )
    .unwrap();
    let events = exchange(&format!("http://{addr}/echo"), RequestOptions::from_settings(settings));

    let echo = echoed(&events);
    assert_eq!(echo.method, "PATCH");
    assert_eq!(echo.query.as_deref(), Some("raw=1"));
    assert_eq!(echo.headers.get("x-from").map(String::as_str), Some("config"));
}

#[test]
fn not_found_calls_fail() {
    let addr = start_server();
    let events = exchange(&format!("http://{addr}/status/404"), RequestOptions::new());
    assert_eq!(terminal(&events), &Event::Fail(404, "Not Found".to_string()));
    assert_eq!(states(&events).last(), Some(&4));
}

#[test]
fn server_error_calls_fail() {
    let addr = start_server();
    let events = exchange(&format!("http://{addr}/status/503"), RequestOptions::new());
    assert_eq!(terminal(&events), &Event::Fail(503, "Service Unavailable".to_string()));
}

#[test]
fn json_response_is_parsed() {
    let addr = start_server();
    let events = exchange(
        &format!("http://{addr}/json"),
        RequestOptions::new().response_type(ResponseType::Json),
    );
    match terminal(&events) {
        Event::Success(ResponseBody::Json(value)) => {
            assert_eq!(value["name"], "ajax");
            assert_eq!(value["tags"][1], "callbacks");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn progress_reaches_content_length() {
    let addr = start_server();
    let len = 100_000u64;
    let events = exchange(
        &format!("http://{addr}/bytes/{len}"),
        RequestOptions::new().response_type(ResponseType::ArrayBuffer),
    );

    let progress: Vec<(u64, Option<u64>)> = events
        .iter()
        .filter_map(|e| match e {
            Event::Progress { loaded, total } => Some((*loaded, *total)),
            _ => None,
        })
        .collect();
    assert!(!progress.is_empty());
    assert!(progress.windows(2).all(|w| w[0].0 < w[1].0), "loaded must grow");
    assert_eq!(progress.last(), Some(&(len, Some(len))));

    match terminal(&events) {
        Event::Success(ResponseBody::ArrayBuffer(bytes)) => assert_eq!(bytes.len() as u64, len),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn refused_connection_calls_error() {
    // Bind then drop to get a port nothing listens on.
    let addr = std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();
    let events = exchange(&format!("http://{addr}/echo"), RequestOptions::new());

    assert_eq!(terminal(&events), &Event::Error(0, String::new()));
    assert_eq!(states(&events), vec![1, 4]);
}

#[test]
fn timeout_calls_error() {
    let addr = start_server();
    let events = exchange(
        &format!("http://{addr}/slow/3000"),
        RequestOptions::new().timeout(Duration::from_millis(200)),
    );
    assert_eq!(terminal(&events), &Event::Error(0, String::new()));
}

#[test]
fn synchronous_flag_still_returns_immediately() {
    let addr = start_server();
    let (tx, rx) = mpsc::channel();
    let start = std::time::Instant::now();
    ajax(
        &format!("http://{addr}/slow/300"),
        RequestOptions::new()
            .asynchronous(false)
            .on_success(move |body| tx.send(body).unwrap()),
    );
    assert!(start.elapsed() < Duration::from_millis(300));
    assert_eq!(
        rx.recv_timeout(Duration::from_secs(10)).unwrap(),
        ResponseBody::Text("done".to_string())
    );
}
