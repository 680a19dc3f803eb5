//! Turns an address plus `RequestSettings` into the `HttpRequest` that goes
//! on the wire. Pure; never touches the network.

use crate::config::RequestSettings;
use crate::encode::encode_payload;
use crate::http::{HttpMethod, HttpRequest};

pub const REQUESTED_WITH: (&str, &str) = ("X-Requested-With", "XMLHttpRequest");
pub const FORM_CONTENT_TYPE: (&str, &str) = ("Content-type", "application/x-www-form-urlencoded");

/// Build the request for one exchange.
///
/// POST carries the encoded payload as its body. Every other method appends
/// a non-empty payload to the address as a query string and sends no body.
pub fn prepare(url: &str, settings: &RequestSettings) -> HttpRequest {
    let encoded = settings.data.as_ref().and_then(encode_payload);

    let mut headers = vec![(REQUESTED_WITH.0.to_string(), REQUESTED_WITH.1.to_string())];
    let (url, body) = match settings.method {
        HttpMethod::Post => {
            headers.push((FORM_CONTENT_TYPE.0.to_string(), FORM_CONTENT_TYPE.1.to_string()));
            (url.to_string(), encoded)
        }
        _ => match encoded {
            Some(query) if !query.is_empty() => (format!("{url}?{query}"), None),
            _ => (url.to_string(), None),
        },
    };

    for (name, value) in &settings.headers {
        merge_header(&mut headers, name, value);
    }

    HttpRequest {
        method: settings.method,
        url,
        headers,
        body,
        timeout: settings.timeout_duration(),
    }
}

/// Insert `name: value`, replacing an existing header of the same name in
/// place. The caller's spelling of the name wins.
fn merge_header(headers: &mut Vec<(String, String)>, name: &str, value: &str) {
    match headers.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
        Some(existing) => *existing = (name.to_string(), value.to_string()),
        None => headers.push((name.to_string(), value.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::Payload;

    fn settings(method: HttpMethod, data: Option<Payload>) -> RequestSettings {
        RequestSettings {
            method,
            data,
            ..RequestSettings::default()
        }
    }

    #[test]
    fn get_without_data_is_bare() {
        let req = prepare("http://localhost:3000/echo", &RequestSettings::default());
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:3000/echo");
        assert!(req.body.is_none());
        assert_eq!(
            req.headers,
            vec![("X-Requested-With".to_string(), "XMLHttpRequest".to_string())]
        );
        assert_eq!(req.timeout, None);
    }

    #[test]
    fn get_appends_query_string() {
        let data = Payload::fields(vec![("q", "rust lang"), ("page", "2")]);
        let req = prepare("http://h/search", &settings(HttpMethod::Get, Some(data)));
        assert_eq!(req.url, "http://h/search?q=rust%20lang&page=2");
        assert!(req.body.is_none());
        assert_eq!(req.header("content-type"), None);
    }

    #[test]
    fn non_post_methods_all_use_the_query_string() {
        for method in [HttpMethod::Put, HttpMethod::Patch, HttpMethod::Delete] {
            let req = prepare("http://h/r", &settings(method, Some(Payload::from("id=1"))));
            assert_eq!(req.url, "http://h/r?id=1", "{method}");
            assert!(req.body.is_none(), "{method}");
        }
    }

    #[test]
    fn empty_fields_add_no_question_mark() {
        let req = prepare("http://h/r", &settings(HttpMethod::Get, Some(Payload::Fields(Vec::new()))));
        assert_eq!(req.url, "http://h/r");
    }

    #[test]
    fn post_sends_body_and_form_content_type() {
        let data = Payload::fields(vec![("name", "a b"), ("x", "1&2")]);
        let req = prepare("http://h/submit", &settings(HttpMethod::Post, Some(data)));
        assert_eq!(req.url, "http://h/submit");
        assert_eq!(req.body.as_deref(), Some("name=a%20b&x=1%262"));
        assert_eq!(req.header("Content-type"), Some("application/x-www-form-urlencoded"));
    }

    #[test]
    fn post_without_data_still_sets_content_type() {
        let req = prepare("http://h/submit", &settings(HttpMethod::Post, None));
        assert!(req.body.is_none());
        assert_eq!(req.header("content-type"), Some("application/x-www-form-urlencoded"));
    }

    #[test]
    fn caller_headers_override_in_place() {
        let mut s = settings(HttpMethod::Post, None);
        s.headers = vec![
            ("Accept".to_string(), "application/json".to_string()),
            ("x-requested-with".to_string(), "Fetch".to_string()),
            ("Content-Type".to_string(), "text/plain".to_string()),
        ];
        let req = prepare("http://h/", &s);
        assert_eq!(
            req.headers,
            vec![
                ("x-requested-with".to_string(), "Fetch".to_string()),
                ("Content-Type".to_string(), "text/plain".to_string()),
                ("Accept".to_string(), "application/json".to_string()),
            ]
        );
    }

    #[test]
    fn later_caller_header_wins_over_earlier() {
        let mut s = RequestSettings::default();
        s.headers = vec![
            ("X-Trace".to_string(), "1".to_string()),
            ("X-Trace".to_string(), "2".to_string()),
        ];
        let req = prepare("http://h/", &s);
        assert_eq!(req.header("x-trace"), Some("2"));
        assert_eq!(req.headers.len(), 2);
    }

    #[test]
    fn timeout_is_carried_over() {
        let mut s = RequestSettings::default();
        s.timeout = 750;
        assert_eq!(prepare("http://h/", &s).timeout, Some(Duration::from_millis(750)));
    }
}
