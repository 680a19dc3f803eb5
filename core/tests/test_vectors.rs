//! Verify `prepare` and `Outcome::settle` against JSON test vectors stored in
//! `test-vectors/`.
//!
//! Each prepare vector carries settings in the wrapper's JSON option format
//! and the exact request expected on the wire; each settle vector carries a
//! simulated response and the expected outcome.

use ajax_core::{prepare, HttpMethod, HttpResponse, Outcome, RequestSettings, ResponseBody, ResponseType};

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    s.parse().unwrap_or_else(|_| panic!("unknown method: {s}"))
}

fn parse_response_type(s: &str) -> ResponseType {
    serde_json::from_value(serde_json::Value::String(s.to_string()))
        .unwrap_or_else(|_| panic!("unknown response type: {s}"))
}

// ---------------------------------------------------------------------------
// Prepare
// ---------------------------------------------------------------------------

#[test]
fn prepare_test_vectors() {
    let raw = include_str!("../../test-vectors/prepare.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let url = case["url"].as_str().unwrap();
        let settings = RequestSettings::from_json(&case["settings"].to_string())
            .unwrap_or_else(|e| panic!("{name}: settings: {e}"));
        let expected = &case["expected_request"];

        let req = prepare(url, &settings);
        assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
        assert_eq!(req.url, expected["url"].as_str().unwrap(), "{name}: url");

        let expected_headers: Vec<(String, String)> = expected["headers"]
            .as_array()
            .unwrap()
            .iter()
            .map(|h| {
                let arr = h.as_array().unwrap();
                (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
            })
            .collect();
        assert_eq!(req.headers, expected_headers, "{name}: headers");
        assert_eq!(req.body.as_deref(), expected["body"].as_str(), "{name}: body");
    }
}

// ---------------------------------------------------------------------------
// Settle
// ---------------------------------------------------------------------------

#[test]
fn settle_test_vectors() {
    let raw = include_str!("../../test-vectors/settle.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let response_type = parse_response_type(case["response_type"].as_str().unwrap());

        let sim = &case["simulated_response"];
        let response = HttpResponse {
            status: sim["status"].as_u64().unwrap() as u16,
            status_text: sim["status_text"].as_str().unwrap().to_string(),
            headers: Vec::new(),
            body: sim["body"].as_str().unwrap().as_bytes().to_vec(),
        };
        let outcome = Outcome::settle(response, response_type);

        let expected = &case["expected"];
        match expected["outcome"].as_str().unwrap() {
            "success" => {
                let body = match outcome {
                    Outcome::Success(body) => body,
                    other => panic!("{name}: expected success, got {other:?}"),
                };
                if let Some(json) = expected.get("json") {
                    assert_eq!(body, ResponseBody::Json(json.clone()), "{name}: json body");
                } else {
                    let text = expected["body"].as_str().unwrap().to_string();
                    assert_eq!(body, ResponseBody::Text(text), "{name}: text body");
                }
            }
            "fail" => {
                assert_eq!(
                    outcome,
                    Outcome::Fail {
                        status: expected["status"].as_u64().unwrap() as u16,
                        status_text: expected["status_text"].as_str().unwrap().to_string(),
                    },
                    "{name}: fail"
                );
            }
            other => panic!("{name}: unknown expected outcome: {other}"),
        }
    }
}
