//! Payload encoding.
//!
//! Field keys and values are escaped with different character sets: keys
//! keep every character that is legal somewhere in a URI, values keep only
//! the unreserved marks. A key such as `a&b` therefore passes through
//! untouched while the value `a&b` becomes `a%26b`.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::config::Payload;

/// Characters left alone when escaping a value: `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
const COMPONENT_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Characters left alone when escaping a key: the component set plus the
/// URI delimiters `; , / ? : @ & = + $ #`.
const URI_SET: &AsciiSet = &COMPONENT_SET
    .remove(b';')
    .remove(b',')
    .remove(b'/')
    .remove(b'?')
    .remove(b':')
    .remove(b'@')
    .remove(b'&')
    .remove(b'=')
    .remove(b'+')
    .remove(b'$')
    .remove(b'#');

pub fn encode_key(key: &str) -> String {
    utf8_percent_encode(key, URI_SET).to_string()
}

pub fn encode_value(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT_SET).to_string()
}

/// Produce the encoded payload, or `None` when there is nothing to send.
///
/// An empty field list still encodes to `Some("")`, while an empty raw string
/// counts as no payload at all.
pub fn encode_payload(payload: &Payload) -> Option<String> {
    match payload {
        Payload::Fields(fields) => Some(
            fields
                .iter()
                .map(|(key, value)| format!("{}={}", encode_key(key), encode_value(&value.to_string())))
                .collect::<Vec<_>>()
                .join("&"),
        ),
        Payload::Raw(raw) if raw.is_empty() => None,
        Payload::Raw(raw) => Some(raw.clone()),
    }
}
