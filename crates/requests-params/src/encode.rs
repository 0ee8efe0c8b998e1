//! Bracket-notation URL encoding of nested values.

use url::form_urlencoded;

use crate::value::{Map, Value};

/// Ordering applied to encoded pairs before joining.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Order {
    /// Keep the order in which pairs were produced.
    #[default]
    Insertion,
    /// Sort escaped pairs lexicographically.
    Sorted,
}

/// Join a key path segment onto a prefix: `k` at the top level, `prefix[k]` below it.
pub fn make_key(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}[{key}]")
    }
}

/// Form-urlencode a single component.
pub fn escape(s: &str) -> String {
    form_urlencoded::byte_serialize(s.as_bytes()).collect()
}

/// Flatten `value` into escaped `key=value` pairs, one per leaf.
///
/// An empty `prefix` with a scalar `value` yields `=value`; callers encode
/// maps at the top level.
pub fn encode(prefix: &str, value: &Value) -> Vec<String> {
    let mut out = Vec::with_capacity(value.leaf_count());
    encode_into(prefix, value, &mut out);
    out
}

fn encode_into(prefix: &str, value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => out.push(pair(prefix, s)),
        Value::Number(n) => out.push(pair(prefix, &n.to_string())),
        Value::Bool(b) => out.push(pair(prefix, if *b { "true" } else { "false" })),
        Value::Null => out.push(pair(prefix, "")),
        Value::List(items) => {
            for (i, item) in items.iter().enumerate() {
                encode_into(&make_key(prefix, &i.to_string()), item, out);
            }
        }
        Value::Map(map) => {
            for (k, v) in map {
                encode_into(&make_key(prefix, k), v, out);
            }
        }
    }
}

fn pair(key: &str, value: &str) -> String {
    format!("{}={}", escape(key), escape(value))
}

/// Encode a top-level map into a `&`-joined query or form body.
pub fn build_query(params: &Map, order: Order) -> String {
    let mut pairs = Vec::new();
    for (k, v) in params {
        encode_into(k, v, &mut pairs);
    }
    if order == Order::Sorted {
        pairs.sort();
    }
    pairs.join("&")
}
