//! Encoder for PHP's `serialize()` output of a string-keyed string array.
//!
//! Paddle signs webhooks over the PHP serialization of the alert fields,
//! so the byte layout here has to match PHP exactly:
//!
//! | value        | encoding                         |
//! |--------------|----------------------------------|
//! | string       | `s:<byte length>:"<bytes>";`     |
//! | assoc. array | `a:<count>:{<key><value>...}`    |
//!
//! String lengths are byte counts, not character counts.

use std::collections::BTreeMap;

fn write_str(s: &str, out: &mut String) {
    out.push_str("s:");
    out.push_str(&s.len().to_string());
    out.push_str(":\"");
    out.push_str(s);
    out.push_str("\";");
}

/// Serializes a string map as a PHP associative array in key order.
///
/// Keys are always written as strings, even when they look numeric.
pub fn serialize_string_map(map: &BTreeMap<String, String>) -> String {
    let mut out = String::with_capacity(16 + map.len() * 32);
    out.push_str("a:");
    out.push_str(&map.len().to_string());
    out.push_str(":{");
    for (key, value) in map {
        write_str(key, &mut out);
        write_str(value, &mut out);
    }
    out.push('}');
    out
}
