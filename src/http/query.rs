//! Query string and request path decoding.

use std::collections::HashMap;

use percent_encoding::percent_decode_str;

/// Parse `key=value` pairs separated by `&`.
///
/// - keys and values are percent-decoded, `+` decodes to a space
/// - a segment with no `=` contributes nothing
/// - the first occurrence of a key wins
pub fn parse_query(query: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    for segment in query.split('&') {
        let Some((key, value)) = segment.split_once('=') else {
            continue;
        };
        params
            .entry(decode_component(key))
            .or_insert_with(|| decode_component(value));
    }
    params
}

/// Decode one form-encoded component. Byte sequences that are not UTF-8
/// become U+FFFD.
pub fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

/// Percent-decode a request path. `+` is literal in paths. A path that does
/// not decode to UTF-8 is returned unchanged.
pub fn decode_path(raw: &str) -> String {
    match percent_decode_str(raw).decode_utf8() {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw.to_string(),
    }
}
