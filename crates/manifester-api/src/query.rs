// Explicit query-string parameters.
//
// Every paginated endpoint has its own parameter struct with a hand-written
// `to_query()`; the pairs are handed straight to `RequestBuilder::query`.

/// A request parameter struct that knows how to serialize itself.
///
/// Implementations omit unset or empty values so the remote API applies
/// its own defaults.
pub trait QueryParams {
    fn to_query(&self) -> Vec<(&'static str, String)>;
}

/// Push `key=value` unless the value is empty.
pub(crate) fn push_non_empty(pairs: &mut Vec<(&'static str, String)>, key: &'static str, value: String) {
    if !value.is_empty() {
        pairs.push((key, value));
    }
}

/// Push `key=value` for a present optional value.
pub(crate) fn push_opt<T: ToString>(
    pairs: &mut Vec<(&'static str, String)>,
    key: &'static str,
    value: Option<&T>,
) {
    if let Some(v) = value {
        push_non_empty(pairs, key, v.to_string());
    }
}
