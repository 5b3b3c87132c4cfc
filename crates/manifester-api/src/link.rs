// RFC 8288 `Link` header parsing for cursor pagination.
//
// Okta returns one `Link` header per relation, e.g.
//   Link: <https://acme.okta.com/api/v1/groups?limit=200>; rel="self"
//   Link: <https://acme.okta.com/api/v1/groups?after=00g1&limit=200>; rel="next"
// Some proxies fold them into a single comma-separated header, so both
// shapes are accepted.

use reqwest::header::{HeaderMap, LINK};
use url::Url;

/// Extract the `rel="next"` target from the response headers, if any.
pub fn next_link(headers: &HeaderMap) -> Option<Url> {
    headers
        .get_all(LINK)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .find_map(parse_next)
}

fn parse_next(entry: &str) -> Option<Url> {
    let mut parts = entry.split(';');
    let target = parts.next()?.trim();
    let target = target.strip_prefix('<')?.strip_suffix('>')?;

    let is_next = parts.any(|param| {
        let Some((key, value)) = param.split_once('=') else {
            return false;
        };
        key.trim().eq_ignore_ascii_case("rel")
            && value
                .trim()
                .trim_matches('"')
                .split_whitespace()
                .any(|rel| rel.eq_ignore_ascii_case("next"))
    });

    if is_next { Url::parse(target).ok() } else { None }
}
