//! Header filtering between the client and the upstream.
//!
//! # Responsibilities
//! - Copy header fields, preserving every value of multi-value fields
//! - Drop excluded fields (`Origin` towards the upstream, since CORS is
//!   answered locally)

use axum::http::header::{HOST, ORIGIN};
use axum::http::{HeaderMap, HeaderName};

/// Headers never sent to the upstream. `Host` is derived from the upstream
/// authority by the client.
pub const UPSTREAM_EXCLUDED: [HeaderName; 2] = [ORIGIN, HOST];

/// Append every header of `src` to `dst`, skipping names in `exclude`.
pub fn copy_headers(dst: &mut HeaderMap, src: &HeaderMap, exclude: &[HeaderName]) {
    for (name, value) in src {
        if exclude.contains(name) {
            continue;
        }
        dst.append(name.clone(), value.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_copies_multi_value_fields() {
        let mut src = HeaderMap::new();
        src.append("set-cookie", HeaderValue::from_static("a=1"));
        src.append("set-cookie", HeaderValue::from_static("b=2"));
        src.insert("content-type", HeaderValue::from_static("text/plain"));

        let mut dst = HeaderMap::new();
        copy_headers(&mut dst, &src, &[]);

        let cookies: Vec<_> = dst.get_all("set-cookie").iter().collect();
        assert_eq!(cookies, vec!["a=1", "b=2"]);
        assert_eq!(dst["content-type"], "text/plain");
        assert_eq!(dst.len(), 3);
    }

    #[test]
    fn test_skips_excluded_names() {
        let mut src = HeaderMap::new();
        src.insert("Origin", HeaderValue::from_static("https://app.example"));
        src.insert("Host", HeaderValue::from_static("localhost:8764"));
        src.insert("Authorization", HeaderValue::from_static("Bearer t"));

        let mut dst = HeaderMap::new();
        copy_headers(&mut dst, &src, &UPSTREAM_EXCLUDED);

        assert!(dst.get(ORIGIN).is_none());
        assert!(dst.get(HOST).is_none());
        assert_eq!(dst["authorization"], "Bearer t");
    }

    #[test]
    fn test_appends_to_existing_values() {
        let mut dst = HeaderMap::new();
        dst.insert("vary", HeaderValue::from_static("origin"));

        let mut src = HeaderMap::new();
        src.insert("vary", HeaderValue::from_static("accept"));
        copy_headers(&mut dst, &src, &[]);

        let vary: Vec<_> = dst.get_all("vary").iter().collect();
        assert_eq!(vary, vec!["origin", "accept"]);
    }
}
