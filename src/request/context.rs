//! Normalized request view.
//!
//! # Responsibilities
//! - URL-decode the request URI
//! - Remove base path and script name from it
//! - Split off query parameters (GET) or parse the form body (other methods)
//! - Detect asynchronous requests by header or query flag

use std::collections::BTreeMap;

use axum::http::uri::Authority;
use axum::http::{header, HeaderMap, HeaderName};
use serde::Serialize;
use url::form_urlencoded;

use crate::links::{decode_link, normalize_base_path};

/// Header conventionally set by browser libraries on asynchronous requests.
pub const DEFAULT_ASYNC_HEADER: &str = "x-requested-with";
/// Header value identifying an asynchronous request (compared case-insensitively).
pub const DEFAULT_ASYNC_HEADER_VALUE: &str = "XMLHttpRequest";
/// Query key that marks a request as asynchronous regardless of headers.
pub const DEFAULT_ASYNC_QUERY_FLAG: &str = "ajax";

/// Settings used to normalize raw requests.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    /// Normalized base path (`/` or `/dir/`).
    pub base_path: String,
    /// Front-controller file name, e.g. `index.php`.
    pub script_name: String,
    pub async_header: HeaderName,
    pub async_header_value: String,
    /// Empty disables flag detection.
    pub async_query_flag: String,
}

impl RequestOptions {
    pub fn new(base_path: &str, script_name: &str) -> Self {
        Self {
            base_path: normalize_base_path(base_path),
            script_name: script_name.to_string(),
            ..Self::default()
        }
    }
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            base_path: "/".to_string(),
            script_name: String::new(),
            async_header: HeaderName::from_static(DEFAULT_ASYNC_HEADER),
            async_header_value: DEFAULT_ASYNC_HEADER_VALUE.to_string(),
            async_query_flag: DEFAULT_ASYNC_QUERY_FLAG.to_string(),
        }
    }
}

/// Raw request data as supplied by the host.
#[derive(Debug, Clone, Copy)]
pub struct RawRequest<'a> {
    pub method: &'a str,
    /// Request URI, possibly with an embedded query string.
    pub uri: &'a str,
    /// Query string supplied separately by the host, if any.
    pub query_string: Option<&'a str>,
    pub body: &'a [u8],
    pub headers: &'a HeaderMap,
    /// Whether the request arrived over TLS.
    pub secure: bool,
    /// Local port reported by the host, used when the Host header has none.
    pub port: Option<u16>,
}

impl<'a> RawRequest<'a> {
    pub fn new(method: &'a str, uri: &'a str, headers: &'a HeaderMap) -> Self {
        Self {
            method,
            uri,
            query_string: None,
            body: &[],
            headers,
            secure: false,
            port: None,
        }
    }

    pub fn with_body(mut self, body: &'a [u8]) -> Self {
        self.body = body;
        self
    }

    pub fn with_query_string(mut self, query_string: &'a str) -> Self {
        self.query_string = Some(query_string);
        self
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }
}

/// Normalized view of an inbound request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestContext {
    /// Upper-cased HTTP method.
    pub method: String,
    /// URI exactly as received.
    pub raw_path: String,
    /// Decoded path without base path, script name or surrounding slashes.
    pub normalized_path: String,
    pub query_params: BTreeMap<String, String>,
    pub is_async: bool,
    /// Host header, if present.
    pub host: Option<String>,
    pub secure: bool,
    /// Port from the Host header, else the host-reported port, else the
    /// scheme default.
    pub port: u16,
}

impl RequestContext {
    /// Build a context from raw host data.
    pub fn from_raw(raw: &RawRequest<'_>, options: &RequestOptions) -> Self {
        let method = raw.method.trim().to_ascii_uppercase();

        let mut stripped = decode_link(raw.uri);
        for needle in [options.base_path.trim_matches('/'), options.script_name.as_str()] {
            stripped = remove_ignore_ascii_case(&stripped, needle);
        }
        let request_uri = stripped.trim_matches('/');
        let embedded_query = request_uri.split_once('?');

        let (path, query_params) = if method == "GET" {
            match embedded_query {
                Some((path, query)) => (path, parse_form(query.as_bytes())),
                None => (
                    request_uri,
                    parse_form(raw.query_string.unwrap_or_default().as_bytes()),
                ),
            }
        } else {
            (request_uri, parse_form(raw.body))
        };

        let url_query = embedded_query.map(|(_, q)| q).or(raw.query_string);
        let is_async = header_marks_async(raw.headers, options)
            || url_query.is_some_and(|q| query_has_flag(q, &options.async_query_flag));

        let host = raw
            .headers
            .get(header::HOST)
            .and_then(|h| h.to_str().ok())
            .map(str::to_string);
        let port = host
            .as_deref()
            .and_then(|h| h.parse::<Authority>().ok())
            .and_then(|authority| authority.port_u16())
            .or(raw.port)
            .unwrap_or(if raw.secure { 443 } else { 80 });

        let ctx = Self {
            method,
            raw_path: raw.uri.to_string(),
            normalized_path: path.trim_matches('/').to_string(),
            query_params,
            is_async,
            host,
            secure: raw.secure,
            port,
        };

        tracing::debug!(
            method = %ctx.method,
            raw_path = %ctx.raw_path,
            path = %ctx.normalized_path,
            params = ctx.query_params.len(),
            is_async = ctx.is_async,
            "Request normalized"
        );
        ctx
    }

    /// Query or form parameter by name.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params.get(name).map(String::as_str)
    }

    /// `https` or `http`.
    pub fn scheme(&self) -> &'static str {
        if self.secure {
            "https"
        } else {
            "http"
        }
    }
}

fn header_marks_async(headers: &HeaderMap, options: &RequestOptions) -> bool {
    headers
        .get(&options.async_header)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim().eq_ignore_ascii_case(&options.async_header_value))
}

fn query_has_flag(query: &str, flag: &str) -> bool {
    !flag.is_empty() && form_urlencoded::parse(query.as_bytes()).any(|(key, _)| key == flag)
}

/// Later duplicates overwrite earlier ones.
fn parse_form(input: &[u8]) -> BTreeMap<String, String> {
    form_urlencoded::parse(input).into_owned().collect()
}

/// Remove every occurrence of `needle`, comparing ASCII case-insensitively.
fn remove_ignore_ascii_case(haystack: &str, needle: &str) -> String {
    if needle.is_empty() {
        return haystack.to_string();
    }
    // ASCII lowercasing keeps byte offsets identical to the input.
    let lower_haystack = haystack.to_ascii_lowercase();
    let lower_needle = needle.to_ascii_lowercase();

    let mut out = String::with_capacity(haystack.len());
    let mut last = 0;
    for (start, _) in lower_haystack.match_indices(&lower_needle) {
        out.push_str(&haystack[last..start]);
        last = start + needle.len();
    }
    out.push_str(&haystack[last..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn context(method: &str, uri: &str, options: &RequestOptions) -> RequestContext {
        let headers = HeaderMap::new();
        RequestContext::from_raw(&RawRequest::new(method, uri, &headers), options)
    }

    #[test]
    fn test_strips_base_path_and_script_name() {
        let options = RequestOptions::new("/app/", "index.php");
        let ctx = context("get", "/app/index.php/users/5/", &options);
        assert_eq!(ctx.method, "GET");
        assert_eq!(ctx.normalized_path, "users/5");
        assert_eq!(ctx.raw_path, "/app/index.php/users/5/");

        let upper = context("GET", "/APP/Index.PHP/users/5", &options);
        assert_eq!(upper.normalized_path, "users/5");
    }

    #[test]
    fn test_base_path_removed_anywhere_in_uri() {
        // Substring removal, not prefix trimming: a later occurrence goes too.
        let options = RequestOptions::new("/app/", "");
        let ctx = context("GET", "/users/app/5", &options);
        assert_eq!(ctx.normalized_path, "users//5");
    }

    #[test]
    fn test_root_base_path_strips_nothing() {
        let ctx = context("GET", "/users/5", &RequestOptions::default());
        assert_eq!(ctx.normalized_path, "users/5");
        let root = context("GET", "/", &RequestOptions::default());
        assert_eq!(root.normalized_path, "");
    }

    #[test]
    fn test_get_embedded_query() {
        let ctx = context("GET", "/search?q=rust+lang&page=2", &RequestOptions::default());
        assert_eq!(ctx.normalized_path, "search");
        assert_eq!(ctx.query_param("q"), Some("rust lang"));
        assert_eq!(ctx.query_param("page"), Some("2"));
    }

    #[test]
    fn test_get_separate_query_string() {
        let headers = HeaderMap::new();
        let raw = RawRequest::new("GET", "/search", &headers).with_query_string("q=a&q=b");
        let ctx = RequestContext::from_raw(&raw, &RequestOptions::default());
        assert_eq!(ctx.normalized_path, "search");
        assert_eq!(ctx.query_param("q"), Some("b"));
    }

    #[test]
    fn test_post_body_parsed_as_form() {
        let headers = HeaderMap::new();
        let raw = RawRequest::new("POST", "/items/save", &headers)
            .with_body(b"description=hello%20world&id=7");
        let ctx = RequestContext::from_raw(&raw, &RequestOptions::default());
        assert_eq!(ctx.normalized_path, "items/save");
        assert_eq!(ctx.query_param("description"), Some("hello world"));
        assert_eq!(ctx.query_param("id"), Some("7"));
        assert!(!ctx.is_async);
    }

    #[test]
    fn test_post_keeps_embedded_query_in_path() {
        let ctx = context("POST", "/items?x=1", &RequestOptions::default());
        assert_eq!(ctx.normalized_path, "items?x=1");
        assert!(ctx.query_params.is_empty());
    }

    #[test]
    fn test_async_header_detection() {
        let mut headers = HeaderMap::new();
        headers.insert("X-Requested-With", HeaderValue::from_static("xmlhttprequest"));
        let raw = RawRequest::new("POST", "/items", &headers);
        assert!(RequestContext::from_raw(&raw, &RequestOptions::default()).is_async);

        headers.insert("X-Requested-With", HeaderValue::from_static("fetch"));
        let raw = RawRequest::new("POST", "/items", &headers);
        assert!(!RequestContext::from_raw(&raw, &RequestOptions::default()).is_async);
    }

    #[test]
    fn test_async_query_flag_detection() {
        let options = RequestOptions::default();
        assert!(context("GET", "/items?ajax", &options).is_async);
        assert!(context("POST", "/items?ajax=1", &options).is_async);
        assert!(!context("GET", "/items?other=1", &options).is_async);

        let disabled = RequestOptions {
            async_query_flag: String::new(),
            ..RequestOptions::default()
        };
        assert!(!context("GET", "/items?ajax", &disabled).is_async);
    }

    #[test]
    fn test_decodes_uri_and_reads_host() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("example.com"));
        let raw = RawRequest::new("GET", "/tags/rust%20lang", &headers).with_secure(true);
        let ctx = RequestContext::from_raw(&raw, &RequestOptions::default());
        assert_eq!(ctx.normalized_path, "tags/rust lang");
        assert_eq!(ctx.host.as_deref(), Some("example.com"));
        assert_eq!(ctx.scheme(), "https");
    }

    #[test]
    fn test_remove_ignore_ascii_case() {
        assert_eq!(remove_ignore_ascii_case("/A/b/a/", "a"), "//b//");
        assert_eq!(remove_ignore_ascii_case("abc", ""), "abc");
        assert_eq!(remove_ignore_ascii_case("Ünïcode/APP/x", "app"), "Ünïcode//x");
    }

    #[test]
    fn test_port_resolution() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("example.com:8080"));
        let raw = RawRequest::new("GET", "/", &headers).with_port(9000);
        let ctx = RequestContext::from_raw(&raw, &RequestOptions::default());
        assert_eq!(ctx.host.as_deref(), Some("example.com:8080"));
        assert_eq!(ctx.port, 8080);

        headers.insert(header::HOST, HeaderValue::from_static("example.com"));
        let raw = RawRequest::new("GET", "/", &headers).with_port(9000);
        assert_eq!(RequestContext::from_raw(&raw, &RequestOptions::default()).port, 9000);

        let raw = RawRequest::new("GET", "/", &headers).with_secure(true);
        assert_eq!(RequestContext::from_raw(&raw, &RequestOptions::default()).port, 443);
        assert_eq!(context("GET", "/", &RequestOptions::default()).port, 80);
    }
}
