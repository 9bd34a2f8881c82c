//! Adapter from `http` request parts to a [`RequestContext`].

use axum::http::request::Parts;
use axum::http::uri::Scheme;

use crate::request::context::{RawRequest, RequestContext, RequestOptions};

impl RequestContext {
    /// Build a context from already-read request parts and body bytes.
    pub fn from_http(parts: &Parts, body: &[u8], options: &RequestOptions) -> Self {
        let uri = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        let raw = RawRequest {
            method: parts.method.as_str(),
            uri,
            query_string: None,
            body,
            headers: &parts.headers,
            secure: parts.uri.scheme() == Some(&Scheme::HTTPS),
            port: parts.uri.port_u16(),
        };
        Self::from_raw(&raw, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    #[test]
    fn test_from_http_parts() {
        let (parts, ()) = Request::builder()
            .method("POST")
            .uri("https://example.com/app/items/3?ajax=1")
            .header("Host", "example.com")
            .body(())
            .unwrap()
            .into_parts();

        let options = RequestOptions::new("app", "");
        let ctx = RequestContext::from_http(&parts, b"description=new", &options);
        assert_eq!(ctx.method, "POST");
        assert_eq!(ctx.normalized_path, "items/3?ajax=1");
        assert_eq!(ctx.query_param("description"), Some("new"));
        assert!(ctx.is_async);
        assert!(ctx.secure);
        assert_eq!(ctx.host.as_deref(), Some("example.com"));
        assert_eq!(ctx.port, 443);
    }

    #[test]
    fn test_from_http_get_query() {
        let (parts, ()) = Request::builder()
            .uri("/users/5?tab=posts")
            .header("X-Requested-With", "XMLHttpRequest")
            .body(())
            .unwrap()
            .into_parts();

        let ctx = RequestContext::from_http(&parts, &[], &RequestOptions::default());
        assert_eq!(ctx.method, "GET");
        assert_eq!(ctx.normalized_path, "users/5");
        assert_eq!(ctx.query_param("tab"), Some("posts"));
        assert!(ctx.is_async);
        assert!(!ctx.secure);
    }
}
