//! Link building and URL encoding helpers.
//!
//! # Responsibilities
//! - Normalize the configured base path
//! - Build relative and absolute links under the base path
//! - Encode links while keeping `&` / `=` separators readable, and decode them
//!
//! # Design Decisions
//! - Encoding follows `application/x-www-form-urlencoded` (space → `+`)
//! - Separators are preserved by encoding the text between them, so input
//!   that happens to contain placeholder-like text still round-trips

use percent_encoding::percent_decode_str;
use url::form_urlencoded;

use crate::request::RequestContext;

/// Normalize a base path to `/`, or `/segment(s)/` with exactly one slash at
/// each end.
pub fn normalize_base_path(base_path: &str) -> String {
    let trimmed = base_path.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", trimmed)
    }
}

/// Percent-encode a link.
///
/// With `encode_separators` false, `&` and `=` stay literal so query-like
/// links remain readable.
pub fn encode_link(link: &str, encode_separators: bool) -> String {
    if encode_separators {
        return form_urlencoded::byte_serialize(link.as_bytes()).collect();
    }

    let mut encoded = String::with_capacity(link.len());
    let mut rest = link;
    while let Some(pos) = rest.find(['&', '=']) {
        encoded.extend(form_urlencoded::byte_serialize(rest[..pos].as_bytes()));
        encoded.push_str(&rest[pos..pos + 1]);
        rest = &rest[pos + 1..];
    }
    encoded.extend(form_urlencoded::byte_serialize(rest.as_bytes()));
    encoded
}

/// Decode a URL-encoded link (`+` → space, then `%XX` sequences).
pub fn decode_link(link: &str) -> String {
    let spaced = link.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

/// Builds links relative to the application's base path.
#[derive(Debug, Clone)]
pub struct LinkBuilder {
    base_path: String,
    domain: Option<String>,
}

impl LinkBuilder {
    /// Create a builder. `domain` overrides the request's Host header when
    /// building absolute links.
    pub fn new(base_path: &str, domain: Option<String>) -> Self {
        Self {
            base_path: normalize_base_path(base_path),
            domain: domain.filter(|d| !d.is_empty()),
        }
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Relative link under the base path.
    pub fn url(&self, link: &str) -> String {
        format!("{}{}", self.base_path, link)
    }

    /// Absolute link, using the configured domain or the request's host.
    /// Returns `None` when neither is known.
    pub fn full_url(&self, link: &str, ctx: &RequestContext) -> Option<String> {
        let domain = self.domain.as_deref().or(ctx.host.as_deref())?;
        Some(format!(
            "{}://{}{}",
            ctx.scheme(),
            domain,
            self.url(link)
        ))
    }
}
