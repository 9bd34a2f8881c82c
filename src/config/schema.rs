//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML route files.
//!
//! ```toml
//! [request]
//! base_path = "/app/"
//! script_name = "index.php"
//!
//! [routing]
//! force_run = false
//!
//! [[routes]]
//! method = "GET|POST"
//! pattern = "users/(<id>:n!)"
//! handler = "show_user"
//! extra_params = ["users"]
//! ```

use axum::http::HeaderName;
use serde::{Deserialize, Serialize};

use crate::request::context::{
    RequestOptions, DEFAULT_ASYNC_HEADER, DEFAULT_ASYNC_HEADER_VALUE, DEFAULT_ASYNC_QUERY_FLAG,
};
use crate::links::normalize_base_path;

/// Root configuration for a router.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RouterConfig {
    /// Request normalization settings.
    pub request: RequestConfig,

    /// Resolution behaviour.
    pub routing: RoutingConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Route table, in registration order.
    pub routes: Vec<RouteConfig>,
}

/// Request normalization configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RequestConfig {
    /// Directory the application is served from (e.g., "/some/").
    pub base_path: String,

    /// Front-controller file name removed from request URIs.
    pub script_name: String,

    /// Domain used for absolute links instead of the Host header.
    pub domain: Option<String>,

    /// Header marking asynchronous requests.
    pub async_header: String,

    /// Expected value of `async_header` (case-insensitive).
    pub async_header_value: String,

    /// Query key marking asynchronous requests; empty disables it.
    pub async_query_flag: String,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            base_path: "/".to_string(),
            script_name: String::new(),
            domain: None,
            async_header: DEFAULT_ASYNC_HEADER.to_string(),
            async_header_value: DEFAULT_ASYNC_HEADER_VALUE.to_string(),
            async_query_flag: DEFAULT_ASYNC_QUERY_FLAG.to_string(),
        }
    }
}

impl RequestConfig {
    /// Options for [`RequestContext`](crate::request::RequestContext) construction.
    pub fn options(&self) -> RequestOptions {
        let async_header = HeaderName::from_bytes(self.async_header.as_bytes()).unwrap_or_else(|_| {
            tracing::warn!(
                header = %self.async_header,
                "Invalid async header name, falling back to default"
            );
            HeaderName::from_static(DEFAULT_ASYNC_HEADER)
        });

        RequestOptions {
            base_path: normalize_base_path(&self.base_path),
            script_name: self.script_name.clone(),
            async_header,
            async_header_value: self.async_header_value.clone(),
            async_query_flag: self.async_query_flag.clone(),
        }
    }
}

/// Resolution configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RoutingConfig {
    /// Invoke the matched handler as part of dispatch.
    pub force_run: bool,

    /// Let asynchronous requests match plain verb routes too.
    pub async_matches_verbs: bool,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Prometheus endpoint bind address; disabled when unset.
    pub metrics_address: Option<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_address: None,
        }
    }
}

/// One route table entry.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Method or `|`-joined method list (GET, POST, PUT, DELETE, OPTIONS, XHR).
    pub method: String,

    /// One pattern or a list of patterns sharing the handler.
    pub pattern: PatternSet,

    /// Registered handler name.
    pub handler: String,

    /// Fixed arguments passed before the captured ones.
    #[serde(default)]
    pub extra_params: Vec<String>,
}

/// A single pattern or several.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum PatternSet {
    One(String),
    Many(Vec<String>),
}

impl PatternSet {
    pub fn patterns(&self) -> &[String] {
        match self {
            PatternSet::One(pattern) => std::slice::from_ref(pattern),
            PatternSet::Many(patterns) => patterns,
        }
    }
}
