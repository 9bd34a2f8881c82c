//! Route methods, including the `XHR` pseudo-method.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::RouterError;
use crate::request::RequestContext;

/// Method a route entry is registered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RouteMethod {
    Get,
    Post,
    Put,
    Delete,
    Options,
    /// Matches asynchronous requests, whatever their verb.
    Xhr,
}

impl RouteMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            RouteMethod::Get => "GET",
            RouteMethod::Post => "POST",
            RouteMethod::Put => "PUT",
            RouteMethod::Delete => "DELETE",
            RouteMethod::Options => "OPTIONS",
            RouteMethod::Xhr => "XHR",
        }
    }

    /// Returns true if an entry under this method may handle the request.
    ///
    /// Async requests reach verb entries only when `async_matches_verbs` is set.
    pub fn accepts(self, ctx: &RequestContext, async_matches_verbs: bool) -> bool {
        match self {
            RouteMethod::Xhr => ctx.is_async,
            verb => ctx.method == verb.as_str() && (!ctx.is_async || async_matches_verbs),
        }
    }
}

impl fmt::Display for RouteMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RouteMethod {
    type Err = RouterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(RouteMethod::Get),
            "POST" => Ok(RouteMethod::Post),
            "PUT" => Ok(RouteMethod::Put),
            "DELETE" => Ok(RouteMethod::Delete),
            "OPTIONS" => Ok(RouteMethod::Options),
            "XHR" => Ok(RouteMethod::Xhr),
            _ => Err(RouterError::UnknownMethod {
                token: s.to_string(),
            }),
        }
    }
}

/// Expand a `|`-joined method list, keeping the listed order.
pub fn parse_methods(methods: &str) -> Vec<Result<RouteMethod, RouterError>> {
    methods.split('|').map(str::parse).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn ctx(method: &str, is_async: bool) -> RequestContext {
        RequestContext {
            method: method.to_string(),
            raw_path: String::new(),
            normalized_path: String::new(),
            query_params: BTreeMap::new(),
            is_async,
            host: None,
            secure: false,
            port: 80,
        }
    }

    #[test]
    fn test_parse_method_list() {
        let parsed = parse_methods("get| Post |XHR");
        assert_eq!(
            parsed,
            vec![Ok(RouteMethod::Get), Ok(RouteMethod::Post), Ok(RouteMethod::Xhr)]
        );

        let parsed = parse_methods("GET|PATCH");
        assert_eq!(parsed[0], Ok(RouteMethod::Get));
        assert_eq!(
            parsed[1],
            Err(RouterError::UnknownMethod {
                token: "PATCH".to_string()
            })
        );
    }

    #[test]
    fn test_verb_acceptance() {
        assert!(RouteMethod::Get.accepts(&ctx("GET", false), false));
        assert!(!RouteMethod::Get.accepts(&ctx("POST", false), false));
        assert!(!RouteMethod::Post.accepts(&ctx("POST", true), false));
        assert!(RouteMethod::Post.accepts(&ctx("POST", true), true));
    }

    #[test]
    fn test_xhr_acceptance() {
        assert!(RouteMethod::Xhr.accepts(&ctx("POST", true), false));
        assert!(RouteMethod::Xhr.accepts(&ctx("DELETE", true), true));
        assert!(!RouteMethod::Xhr.accepts(&ctx("POST", false), true));
    }
}
