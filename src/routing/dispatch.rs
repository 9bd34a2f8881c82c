//! Resolution outcome.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::routing::method::RouteMethod;

/// The route entry a resolution selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteMatch {
    /// Position of the entry in the router's table.
    pub index: usize,
    pub method: RouteMethod,
    /// Pattern source of the entry.
    pub pattern: String,
    /// Handler label (registered name or handler type).
    pub handler: String,
}

/// Result of resolving one request against a router.
///
/// Parameters are only populated when a route matched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchResult {
    matched: Option<RouteMatch>,
    positional_params: Vec<String>,
    named_params: BTreeMap<String, String>,
    query_params: BTreeMap<String, String>,
    errors: Vec<String>,
}

impl DispatchResult {
    pub(crate) fn unmatched(errors: Vec<String>) -> Self {
        Self {
            errors,
            ..Self::default()
        }
    }

    pub(crate) fn set_match(
        &mut self,
        matched: RouteMatch,
        positional_params: Vec<String>,
        named_params: BTreeMap<String, String>,
        query_params: BTreeMap<String, String>,
    ) {
        self.matched = Some(matched);
        self.positional_params = positional_params;
        self.named_params = named_params;
        self.query_params = query_params;
    }

    pub(crate) fn push_error(&mut self, error: String) {
        self.errors.push(error);
    }

    pub fn is_match(&self) -> bool {
        self.matched.is_some()
    }

    pub fn matched(&self) -> Option<&RouteMatch> {
        self.matched.as_ref()
    }

    /// Handler arguments: extra params followed by positional captures.
    pub fn args(&self) -> &[String] {
        &self.positional_params
    }

    pub fn named_params(&self) -> &BTreeMap<String, String> {
        &self.named_params
    }

    pub fn query_params(&self) -> &BTreeMap<String, String> {
        &self.query_params
    }

    /// Named capture by name, falling back to query parameters.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.named_params
            .get(name)
            .or_else(|| self.query_params.get(name))
            .map(String::as_str)
    }

    /// Query parameters merged with named captures; captures win on conflict.
    pub fn params(&self) -> BTreeMap<String, String> {
        let mut params = self.query_params.clone();
        params.extend(self.named_params.iter().map(|(k, v)| (k.clone(), v.clone())));
        params
    }

    /// Registration errors of the router plus any dispatch-time errors.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}
