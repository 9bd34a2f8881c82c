//! Shared utilities for integration tests.

use std::sync::{Arc, Mutex};

use axum::http::{HeaderMap, HeaderValue};
use pattern_router::pattern::{Captures, Matcher};
use pattern_router::{RawRequest, RequestContext, RequestOptions};

/// Build a context for a plain (non-async) request.
pub fn request(method: &str, uri: &str) -> RequestContext {
    let headers = HeaderMap::new();
    RequestContext::from_raw(&RawRequest::new(method, uri, &headers), &RequestOptions::default())
}

/// Build a context for a request carrying the async-request header.
#[allow(dead_code)]
pub fn async_request(method: &str, uri: &str) -> RequestContext {
    let mut headers = HeaderMap::new();
    headers.insert("x-requested-with", HeaderValue::from_static("XMLHttpRequest"));
    RequestContext::from_raw(&RawRequest::new(method, uri, &headers), &RequestOptions::default())
}

/// Matcher stub that records every evaluation in a shared log.
#[derive(Debug)]
#[allow(dead_code)]
pub struct RecordingMatcher {
    pub id: usize,
    pub matches: bool,
    pub source: String,
    pub log: Arc<Mutex<Vec<usize>>>,
}

#[allow(dead_code)]
impl RecordingMatcher {
    pub fn new(id: usize, matches: bool, log: &Arc<Mutex<Vec<usize>>>) -> Arc<Self> {
        Arc::new(Self {
            id,
            matches,
            source: format!("stub-{}", id),
            log: log.clone(),
        })
    }
}

impl Matcher for RecordingMatcher {
    fn match_path(&self, _path: &str) -> Option<Captures> {
        self.log.lock().unwrap().push(self.id);
        self.matches.then(|| Captures {
            positional: vec![format!("from-{}", self.id)],
            ..Captures::default()
        })
    }

    fn source(&self) -> &str {
        &self.source
    }
}
