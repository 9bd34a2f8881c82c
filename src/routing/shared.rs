//! Hot-swappable router handle.
//!
//! Readers load the current sealed [`Router`] without locking; a reload
//! builds a complete new router and swaps it in atomically. Requests already
//! holding the previous router finish against it.

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::routing::router::Router;

pub struct SharedRouter {
    current: ArcSwap<Router>,
}

impl SharedRouter {
    pub fn new(router: Router) -> Self {
        Self {
            current: ArcSwap::from_pointee(router),
        }
    }

    /// The router currently in effect.
    pub fn load(&self) -> Arc<Router> {
        self.current.load_full()
    }

    /// Install a new router, returning the previous one.
    pub fn replace(&self, router: Router) -> Arc<Router> {
        let previous = self.current.swap(Arc::new(router));
        tracing::info!(
            previous_routes = previous.len(),
            routes = self.current.load().len(),
            "Route table replaced"
        );
        previous
    }
}

impl fmt::Debug for SharedRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedRouter")
            .field("routes", &self.current.load().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{RawRequest, RequestContext, RequestOptions};
    use axum::http::HeaderMap;
    use std::thread;

    fn router_with(pattern: &str) -> Router {
        let mut builder = Router::builder();
        builder.get(pattern, "h", Vec::new());
        builder.build()
    }

    #[test]
    fn test_replace_affects_later_loads() {
        let shared = SharedRouter::new(router_with("old"));
        let held = shared.load();

        let previous = shared.replace(router_with("new"));
        assert_eq!(previous.routes()[0].pattern(), "old");
        assert_eq!(held.routes()[0].pattern(), "old");
        assert_eq!(shared.load().routes()[0].pattern(), "new");
    }

    #[test]
    fn test_concurrent_resolution() {
        let shared = SharedRouter::new(router_with("users/(<id>:n!)"));
        let headers = HeaderMap::new();
        let ctx = RequestContext::from_raw(
            &RawRequest::new("GET", "/users/12", &headers),
            &RequestOptions::default(),
        );

        thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for _ in 0..100 {
                        let result = shared.load().resolve(&ctx);
                        assert_eq!(result.param("id"), Some("12"));
                    }
                });
            }
        });
    }
}
