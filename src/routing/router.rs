//! Route table and dispatch.
//!
//! # Responsibilities
//! - Register routes (method list × pattern list) in order
//! - Seal the table into an immutable [`Router`]
//! - Resolve a request to at most one route, first match wins
//! - Invoke the matched handler, now (force-run) or later (`run`)
//!
//! # Design Decisions
//! - Registration is total: bad patterns and unknown methods are logged,
//!   never raised, and the rest of the table still registers
//! - Resolution returns its result by value; the router holds no
//!   per-request state and is safe to share across threads
//! - The walk stops at the first matching entry; later entries are never
//!   evaluated

use std::sync::Arc;

use crate::config::RouterConfig;
use crate::error::RouterError;
use crate::observability::metrics;
use crate::pattern::{compile, Matcher};
use crate::request::RequestContext;
use crate::routing::dispatch::{DispatchResult, RouteMatch};
use crate::routing::handler::{Handler, HandlerRef, HandlerRegistry, Invocation};
use crate::routing::method::{parse_methods, RouteMethod};

/// A registered route.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    method: RouteMethod,
    matcher: Arc<dyn Matcher>,
    handler: HandlerRef,
    extra_params: Vec<String>,
}

impl RouteEntry {
    pub fn method(&self) -> RouteMethod {
        self.method
    }

    /// Pattern source the entry was registered with.
    pub fn pattern(&self) -> &str {
        self.matcher.source()
    }

    pub fn handler(&self) -> &HandlerRef {
        &self.handler
    }

    pub fn extra_params(&self) -> &[String] {
        &self.extra_params
    }
}

/// Assembles a route table.
#[derive(Debug, Clone, Default)]
pub struct RouterBuilder {
    entries: Vec<RouteEntry>,
    errors: Vec<RouterError>,
    handlers: HandlerRegistry,
    force_run: bool,
    async_matches_verbs: bool,
}

impl RouterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pre-loaded with the routes and options of a config file.
    ///
    /// Handlers are referenced by name; register them before dispatching.
    pub fn from_config(config: &RouterConfig) -> Self {
        let mut builder = Self::new();
        builder
            .force_run(config.routing.force_run)
            .async_matches_verbs(config.routing.async_matches_verbs);
        for route in &config.routes {
            builder.map_all(
                &route.method,
                route.pattern.patterns(),
                route.handler.as_str(),
                route.extra_params.clone(),
            );
        }
        builder
    }

    /// Invoke the matched handler during [`Router::dispatch`].
    pub fn force_run(&mut self, force: bool) -> &mut Self {
        self.force_run = force;
        self
    }

    /// Let asynchronous requests match verb entries as well as `XHR` ones.
    pub fn async_matches_verbs(&mut self, enabled: bool) -> &mut Self {
        self.async_matches_verbs = enabled;
        self
    }

    /// Replace the named-handler registry.
    pub fn handlers(&mut self, registry: HandlerRegistry) -> &mut Self {
        self.handlers = registry;
        self
    }

    pub fn handler<H>(&mut self, name: impl Into<String>, handler: H) -> &mut Self
    where
        H: Handler + 'static,
    {
        self.handlers.register(name, handler);
        self
    }

    pub fn handler_fn<F>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(&Invocation<'_>) + Send + Sync + 'static,
    {
        self.handlers.register_fn(name, f);
        self
    }

    /// Register `pattern` under every method of `methods` (`|`-joined).
    pub fn map(
        &mut self,
        methods: &str,
        pattern: &str,
        handler: impl Into<HandlerRef>,
        extra_params: Vec<String>,
    ) -> &mut Self {
        self.map_all(methods, &[pattern], handler, extra_params)
    }

    /// Register every pattern under every method, method-major.
    pub fn map_all<P: AsRef<str>>(
        &mut self,
        methods: &str,
        patterns: &[P],
        handler: impl Into<HandlerRef>,
        extra_params: Vec<String>,
    ) -> &mut Self {
        let handler = handler.into();

        let mut compiled = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            let pattern = pattern.as_ref();
            match compile(pattern) {
                Ok(route_pattern) => compiled.push(route_pattern),
                Err(source) => self.record(RouterError::Compile {
                    pattern: pattern.to_string(),
                    source,
                }),
            }
        }

        for method in parse_methods(methods) {
            match method {
                Ok(method) => {
                    for route_pattern in &compiled {
                        self.push(
                            method,
                            Arc::new(route_pattern.clone()),
                            handler.clone(),
                            extra_params.clone(),
                        );
                    }
                }
                Err(e) => self.record(e),
            }
        }
        self
    }

    /// Register a custom matcher in place of a compiled pattern.
    pub fn register_matcher(
        &mut self,
        methods: &str,
        matcher: Arc<dyn Matcher>,
        handler: impl Into<HandlerRef>,
        extra_params: Vec<String>,
    ) -> &mut Self {
        let handler = handler.into();
        for method in parse_methods(methods) {
            match method {
                Ok(method) => self.push(method, matcher.clone(), handler.clone(), extra_params.clone()),
                Err(e) => self.record(e),
            }
        }
        self
    }

    pub fn get(&mut self, pattern: &str, handler: impl Into<HandlerRef>, extra_params: Vec<String>) -> &mut Self {
        self.map("GET", pattern, handler, extra_params)
    }

    pub fn post(&mut self, pattern: &str, handler: impl Into<HandlerRef>, extra_params: Vec<String>) -> &mut Self {
        self.map("POST", pattern, handler, extra_params)
    }

    pub fn put(&mut self, pattern: &str, handler: impl Into<HandlerRef>, extra_params: Vec<String>) -> &mut Self {
        self.map("PUT", pattern, handler, extra_params)
    }

    pub fn delete(&mut self, pattern: &str, handler: impl Into<HandlerRef>, extra_params: Vec<String>) -> &mut Self {
        self.map("DELETE", pattern, handler, extra_params)
    }

    pub fn options(&mut self, pattern: &str, handler: impl Into<HandlerRef>, extra_params: Vec<String>) -> &mut Self {
        self.map("OPTIONS", pattern, handler, extra_params)
    }

    pub fn xhr(&mut self, pattern: &str, handler: impl Into<HandlerRef>, extra_params: Vec<String>) -> &mut Self {
        self.map("XHR", pattern, handler, extra_params)
    }

    /// Errors recorded so far.
    pub fn errors(&self) -> &[RouterError] {
        &self.errors
    }

    /// Seal the current table into a router.
    pub fn build(&self) -> Router {
        tracing::debug!(
            routes = self.entries.len(),
            errors = self.errors.len(),
            handlers = self.handlers.len(),
            "Route table sealed"
        );
        Router {
            entries: self.entries.clone(),
            errors: self.errors.clone(),
            handlers: self.handlers.clone(),
            force_run: self.force_run,
            async_matches_verbs: self.async_matches_verbs,
        }
    }

    fn push(
        &mut self,
        method: RouteMethod,
        matcher: Arc<dyn Matcher>,
        handler: HandlerRef,
        extra_params: Vec<String>,
    ) {
        tracing::debug!(
            method = %method,
            pattern = %matcher.source(),
            handler = %handler.label(),
            "Route registered"
        );
        self.entries.push(RouteEntry {
            method,
            matcher,
            handler,
            extra_params,
        });
    }

    fn record(&mut self, error: RouterError) {
        tracing::warn!(error = %error, "Route registration rejected");
        metrics::record_registration_error(error.kind());
        self.errors.push(error);
    }
}

/// An immutable route table.
#[derive(Debug)]
pub struct Router {
    entries: Vec<RouteEntry>,
    errors: Vec<RouterError>,
    handlers: HandlerRegistry,
    force_run: bool,
    async_matches_verbs: bool,
}

impl Router {
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    /// Find the first entry accepting the request's method and path.
    ///
    /// The result's errors start with the router's registration errors.
    pub fn resolve(&self, ctx: &RequestContext) -> DispatchResult {
        let mut result =
            DispatchResult::unmatched(self.errors.iter().map(ToString::to_string).collect());

        for (index, entry) in self.entries.iter().enumerate() {
            if !entry.method.accepts(ctx, self.async_matches_verbs) {
                continue;
            }
            let Some(captures) = entry.matcher.match_path(&ctx.normalized_path) else {
                continue;
            };

            let args = entry
                .extra_params
                .iter()
                .cloned()
                .chain(captures.positional)
                .collect();
            result.set_match(
                RouteMatch {
                    index,
                    method: entry.method,
                    pattern: entry.matcher.source().to_string(),
                    handler: entry.handler.label(),
                },
                args,
                captures.named,
                ctx.query_params.clone(),
            );

            tracing::debug!(
                method = %ctx.method,
                path = %ctx.normalized_path,
                route = index,
                pattern = %entry.matcher.source(),
                "Route matched"
            );
            metrics::record_resolution("matched");
            return result;
        }

        tracing::debug!(
            method = %ctx.method,
            path = %ctx.normalized_path,
            is_async = ctx.is_async,
            "No route matched"
        );
        metrics::record_resolution("unmatched");
        result
    }

    /// Resolve, and with force-run enabled invoke the matched handler at once.
    pub fn dispatch(&self, ctx: &RequestContext) -> DispatchResult {
        let mut result = self.resolve(ctx);
        if self.force_run {
            self.run(&mut result);
        }
        result
    }

    /// Invoke the handler of a resolved result.
    ///
    /// Returns true if a handler ran. A handler that cannot be found is
    /// recorded in the result's errors.
    pub fn run(&self, result: &mut DispatchResult) -> bool {
        let (index, pattern, label) = match result.matched() {
            Some(m) => (m.index, m.pattern.clone(), m.handler.clone()),
            None => return false,
        };

        let handler = self
            .entries
            .get(index)
            .filter(|entry| entry.matcher.source() == pattern)
            .and_then(|entry| entry.handler.resolve(&self.handlers));

        match handler {
            Some(handler) => {
                handler.call(&Invocation::new(result.args(), result));
                true
            }
            None => {
                self.record_handler_error(result, label);
                false
            }
        }
    }

    /// Fallback for unmatched requests.
    ///
    /// Runs `handler` with `extra_params` only when the result has no match
    /// and no errors. Returns true if it ran.
    pub fn not_found(
        &self,
        result: &mut DispatchResult,
        handler: impl Into<HandlerRef>,
        extra_params: Vec<String>,
    ) -> bool {
        if result.is_match() || result.has_errors() {
            return false;
        }

        let handler = handler.into();
        match handler.resolve(&self.handlers) {
            Some(callable) => {
                callable.call(&Invocation::new(&extra_params, result));
                true
            }
            None => {
                self.record_handler_error(result, handler.label());
                false
            }
        }
    }

    /// Registered entries, in registration order.
    pub fn routes(&self) -> &[RouteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Errors recorded while the table was registered.
    pub fn errors(&self) -> &[RouterError] {
        &self.errors
    }

    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    pub fn is_force_run(&self) -> bool {
        self.force_run
    }

    fn record_handler_error(&self, result: &mut DispatchResult, handler: String) {
        let error = RouterError::NoCallableHandler { handler };
        tracing::warn!(error = %error, "Handler invocation failed");
        metrics::record_handler_error();
        result.push_error(error.to_string());
    }
}
