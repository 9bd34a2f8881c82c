//! Handler abstraction.
//!
//! # Responsibilities
//! - Define what a route handler is ([`Handler`])
//! - Reference handlers directly or by registered name ([`HandlerRef`])
//! - Hold named handlers ([`HandlerRegistry`])
//!
//! # Design Decisions
//! - Handlers receive one ordered argument list (extra params, then
//!   positional captures); named captures and query params are read through
//!   [`Invocation`] accessors
//! - A name with no registered handler is a logged error, not a panic

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use crate::routing::dispatch::DispatchResult;

/// Arguments passed to a handler.
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    args: &'a [String],
    result: &'a DispatchResult,
}

impl<'a> Invocation<'a> {
    pub fn new(args: &'a [String], result: &'a DispatchResult) -> Self {
        Self { args, result }
    }

    /// Ordered arguments: extra params followed by positional captures.
    pub fn args(&self) -> &'a [String] {
        self.args
    }

    pub fn arg(&self, index: usize) -> Option<&'a str> {
        self.args.get(index).map(String::as_str)
    }

    /// Named capture or query parameter by name.
    pub fn param(&self, name: &str) -> Option<&'a str> {
        self.result.param(name)
    }

    /// Query parameters merged with named captures.
    pub fn params(&self) -> BTreeMap<String, String> {
        self.result.params()
    }

    pub fn result(&self) -> &'a DispatchResult {
        self.result
    }
}

/// A route handler.
pub trait Handler: Send + Sync {
    fn call(&self, invocation: &Invocation<'_>);

    /// Label used in logs and dispatch results.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl<F> Handler for F
where
    F: Fn(&Invocation<'_>) + Send + Sync,
{
    fn call(&self, invocation: &Invocation<'_>) {
        self(invocation)
    }
}

/// Reference to a handler: either the handler itself or a registered name.
#[derive(Clone)]
pub enum HandlerRef {
    Direct(Arc<dyn Handler>),
    Named(String),
}

impl HandlerRef {
    /// Wrap a closure.
    pub fn func<F>(f: F) -> Self
    where
        F: Fn(&Invocation<'_>) + Send + Sync + 'static,
    {
        HandlerRef::Direct(Arc::new(f))
    }

    pub fn label(&self) -> String {
        match self {
            HandlerRef::Direct(handler) => handler.name().to_string(),
            HandlerRef::Named(name) => name.clone(),
        }
    }

    /// Look up the callable handler, if there is one.
    pub fn resolve(&self, registry: &HandlerRegistry) -> Option<Arc<dyn Handler>> {
        match self {
            HandlerRef::Direct(handler) => Some(handler.clone()),
            HandlerRef::Named(name) => registry.get(name),
        }
    }
}

impl fmt::Debug for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerRef::Direct(handler) => f.debug_tuple("Direct").field(&handler.name()).finish(),
            HandlerRef::Named(name) => f.debug_tuple("Named").field(name).finish(),
        }
    }
}

impl From<&str> for HandlerRef {
    fn from(name: &str) -> Self {
        HandlerRef::Named(name.to_string())
    }
}

impl From<String> for HandlerRef {
    fn from(name: String) -> Self {
        HandlerRef::Named(name)
    }
}

impl From<Arc<dyn Handler>> for HandlerRef {
    fn from(handler: Arc<dyn Handler>) -> Self {
        HandlerRef::Direct(handler)
    }
}

/// Named handlers available to a router.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn Handler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under `name`, replacing any previous one.
    pub fn register<H>(&mut self, name: impl Into<String>, handler: H) -> &mut Self
    where
        H: Handler + 'static,
    {
        self.handlers.insert(name.into(), Arc::new(handler));
        self
    }

    /// Register a closure under `name`.
    pub fn register_fn<F>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(&Invocation<'_>) + Send + Sync + 'static,
    {
        self.handlers.insert(name.into(), Arc::new(f));
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Handler>> {
        self.handlers.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.names())
            .finish()
    }
}
