//! Ordered handler chain.
//!
//! # Responsibilities
//! - Store (handler, rules) entries in registration order
//! - Find the first entry whose rule matches the request path
//! - Dispatch to that entry's handler with the path rebased on the mount
//!
//! # Design Decisions
//! - Built through [`HandlerChainBuilder`], then frozen
//! - Immutable after construction (thread-safe without locks)
//! - O(n) rule scan (acceptable for typical rule counts)
//! - No match is answered with a plain 404, never an error

use std::fmt;
use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::http::handler::HandlerRef;
use crate::http::request::{rewrite_path, MountContext};
use crate::observability::metrics;
use crate::routing::matcher::MountRule;

/// A handler bound to one or more mount rules.
pub struct HandlerEntry {
    name: String,
    handler: HandlerRef,
    rules: Vec<MountRule>,
}

impl HandlerEntry {
    /// Label used in logs and metrics.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rules(&self) -> &[MountRule] {
        &self.rules
    }

    pub fn handler(&self) -> &HandlerRef {
        &self.handler
    }
}

impl fmt::Debug for HandlerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerEntry")
            .field("name", &self.name)
            .field("rules", &self.rules)
            .finish_non_exhaustive()
    }
}

/// Successful lookup: the entry, the rule that matched, and the path below
/// the rule's context path.
#[derive(Debug)]
pub struct ChainMatch<'c, 'p> {
    pub entry: &'c HandlerEntry,
    pub rule: &'c MountRule,
    pub rest: &'p str,
}

#[derive(Default)]
pub struct HandlerChainBuilder {
    entries: Vec<HandlerEntry>,
}

impl HandlerChainBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. Entries added earlier take precedence.
    pub fn add_handler(
        mut self,
        name: impl Into<String>,
        handler: HandlerRef,
        rules: Vec<MountRule>,
    ) -> Self {
        let name = name.into();
        tracing::debug!(
            handler = %name,
            rules = ?rules.iter().map(ToString::to_string).collect::<Vec<_>>(),
            "Handler registered"
        );
        self.entries.push(HandlerEntry {
            name,
            handler,
            rules,
        });
        self
    }

    pub fn build(self) -> HandlerChain {
        HandlerChain {
            entries: self.entries,
        }
    }
}

/// Frozen, precedence-ordered dispatch table.
#[derive(Debug)]
pub struct HandlerChain {
    entries: Vec<HandlerEntry>,
}

impl HandlerChain {
    pub fn builder() -> HandlerChainBuilder {
        HandlerChainBuilder::new()
    }

    pub fn entries(&self) -> &[HandlerEntry] {
        &self.entries
    }

    /// First matching entry across the whole chain.
    pub fn find<'c, 'p>(&'c self, path: &'p str) -> Option<ChainMatch<'c, 'p>> {
        self.entries.iter().find_map(|entry| {
            entry.rules.iter().find_map(|rule| {
                rule.resolve(path).map(|rest| ChainMatch { entry, rule, rest })
            })
        })
    }

    /// Route a request to exactly one handler.
    pub async fn dispatch(&self, mut request: Request<Body>) -> Response {
        let start_time = Instant::now();
        let path = request.uri().path().to_string();

        let found = match self.find(&path) {
            Some(found) => found,
            None => {
                tracing::debug!(path = %path, "No handler matched");
                metrics::record_dispatch("none", StatusCode::NOT_FOUND.as_u16(), start_time);
                return StatusCode::NOT_FOUND.into_response();
            }
        };

        tracing::trace!(
            path = %path,
            handler = %found.entry.name,
            rule = %found.rule,
            "Dispatching"
        );

        let mount = MountContext {
            context_path: found.rule.context_path().to_string(),
            url_pattern: found.rule.url_pattern().to_string(),
            original_uri: request.uri().clone(),
        };
        rewrite_path(&mut request, found.rest);
        request.extensions_mut().insert(mount);

        let response = found.entry.handler.handle(request).await;
        metrics::record_dispatch(&found.entry.name, response.status().as_u16(), start_time);
        response
    }
}
