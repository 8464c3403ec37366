//! Header-predicate routing.
//!
//! A source reference selects an ordered route table; the first route whose
//! header matchers all hold against the decoded request wins.

use crate::headers::HeaderMap;

/// Kinds of correlation a route establishes. The server ingress registers
/// reply correlations as `OutputEstablished`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    OutputEstablished,
}

/// A route table entry: header matchers plus the downstream target.
#[derive(Debug, Clone)]
pub struct Route {
    /// Headers that must all be present with equal values.
    pub headers: Vec<(String, String)>,
    /// Routable name of the downstream target.
    pub target: String,
    /// Reference carried on the target BEGIN.
    pub target_ref: u64,
}

impl Route {
    pub fn new(target: &str, target_ref: u64) -> Self {
        Route {
            headers: Vec::new(),
            target: target.to_string(),
            target_ref,
        }
    }

    /// Add a header matcher.
    pub fn when(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// All matchers must hold for the route to apply.
    pub fn matches(&self, headers: &HeaderMap) -> bool {
        self.headers
            .iter()
            .all(|(name, value)| headers.get(name) == Some(value.as_str()))
    }
}

/// Supplies the ordered route table for a source reference.
pub trait Router {
    fn supply_routes(&self, source_ref: u64) -> &[Route];
}

/// First route whose matchers all hold.
pub fn resolve<'a>(routes: &'a [Route], headers: &HeaderMap) -> Option<&'a Route> {
    routes.iter().find(|route| route.matches(headers))
}
