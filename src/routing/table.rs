//! Route table compilation and lookup.
//!
//! # Responsibilities
//! - Compile RouteConfig entries into RouteEntry values
//! - Reject duplicate names and ambiguous patterns before any lookup
//! - Find the best-ranked entry for a route path
//!
//! # Design Decisions
//! - Immutable after construction
//! - O(n) scan over entries (route tables are tiny)
//! - Static segments outrank parameters at the same position

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::config::schema::RouteConfig;
use crate::routing::matcher::{Params, PathPattern, PatternError, ShapePart};
use crate::views::ViewId;

/// Error building a route table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteTableError {
    #[error("route '{name}': {source}")]
    InvalidPattern { name: String, source: PatternError },
    #[error("route name '{0}' is used more than once")]
    DuplicateName(String),
    #[error("routes '{first}' and '{second}' match the same paths")]
    AmbiguousPatterns { first: String, second: String },
}

/// One navigable path.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    pub name: String,
    pub pattern: PathPattern,
    pub view: ViewId,
}

/// A route path matched against the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteMatch {
    pub route: String,
    pub view: ViewId,
    pub path: String,
    pub params: Params,
    pub query: Params,
}

/// Compiled, immutable set of routes.
#[derive(Debug, Clone)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    /// Compile `routes`, failing on the first problem found.
    pub fn build(routes: Vec<RouteConfig>) -> Result<Self, RouteTableError> {
        if let Some(err) = Self::check(&routes).into_iter().next() {
            return Err(err);
        }

        let entries = routes
            .into_iter()
            .map(|r| {
                let pattern = PathPattern::parse(&r.path).map_err(|source| {
                    RouteTableError::InvalidPattern {
                        name: r.name.clone(),
                        source,
                    }
                })?;
                Ok(RouteEntry {
                    name: r.name,
                    pattern,
                    view: r.view,
                })
            })
            .collect::<Result<Vec<_>, RouteTableError>>()?;

        Ok(Self { entries })
    }

    /// Every problem with `routes`, in declaration order.
    pub fn check(routes: &[RouteConfig]) -> Vec<RouteTableError> {
        let mut errors = Vec::new();
        let mut names = HashSet::new();
        let mut shapes: HashMap<Vec<ShapePart>, &str> = HashMap::new();

        for route in routes {
            if !names.insert(route.name.as_str()) {
                errors.push(RouteTableError::DuplicateName(route.name.clone()));
            }

            let pattern = match PathPattern::parse(&route.path) {
                Ok(pattern) => pattern,
                Err(source) => {
                    errors.push(RouteTableError::InvalidPattern {
                        name: route.name.clone(),
                        source,
                    });
                    continue;
                }
            };

            for shape in pattern.shapes() {
                match shapes.get(&shape) {
                    Some(first) if *first != route.name.as_str() => {
                        errors.push(RouteTableError::AmbiguousPatterns {
                            first: (*first).to_string(),
                            second: route.name.clone(),
                        });
                        break;
                    }
                    Some(_) => {}
                    None => {
                        shapes.insert(shape, route.name.as_str());
                    }
                }
            }
        }

        errors
    }

    /// Best-ranked route matching `path`.
    pub fn lookup(&self, path: &str) -> Option<(&RouteEntry, Params)> {
        self.entries
            .iter()
            .filter_map(|entry| entry.pattern.matches(path).map(|params| (entry, params)))
            .max_by(|(a, _), (b, _)| a.pattern.specificity().cmp(&b.pattern.specificity()))
    }

    pub fn get(&self, name: &str) -> Option<&RouteEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    /// True when any route binds a path parameter.
    pub fn parameter_variant(&self) -> bool {
        self.entries.iter().any(|e| e.pattern.has_params())
    }
}
