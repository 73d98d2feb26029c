//! Route resolution and navigation.
//!
//! # Responsibilities
//! - Own the route table, history and current RouterState
//! - Resolve locations to routes and bind parameters
//! - Apply navigation events and the not-found policy
//! - Hand activated views their parameters and the call configuration
//!
//! # Design Decisions
//! - Route table and history root are fixed at construction
//! - The call configuration is read once, through a ConfigProvider
//! - Navigation is synchronous; every event ends in one re-resolution
//! - Explicit NotFound state rather than silent default

use std::sync::Arc;

use serde::Serialize;

use crate::config::env::{CallConfig, ConfigProvider};
use crate::config::schema::{NotFoundPolicy, RootSource, RouterConfig};
use crate::config::validation::check_redirect_target;
use crate::observability::metrics;
use crate::routing::history::{History, HistoryBase, HistoryMode, MemoryHistory};
use crate::routing::matcher::{BuildError, Params};
use crate::routing::table::{RouteMatch, RouteTable, RouteTableError};
use crate::views::{ViewHandle, ViewId};

/// Parameter carrying the unmatched path into the not-found view.
pub const NOT_FOUND_PARAM: &str = "pathMatch";

/// Error constructing a router.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    #[error(transparent)]
    Table(#[from] RouteTableError),
    #[error("invalid not-found policy: {0}")]
    NotFoundPolicy(String),
}

/// No route matches a location.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no route matches '{path}'")]
pub struct RouteNotMatched {
    pub path: String,
}

/// Error building a navigation target.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavigationError {
    #[error("no route named '{0}'")]
    UnknownRoute(String),
    #[error("route '{route}' is missing required parameter '{param}'")]
    MissingParam { route: String, param: String },
    #[error("route '{route}' cannot take '{value}' for parameter '{param}'")]
    InvalidParam {
        route: String,
        param: String,
        value: String,
    },
}

/// What the router currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RouterState {
    /// Constructed, no location resolved yet.
    Unresolved,
    Resolved(RouteMatch),
    NotFound { path: String },
}

impl RouterState {
    pub fn route_match(&self) -> Option<&RouteMatch> {
        match self {
            RouterState::Resolved(m) => Some(m),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RouterState::NotFound { .. })
    }
}

/// Client-side router over a history mechanism.
#[derive(Debug)]
pub struct Router<H = MemoryHistory> {
    table: RouteTable,
    base: HistoryBase,
    not_found: NotFoundPolicy,
    /// Href and match of the redirect target, fixed at construction.
    redirect: Option<(String, RouteMatch)>,
    config: Arc<CallConfig>,
    history: H,
    state: RouterState,
}

impl Router<MemoryHistory> {
    /// Router over an in-process history starting at the history root.
    pub fn new(config: RouterConfig, provider: &dyn ConfigProvider) -> Result<Self, RouterError> {
        let call_config = provider.call_config();
        let base = history_base(&config, &call_config);
        let history = MemoryHistory::new(base.href("/"));
        Self::build(config, call_config, base, history)
    }
}

impl<H: History> Router<H> {
    /// Router over a caller-supplied history.
    pub fn with_history(
        config: RouterConfig,
        provider: &dyn ConfigProvider,
        history: H,
    ) -> Result<Self, RouterError> {
        let call_config = provider.call_config();
        let base = history_base(&config, &call_config);
        Self::build(config, call_config, base, history)
    }

    fn build(
        config: RouterConfig,
        call_config: Arc<CallConfig>,
        base: HistoryBase,
        history: H,
    ) -> Result<Self, RouterError> {
        if let NotFoundPolicy::Redirect { route } = &config.not_found {
            check_redirect_target(&config.routes, route)
                .map_err(|e| RouterError::NotFoundPolicy(e.to_string()))?;
        }
        let table = RouteTable::build(config.routes)?;

        let redirect = match &config.not_found {
            NotFoundPolicy::View => None,
            NotFoundPolicy::Redirect { route } => {
                let href = build_href(&table, &base, route, &Params::new())
                    .map_err(|e| RouterError::NotFoundPolicy(e.to_string()))?;
                let m = base
                    .route_location(&href)
                    .and_then(|location| match_location(&table, &location).ok())
                    .ok_or_else(|| {
                        RouterError::NotFoundPolicy(format!(
                            "redirect target '{}' does not resolve from '{}'",
                            route, href
                        ))
                    })?;
                Some((href, m))
            }
        };

        tracing::info!(
            mode = ?base.mode(),
            base = %base.base(),
            routes = table.entries().len(),
            parameter_variant = table.parameter_variant(),
            "Router constructed"
        );

        Ok(Self {
            table,
            base,
            not_found: config.not_found,
            redirect,
            config: call_config,
            history,
            state: RouterState::Unresolved,
        })
    }

    pub fn state(&self) -> &RouterState {
        &self.state
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn history_base(&self) -> &HistoryBase {
        &self.base
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    pub fn not_found_policy(&self) -> &NotFoundPolicy {
        &self.not_found
    }

    /// Href unmatched locations are redirected to, under the redirect policy.
    pub fn redirect_target(&self) -> Option<&str> {
        self.redirect.as_ref().map(|(href, _)| href.as_str())
    }

    pub fn call_config(&self) -> &Arc<CallConfig> {
        &self.config
    }

    pub fn current_href(&self) -> &str {
        self.history.location()
    }

    /// Resolve a route location such as `/call/abc?x=1`.
    pub fn resolve(&self, location: &str) -> Result<RouteMatch, RouteNotMatched> {
        let resolved = match_location(&self.table, location);
        match &resolved {
            Ok(m) => metrics::record_resolution(&m.route),
            Err(_) => metrics::record_not_found(),
        }
        resolved
    }

    /// Resolve a host href (absolute URL, origin-relative href or fragment).
    pub fn resolve_href(&self, href: &str) -> Result<RouteMatch, RouteNotMatched> {
        let location = self.base.route_location(href).ok_or_else(|| RouteNotMatched {
            path: href.to_string(),
        })?;
        self.resolve(&location)
    }

    /// Resolve `location` and apply the not-found policy, without
    /// touching history.
    pub fn resolve_state(&self, location: &str) -> RouterState {
        match self.resolve(location) {
            Ok(m) => RouterState::Resolved(m),
            Err(RouteNotMatched { path }) => match self.redirect() {
                Some((_, m)) => RouterState::Resolved(m),
                None => RouterState::NotFound { path },
            },
        }
    }

    /// Href that navigating to `name` with `params` would produce.
    pub fn href_for(&self, name: &str, params: &Params) -> Result<String, NavigationError> {
        build_href(&self.table, &self.base, name, params)
    }

    /// Initial load: take `href` as the current location and resolve it.
    pub fn start(&mut self, href: &str) -> &RouterState {
        self.history.replace(href.to_string());
        self.sync("start")
    }

    /// Push the named route onto history and resolve it.
    pub fn navigate(&mut self, name: &str, params: &Params) -> Result<&RouterState, NavigationError> {
        let href = self.href_for(name, params)?;
        self.history.push(href);
        Ok(self.sync("navigate"))
    }

    /// Push a route location onto history and resolve it.
    pub fn push(&mut self, location: &str) -> &RouterState {
        let href = self.base.href(location);
        self.history.push(href);
        self.sync("push")
    }

    /// Replace the current entry with a route location and resolve it.
    pub fn replace(&mut self, location: &str) -> &RouterState {
        let href = self.base.href(location);
        self.history.replace(href);
        self.sync("replace")
    }

    /// Move through history. Out-of-range moves leave the state unchanged.
    pub fn go(&mut self, delta: isize) -> &RouterState {
        if self.history.go(delta) {
            self.sync("traverse")
        } else {
            tracing::debug!(delta, "History traversal out of range");
            &self.state
        }
    }

    pub fn back(&mut self) -> &RouterState {
        self.go(-1)
    }

    pub fn forward(&mut self) -> &RouterState {
        self.go(1)
    }

    /// The view to mount for `state`; `None` while unresolved.
    pub fn activate(&self, state: &RouterState) -> Option<ViewHandle> {
        match state {
            RouterState::Unresolved => None,
            RouterState::Resolved(m) => Some(ViewHandle {
                view: m.view,
                route: Some(m.route.clone()),
                params: m.params.clone(),
                config: Arc::clone(&self.config),
            }),
            RouterState::NotFound { path } => Some(ViewHandle {
                view: ViewId::NotFound,
                route: None,
                params: Params::from([(NOT_FOUND_PARAM.to_string(), path.clone())]),
                config: Arc::clone(&self.config),
            }),
        }
    }

    /// Re-resolve the current history location into the router state.
    fn sync(&mut self, kind: &'static str) -> &RouterState {
        metrics::record_navigation(kind);
        let href = self.history.location().to_string();

        self.state = match self.resolve_href(&href) {
            Ok(m) => {
                tracing::debug!(kind, href = %href, route = %m.route, params = ?m.params, "Route resolved");
                RouterState::Resolved(m)
            }
            Err(RouteNotMatched { path }) => self.not_matched(kind, &href, path),
        };
        &self.state
    }

    fn not_matched(&mut self, kind: &'static str, href: &str, path: String) -> RouterState {
        match self.redirect() {
            Some((target, m)) => {
                tracing::info!(kind, href, path = %path, redirect = %target, "No route matched, redirecting");
                self.history.replace(target);
                RouterState::Resolved(m)
            }
            None => {
                tracing::info!(kind, href, path = %path, "No route matched");
                RouterState::NotFound { path }
            }
        }
    }

    fn redirect(&self) -> Option<(String, RouteMatch)> {
        self.redirect.clone()
    }
}

/// Match a route location such as `/call/abc?x=1#top` against `table`.
fn match_location(table: &RouteTable, location: &str) -> Result<RouteMatch, RouteNotMatched> {
    let (location, _fragment) = location.split_once('#').unwrap_or((location, ""));
    let (path, query) = location.split_once('?').unwrap_or((location, ""));
    let path = if path.is_empty() { "/" } else { path };

    let (entry, params) = table.lookup(path).ok_or_else(|| RouteNotMatched {
        path: path.to_string(),
    })?;
    Ok(RouteMatch {
        route: entry.name.clone(),
        view: entry.view,
        path: path.to_string(),
        params,
        query: url::form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect(),
    })
}

fn build_href(
    table: &RouteTable,
    base: &HistoryBase,
    name: &str,
    params: &Params,
) -> Result<String, NavigationError> {
    let entry = table
        .get(name)
        .ok_or_else(|| NavigationError::UnknownRoute(name.to_string()))?;

    for (key, value) in params {
        if !entry.pattern.param_names().any(|p| p == key) {
            tracing::warn!(route = name, param = %key, "Discarding parameter not in route pattern");
        } else if base.mode() == HistoryMode::Path && (value == "." || value == "..") {
            // URL parsing removes dot segments from real paths, even encoded ones.
            return Err(NavigationError::InvalidParam {
                route: name.to_string(),
                param: key.clone(),
                value: value.clone(),
            });
        }
    }

    let path = entry.pattern.build(params).map_err(|e| match e {
        BuildError::MissingParam(param) => NavigationError::MissingParam {
            route: name.to_string(),
            param,
        },
    })?;
    Ok(base.href(&path))
}

fn history_base(config: &RouterConfig, call_config: &CallConfig) -> HistoryBase {
    let root = match &config.history.root {
        RootSource::BaseUrl => call_config.base_url.as_deref().unwrap_or_else(|| {
            tracing::debug!("baseUrl not set, rooting history at '/'");
            "/"
        }),
        RootSource::Literal { path } => path.as_str(),
    };
    HistoryBase::new(config.history.mode, root)
}
