//! Shell host server.
//!
//! # Responsibilities
//! - Serve the entry document for application paths (path mode needs
//!   every sub-path routed to the entry point)
//! - Answer route resolution and href queries over JSON
//! - Apply the not-found policy to unmatched paths
//! - Wire up middleware (request ID, timeout, tracing)

use std::io;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue, Method, Request, StatusCode, Uri},
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::schema::ShellConfig;
use crate::http::request::{self, request_id};
use crate::lifecycle::shutdown;
use crate::routing::history::HistoryMode;
use crate::routing::matcher::Params;
use crate::routing::router::{NavigationError, Router as ShellRouter, RouterState};
use crate::views::ViewHandle;

/// Response header naming the matched route.
pub const X_SHELL_ROUTE: &str = "x-shell-route";

const DEFAULT_ENTRY: &str = r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <title>Call</title>
  </head>
  <body>
    <div id="app"></div>
  </body>
</html>
"#;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<ShellRouter>,
    pub entry: Arc<str>,
}

/// HTTP host for the shell.
pub struct ShellServer {
    app: Router,
    config: ShellConfig,
}

impl ShellServer {
    /// Create the server. Reads the entry document when one is configured.
    pub fn new(config: ShellConfig, router: Arc<ShellRouter>) -> io::Result<Self> {
        let entry: Arc<str> = match &config.listener.entry_point {
            Some(path) => std::fs::read_to_string(path)?.into(),
            None => DEFAULT_ENTRY.into(),
        };
        let state = AppState { router, entry };
        let app = Self::build_router(&config, state);
        Ok(Self { app, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ShellConfig, state: AppState) -> Router {
        Router::new()
            .route("/_shell/resolve", get(resolve_handler))
            .route("/_shell/href/{name}", get(href_handler))
            .route("/_shell/routes", get(routes_handler))
            .route("/_shell/config", get(config_handler))
            .fallback(entry_handler)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(request::propagate_request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %req.method(),
                    uri = %req.uri(),
                    request_id = %request_id(req.headers()),
                )
            }))
            .layer(request::set_request_id_layer())
    }

    /// The assembled app, for in-process use.
    pub fn app(&self) -> Router {
        self.app.clone()
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    /// Serve on `listener` until `shutdown` fires.
    pub async fn run(self, listener: TcpListener, shutdown: broadcast::Receiver<()>) -> io::Result<()> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Shell host starting");

        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown::wait(shutdown))
            .await?;

        tracing::info!("Shell host stopped");
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct ResolveQuery {
    /// Route location, e.g. `/call/abc`.
    location: Option<String>,
    /// Host href, e.g. `https://host/#/call/abc`.
    href: Option<String>,
}

#[derive(Debug, Serialize)]
struct Activation {
    state: RouterState,
    view: Option<ViewHandle>,
}

async fn resolve_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ResolveQuery>,
) -> Response {
    let router = &state.router;
    let location = match (query.location, query.href) {
        (Some(location), _) => location,
        (None, Some(href)) => match router.history_base().route_location(&href) {
            Some(location) => location,
            None => return error(StatusCode::BAD_REQUEST, format!("unparsable href '{}'", href)),
        },
        (None, None) => {
            return error(StatusCode::BAD_REQUEST, "either 'location' or 'href' is required")
        }
    };

    let resolved = router.resolve_state(&location);
    let status = if resolved.is_not_found() {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::OK
    };
    tracing::debug!(
        request_id = %request_id(&headers),
        location = %location,
        status = status.as_u16(),
        "Resolve request"
    );

    let view = router.activate(&resolved);
    (status, Json(Activation { state: resolved, view })).into_response()
}

async fn href_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<Params>,
) -> Response {
    match state.router.href_for(&name, &params) {
        Ok(href) => Json(json!({ "route": name, "href": href })).into_response(),
        Err(e @ NavigationError::UnknownRoute(_)) => error(StatusCode::NOT_FOUND, e.to_string()),
        Err(e @ (NavigationError::MissingParam { .. } | NavigationError::InvalidParam { .. })) => {
            error(StatusCode::BAD_REQUEST, e.to_string())
        }
    }
}

async fn routes_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    let router = &state.router;
    let routes: Vec<_> = router
        .table()
        .entries()
        .iter()
        .map(|e| json!({ "name": e.name, "path": e.pattern.as_str(), "view": e.view }))
        .collect();
    Json(json!({
        "mode": router.history_base().mode(),
        "base": router.history_base().base(),
        "parameter_variant": router.table().parameter_variant(),
        "not_found": router.not_found_policy(),
        "routes": routes,
    }))
}

async fn config_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.router.call_config().redacted())
}

/// Entry document for application paths.
async fn entry_handler(State(state): State<AppState>, method: Method, uri: Uri) -> Response {
    if method != Method::GET && method != Method::HEAD {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }

    let router = &state.router;
    let base = router.history_base();
    match base.mode() {
        HistoryMode::Hash => {
            // The fragment never reaches the server; only the document path does.
            let doc_path = base.base().split('#').next().unwrap_or("");
            let doc_path = doc_path.trim_end_matches('/');
            if uri.path().trim_end_matches('/') == doc_path {
                entry(&state, StatusCode::OK, None)
            } else {
                (StatusCode::NOT_FOUND, "Not Found").into_response()
            }
        }
        HistoryMode::Path => {
            let href = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
            match router.resolve_href(href) {
                Ok(m) => entry(&state, StatusCode::OK, Some(&m.route)),
                Err(not_matched) => match router.redirect_target() {
                    Some(target) => {
                        tracing::info!(path = %not_matched.path, redirect = %target, "Redirecting unmatched path");
                        redirect(target)
                    }
                    None => entry(&state, StatusCode::NOT_FOUND, None),
                },
            }
        }
    }
}

fn entry(state: &AppState, status: StatusCode, route: Option<&str>) -> Response {
    let mut response = (status, Html(state.entry.to_string())).into_response();
    if let Some(value) = route.and_then(|r| HeaderValue::from_str(r).ok()) {
        response.headers_mut().insert(X_SHELL_ROUTE, value);
    }
    response
}

fn redirect(target: &str) -> Response {
    match HeaderValue::from_str(target) {
        Ok(location) => (StatusCode::TEMPORARY_REDIRECT, [(header::LOCATION, location)]).into_response(),
        Err(_) => error(StatusCode::INTERNAL_SERVER_ERROR, "invalid redirect target"),
    }
}

fn error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}
