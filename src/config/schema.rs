//! Configuration schema definitions.
//!
//! This module defines the configuration structure for the shell host and
//! its router. All types derive Serde traits for deserialization from
//! config files.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::routing::history::HistoryMode;
use crate::views::ViewId;

/// Root configuration for the shell.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ShellConfig {
    /// Listener configuration for the shell host.
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Route table, history and not-found policy.
    pub router: RouterConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:8080").
    pub bind_address: String,

    /// Entry document served for application paths. A built-in document
    /// is used when unset.
    pub entry_point: Option<PathBuf>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
            entry_point: None,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Router configuration: one deployment's choice of history and routes.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RouterConfig {
    pub history: HistoryConfig,

    /// What happens when no route matches.
    pub not_found: NotFoundPolicy,

    /// Route definitions, in declaration order.
    pub routes: Vec<RouteConfig>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Variant::default().router_config()
    }
}

/// History strategy and root.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub mode: HistoryMode,
    pub root: RootSource,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            mode: HistoryMode::Hash,
            root: RootSource::BaseUrl,
        }
    }
}

/// Where the history root comes from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum RootSource {
    /// The `baseUrl` value of the call configuration (`/` when unset).
    BaseUrl,
    /// A fixed path.
    Literal { path: String },
}

/// A single route definition.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Unique route name.
    pub name: String,

    /// Path pattern, e.g. `/call/:callId?`.
    pub path: String,

    /// View activated by this route.
    pub view: ViewId,
}

impl RouteConfig {
    pub fn new(name: impl Into<String>, path: impl Into<String>, view: ViewId) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            view,
        }
    }
}

/// Behavior for locations that match no route.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum NotFoundPolicy {
    /// Enter the not-found state and show the not-found view.
    #[default]
    View,
    /// Replace the current entry with the named route.
    Redirect { route: String },
}

/// Known deployment variants of the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Variant {
    /// Hash history at `baseUrl`; `/call` and `/button`.
    #[default]
    HashButton,
    /// Hash history at `baseUrl`; `/call/:callId?`.
    HashCallId,
    /// Path history at `/call/`; `/call/:callId?`.
    PathCallId,
    /// Path history at `/call/`; `/call`.
    Path,
}

const CALL_ROOT: &str = "/call/";

impl Variant {
    pub const ALL: &'static [Variant] = &[
        Variant::HashButton,
        Variant::HashCallId,
        Variant::PathCallId,
        Variant::Path,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::HashButton => "hash-button",
            Variant::HashCallId => "hash-call-id",
            Variant::PathCallId => "path-call-id",
            Variant::Path => "path",
        }
    }

    /// The router configuration this variant stands for.
    pub fn router_config(&self) -> RouterConfig {
        let (mode, root) = match self {
            Variant::HashButton | Variant::HashCallId => (HistoryMode::Hash, RootSource::BaseUrl),
            Variant::PathCallId | Variant::Path => (
                HistoryMode::Path,
                RootSource::Literal {
                    path: CALL_ROOT.to_string(),
                },
            ),
        };

        let routes = match self {
            Variant::HashButton => vec![
                RouteConfig::new("Home", "/call", ViewId::Home),
                RouteConfig::new("Button", "/button", ViewId::Button),
            ],
            Variant::HashCallId | Variant::PathCallId => {
                vec![RouteConfig::new("Home", "/call/:callId?", ViewId::Home)]
            }
            Variant::Path => vec![RouteConfig::new("Home", "/call", ViewId::Home)],
        };

        RouterConfig {
            history: HistoryConfig { mode, root },
            not_found: NotFoundPolicy::View,
            routes,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Variant::ALL
            .iter()
            .copied()
            .find(|v| v.as_str() == s.to_ascii_lowercase())
            .ok_or_else(|| {
                let known: Vec<_> = Variant::ALL.iter().map(Variant::as_str).collect();
                format!("unknown variant '{}', expected one of: {}", s, known.join(", "))
            })
    }
}
