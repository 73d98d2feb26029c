//! View activation boundary.
//!
//! Views themselves live outside this crate. The router hands each
//! activated view a [`ViewHandle`] carrying the bound parameters and the
//! call configuration; nothing flows back.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::env::CallConfig;
use crate::routing::matcher::Params;

/// Identifier of a mountable view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewId {
    Home,
    Button,
    NotFound,
}

impl ViewId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewId::Home => "home",
            ViewId::Button => "button",
            ViewId::NotFound => "not_found",
        }
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Everything a view receives when it is activated.
#[derive(Debug, Clone, Serialize)]
pub struct ViewHandle {
    pub view: ViewId,

    /// Matched route name; `None` for the not-found view.
    pub route: Option<String>,

    pub params: Params,

    #[serde(skip)]
    pub config: Arc<CallConfig>,
}

impl ViewHandle {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// A mountable view.
pub trait View: Send + Sync {
    fn mount(&self, handle: &ViewHandle);
}

impl<F> View for F
where
    F: Fn(&ViewHandle) + Send + Sync,
{
    fn mount(&self, handle: &ViewHandle) {
        self(handle)
    }
}

/// Views by identifier.
#[derive(Default)]
pub struct ViewRegistry {
    views: HashMap<ViewId, Box<dyn View>>,
}

impl ViewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: ViewId, view: impl View + 'static) -> &mut Self {
        self.views.insert(id, Box::new(view));
        self
    }

    pub fn contains(&self, id: ViewId) -> bool {
        self.views.contains_key(&id)
    }

    /// Mount the view named by `handle`. Returns false when no view is
    /// registered under that identifier.
    pub fn mount(&self, handle: &ViewHandle) -> bool {
        match self.views.get(&handle.view) {
            Some(view) => {
                tracing::debug!(view = %handle.view, route = ?handle.route, "Mounting view");
                view.mount(handle);
                true
            }
            None => {
                tracing::warn!(view = %handle.view, "No view registered");
                false
            }
        }
    }
}

impl fmt::Debug for ViewRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewRegistry")
            .field("views", &self.views.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_registry_mounts_registered_view() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut registry = ViewRegistry::new();
        registry.register(ViewId::Home, move |h: &ViewHandle| {
            sink.lock().unwrap().push(h.param("callId").map(str::to_string));
        });

        let mut params = Params::new();
        params.insert("callId".into(), "abc".into());
        let handle = ViewHandle {
            view: ViewId::Home,
            route: Some("Home".into()),
            params,
            config: Arc::new(CallConfig::default()),
        };
        assert!(registry.mount(&handle));
        assert_eq!(*seen.lock().unwrap(), vec![Some("abc".to_string())]);

        let missing = ViewHandle {
            view: ViewId::Button,
            ..handle
        };
        assert!(!registry.mount(&missing));
    }

    #[test]
    fn test_view_id_serde_names() {
        assert_eq!(serde_json::to_string(&ViewId::NotFound).unwrap(), "\"not_found\"");
        let id: ViewId = serde_json::from_str("\"button\"").unwrap();
        assert_eq!(id, ViewId::Button);
    }
}
