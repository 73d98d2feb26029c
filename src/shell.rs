//! The application shell: a router plus the views it mounts.

use crate::routing::history::{History, MemoryHistory};
use crate::routing::matcher::Params;
use crate::routing::router::{NavigationError, Router, RouterState};
use crate::views::{ViewHandle, ViewId, ViewRegistry};

/// Mounts the activated view after every navigation event.
#[derive(Debug)]
pub struct Shell<H = MemoryHistory> {
    router: Router<H>,
    views: ViewRegistry,
    mounted: Option<ViewHandle>,
}

impl<H: History> Shell<H> {
    pub fn new(router: Router<H>, views: ViewRegistry) -> Self {
        for view in missing_views(&router, &views) {
            tracing::warn!(view = %view, "Routed view has no registration");
        }
        Self {
            router,
            views,
            mounted: None,
        }
    }

    pub fn router(&self) -> &Router<H> {
        &self.router
    }

    pub fn state(&self) -> &RouterState {
        self.router.state()
    }

    /// Handle of the view mounted last.
    pub fn mounted(&self) -> Option<&ViewHandle> {
        self.mounted.as_ref()
    }

    pub fn start(&mut self, href: &str) -> &RouterState {
        self.router.start(href);
        self.mount()
    }

    pub fn navigate(&mut self, name: &str, params: &Params) -> Result<&RouterState, NavigationError> {
        self.router.navigate(name, params)?;
        Ok(self.mount())
    }

    pub fn push(&mut self, location: &str) -> &RouterState {
        self.router.push(location);
        self.mount()
    }

    pub fn back(&mut self) -> &RouterState {
        self.router.back();
        self.mount()
    }

    pub fn forward(&mut self) -> &RouterState {
        self.router.forward();
        self.mount()
    }

    fn mount(&mut self) -> &RouterState {
        let state = self.router.state();
        let handle = self.router.activate(state);
        // Traversal that leaves the state unchanged does not remount.
        let unchanged = match (&handle, &self.mounted) {
            (Some(next), Some(current)) => {
                next.view == current.view && next.route == current.route && next.params == current.params
            }
            _ => false,
        };
        if let (Some(handle), false) = (handle, unchanged) {
            self.views.mount(&handle);
            self.mounted = Some(handle);
        }
        self.router.state()
    }
}

/// Views the router can activate that `views` cannot mount.
fn missing_views<H: History>(router: &Router<H>, views: &ViewRegistry) -> Vec<ViewId> {
    let mut missing: Vec<ViewId> = router
        .table()
        .entries()
        .iter()
        .map(|e| e.view)
        .chain([ViewId::NotFound])
        .filter(|v| !views.contains(*v))
        .collect();
    missing.dedup();
    missing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::env::CallConfig;
    use crate::config::schema::Variant;
    use std::sync::{Arc, Mutex};

    fn recording_shell(variant: Variant) -> (Shell, Arc<Mutex<Vec<(ViewId, Params)>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut views = ViewRegistry::new();
        for id in [ViewId::Home, ViewId::Button, ViewId::NotFound] {
            let log = Arc::clone(&log);
            views.register(id, move |h: &ViewHandle| {
                log.lock().unwrap().push((h.view, h.params.clone()));
            });
        }
        let router = Router::new(variant.router_config(), &Arc::new(CallConfig::default())).unwrap();
        (Shell::new(router, views), log)
    }

    #[test]
    fn test_mounts_on_each_transition() {
        let (mut shell, log) = recording_shell(Variant::HashButton);
        shell.start("/#/call");
        shell.navigate("Button", &Params::new()).unwrap();
        shell.push("/missing");
        shell.back();

        let views: Vec<ViewId> = log.lock().unwrap().iter().map(|(v, _)| *v).collect();
        assert_eq!(
            views,
            [ViewId::Home, ViewId::Button, ViewId::NotFound, ViewId::Button]
        );
        assert_eq!(shell.mounted().unwrap().view, ViewId::Button);
    }

    #[test]
    fn test_out_of_range_traversal_does_not_remount() {
        let (mut shell, log) = recording_shell(Variant::HashCallId);
        shell.start("/#/call/1");
        shell.forward();
        assert_eq!(log.lock().unwrap().len(), 1);
        assert_eq!(log.lock().unwrap()[0].1["callId"], "1");
    }

    #[test]
    fn test_missing_views_reported() {
        let router = Router::new(
            Variant::HashButton.router_config(),
            &Arc::new(CallConfig::default()),
        )
        .unwrap();
        let mut views = ViewRegistry::new();
        views.register(ViewId::Home, |_: &ViewHandle| {});
        assert_eq!(missing_views(&router, &views), [ViewId::Button, ViewId::NotFound]);

        views.register(ViewId::Button, |_: &ViewHandle| {});
        views.register(ViewId::NotFound, |_: &ViewHandle| {});
        assert!(missing_views(&router, &views).is_empty());
    }
}
