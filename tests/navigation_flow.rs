//! End-to-end routing behavior across deployment variants.

use std::sync::{Arc, Mutex};

use call_shell::config::{
    CallConfig, ConfigKey, ConfigProvider, EnvConfigProvider, MapEnv, RouteConfig, RouterConfig,
    Variant,
};
use call_shell::routing::{
    MemoryHistory, NavigationError, Params, RouteTableError, Router, RouterError, RouterState,
};
use call_shell::views::{ViewHandle, ViewId, ViewRegistry};
use call_shell::Shell;

mod common;

fn params(pairs: &[(&str, &str)]) -> Params {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_unset_environment_yields_absent_fields() {
    let provider = EnvConfigProvider::new(MapEnv::new());
    let config = provider.call_config();
    for key in ConfigKey::ALL {
        assert!(config.get(key).is_none());
    }
    let json = serde_json::to_string(&*config).unwrap();
    assert!(!json.contains("undefined"));
}

#[test]
fn test_home_resolves_in_every_variant() {
    for variant in Variant::ALL {
        let router = Router::new(variant.router_config(), &common::call_config()).unwrap();
        let m = router.resolve("/call").unwrap();
        assert_eq!(m.route, "Home", "variant {}", variant);
        assert!(m.params.is_empty());
    }
}

#[test]
fn test_button_route_is_variant_specific() {
    for variant in Variant::ALL {
        let router = Router::new(variant.router_config(), &common::call_config()).unwrap();
        let state = router.resolve_state("/button");
        if *variant == Variant::HashButton {
            assert_eq!(state.route_match().unwrap().route, "Button");
        } else {
            assert!(state.is_not_found(), "variant {}", variant);
        }
    }
}

#[test]
fn test_navigate_then_resolve_current_location() {
    for variant in [Variant::HashCallId, Variant::PathCallId] {
        let mut router = Router::new(variant.router_config(), &common::call_config()).unwrap();
        router.navigate("Home", &params(&[("callId", "xyz")])).unwrap();

        let href = router.current_href().to_string();
        let m = router.resolve_href(&href).unwrap();
        assert_eq!(m.params["callId"], "xyz", "variant {} href {}", variant, href);
    }
}

#[test]
fn test_duplicate_route_names_fail_before_resolution() {
    let config = RouterConfig {
        routes: vec![
            RouteConfig::new("Home", "/call", ViewId::Home),
            RouteConfig::new("Home", "/call/:callId", ViewId::Home),
        ],
        ..Variant::HashButton.router_config()
    };
    let err = Router::new(config, &common::call_config()).unwrap_err();
    assert!(matches!(
        err,
        RouterError::Table(RouteTableError::DuplicateName(ref name)) if name == "Home"
    ));
}

#[test]
fn test_custom_history_is_driven_by_router() {
    let config = Arc::new(CallConfig {
        base_url: Some("/desk/".into()),
        ..CallConfig::default()
    });
    let history = MemoryHistory::new("https://calls.example.com/desk/#/button");
    let mut router =
        Router::with_history(Variant::HashButton.router_config(), &config, history).unwrap();
    assert_eq!(router.state(), &RouterState::Unresolved);

    let href = router.current_href().to_string();
    router.start(&href);
    assert_eq!(router.state().route_match().unwrap().route, "Button");

    router.navigate("Home", &Params::new()).unwrap();
    assert_eq!(router.current_href(), "/desk/#/call");
    assert_eq!(router.history().entries().len(), 2);
    assert_eq!(router.back().route_match().unwrap().route, "Button");
}

#[test]
fn test_shell_mounts_views_with_config() {
    let seen: Arc<Mutex<Vec<(ViewId, Option<String>, Option<String>)>>> = Arc::default();
    let mut views = ViewRegistry::new();
    for id in [ViewId::Home, ViewId::NotFound] {
        let seen = Arc::clone(&seen);
        views.register(id, move |h: &ViewHandle| {
            seen.lock().unwrap().push((
                h.view,
                h.param("callId").map(str::to_string),
                h.config.number.clone(),
            ));
        });
    }

    let router = Router::new(Variant::HashCallId.router_config(), &common::call_config()).unwrap();
    let mut shell = Shell::new(router, views);
    shell.start("/#/call/first");
    shell.navigate("Home", &params(&[("callId", "second")])).unwrap();
    shell.push("/button");
    assert_eq!(
        shell.navigate("Button", &Params::new()).unwrap_err(),
        NavigationError::UnknownRoute("Button".into())
    );

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 3);
    assert_eq!(seen[0], (ViewId::Home, Some("first".into()), Some("+15550100".into())));
    assert_eq!(seen[1].1.as_deref(), Some("second"));
    assert_eq!(seen[2].0, ViewId::NotFound);
}
