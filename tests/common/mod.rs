//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use call_shell::config::{CallConfig, ConfigProvider, EnvConfigProvider, MapEnv, ShellConfig, Variant};
use call_shell::http::ShellServer;
use call_shell::routing::Router;

/// Call configuration with a handful of values set.
pub fn call_config() -> Arc<CallConfig> {
    let env = MapEnv::new()
        .with("VUE_APP_ACCOUNT_NODE", "node-1")
        .with("VUE_APP_NUMBER", "+15550100")
        .with("VUE_APP_CONNECTIONS_PASSWORD", "secret-pw");
    EnvConfigProvider::new(env).call_config()
}

/// Shell config using `variant` for its router.
pub fn shell_config(variant: Variant) -> ShellConfig {
    ShellConfig {
        router: variant.router_config(),
        ..ShellConfig::default()
    }
}

/// In-process server for `config`.
pub fn server(config: ShellConfig) -> ShellServer {
    let router = Router::new(config.router.clone(), &call_config()).unwrap();
    ShellServer::new(config, Arc::new(router)).unwrap()
}
