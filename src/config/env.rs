//! Environment-bound call configuration.
//!
//! # Responsibilities
//! - Read the fixed set of call variables from an environment source
//! - Expose them as one immutable record shared through `Arc`
//! - Keep "unset" distinguishable from "set to empty"
//!
//! # Design Decisions
//! - Absence is a normal state, never an error
//! - Values are passed through raw; no parsing or coercion
//! - The process-wide record is created lazily, once, on first access

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};

/// Source of environment values.
pub trait EnvSource: Send + Sync {
    /// Returns the raw value of `key`, or `None` when it is unset.
    fn var(&self, key: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        match std::env::var_os(key)?.into_string() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(key, "Environment value is not valid UTF-8, treating as unset");
                None
            }
        }
    }
}

/// In-memory environment, for tests and embedding hosts.
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    vars: HashMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl EnvSource for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

/// The keys of [`CallConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    AccountNode,
    Number,
    TestNumber,
    BaseUrl,
    LockEndpoint,
    ConnectionsEndpoint,
    ConnectionsPassword,
    AgentResolveEndpoint,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 8] = [
        ConfigKey::AccountNode,
        ConfigKey::Number,
        ConfigKey::TestNumber,
        ConfigKey::BaseUrl,
        ConfigKey::LockEndpoint,
        ConfigKey::ConnectionsEndpoint,
        ConfigKey::ConnectionsPassword,
        ConfigKey::AgentResolveEndpoint,
    ];

    /// Name of the environment variable backing this key.
    pub fn env_var(&self) -> &'static str {
        match self {
            ConfigKey::AccountNode => "VUE_APP_ACCOUNT_NODE",
            ConfigKey::Number => "VUE_APP_NUMBER",
            ConfigKey::TestNumber => "VUE_APP_TEST_NUMBER",
            ConfigKey::BaseUrl => "BASE_URL",
            ConfigKey::LockEndpoint => "VUE_APP_LOCK_ENDPOINT",
            ConfigKey::ConnectionsEndpoint => "VUE_APP_CONNECTIONS_ENDPOINT",
            ConfigKey::ConnectionsPassword => "VUE_APP_CONNECTIONS_PASSWORD",
            ConfigKey::AgentResolveEndpoint => "VUE_APP_AGENT_RESOLVE_ENDPOINT",
        }
    }

    /// Field name as exposed to views and in serialized output.
    pub fn field_name(&self) -> &'static str {
        match self {
            ConfigKey::AccountNode => "accountNode",
            ConfigKey::Number => "number",
            ConfigKey::TestNumber => "testNumber",
            ConfigKey::BaseUrl => "baseUrl",
            ConfigKey::LockEndpoint => "lockEndpoint",
            ConfigKey::ConnectionsEndpoint => "connectionsEndpoint",
            ConfigKey::ConnectionsPassword => "connectionsPassword",
            ConfigKey::AgentResolveEndpoint => "agentResolveEndpoint",
        }
    }
}

/// Call configuration read from the environment.
///
/// Every field is optional. `None` means the variable was unset; an empty
/// string is kept as `Some("")`.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallConfig {
    pub account_node: Option<String>,
    pub number: Option<String>,
    pub test_number: Option<String>,
    pub base_url: Option<String>,
    pub lock_endpoint: Option<String>,
    pub connections_endpoint: Option<String>,
    pub connections_password: Option<String>,
    pub agent_resolve_endpoint: Option<String>,
}

const REDACTED: &str = "********";

impl CallConfig {
    /// Read every key from `source`.
    pub fn from_source(source: &dyn EnvSource) -> Self {
        let mut config = Self::default();
        for key in ConfigKey::ALL {
            let value = source.var(key.env_var());
            if value.is_none() {
                tracing::debug!(variable = key.env_var(), "Configuration value not set");
            }
            *config.slot_mut(key) = value;
        }
        config
    }

    /// Value of a single key.
    pub fn get(&self, key: ConfigKey) -> Option<&str> {
        match key {
            ConfigKey::AccountNode => self.account_node.as_deref(),
            ConfigKey::Number => self.number.as_deref(),
            ConfigKey::TestNumber => self.test_number.as_deref(),
            ConfigKey::BaseUrl => self.base_url.as_deref(),
            ConfigKey::LockEndpoint => self.lock_endpoint.as_deref(),
            ConfigKey::ConnectionsEndpoint => self.connections_endpoint.as_deref(),
            ConfigKey::ConnectionsPassword => self.connections_password.as_deref(),
            ConfigKey::AgentResolveEndpoint => self.agent_resolve_endpoint.as_deref(),
        }
    }

    fn slot_mut(&mut self, key: ConfigKey) -> &mut Option<String> {
        match key {
            ConfigKey::AccountNode => &mut self.account_node,
            ConfigKey::Number => &mut self.number,
            ConfigKey::TestNumber => &mut self.test_number,
            ConfigKey::BaseUrl => &mut self.base_url,
            ConfigKey::LockEndpoint => &mut self.lock_endpoint,
            ConfigKey::ConnectionsEndpoint => &mut self.connections_endpoint,
            ConfigKey::ConnectionsPassword => &mut self.connections_password,
            ConfigKey::AgentResolveEndpoint => &mut self.agent_resolve_endpoint,
        }
    }

    /// Copy safe to print or serve; the connections password is masked.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.connections_password.is_some() {
            copy.connections_password = Some(REDACTED.to_string());
        }
        copy
    }
}

impl fmt::Debug for CallConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("CallConfig");
        for key in ConfigKey::ALL {
            let value = match (key, self.get(key)) {
                (ConfigKey::ConnectionsPassword, Some(_)) => Some(REDACTED),
                (_, value) => value,
            };
            s.field(key.field_name(), &value);
        }
        s.finish()
    }
}

/// Hands out the call configuration.
///
/// The router takes one of these at construction instead of reading the
/// process environment itself.
pub trait ConfigProvider: Send + Sync {
    fn call_config(&self) -> Arc<CallConfig>;
}

impl ConfigProvider for Arc<CallConfig> {
    fn call_config(&self) -> Arc<CallConfig> {
        Arc::clone(self)
    }
}

/// Reads its source on first access and returns the same record afterwards.
pub struct EnvConfigProvider<S> {
    source: S,
    loaded: OnceLock<Arc<CallConfig>>,
}

impl<S: EnvSource> EnvConfigProvider<S> {
    pub const fn new(source: S) -> Self {
        Self {
            source,
            loaded: OnceLock::new(),
        }
    }
}

impl<S: EnvSource> ConfigProvider for EnvConfigProvider<S> {
    fn call_config(&self) -> Arc<CallConfig> {
        let config = self.loaded.get_or_init(|| {
            let config = CallConfig::from_source(&self.source);
            tracing::info!(
                set = ConfigKey::ALL.iter().filter(|k| config.get(**k).is_some()).count(),
                "Call configuration loaded"
            );
            Arc::new(config)
        });
        Arc::clone(config)
    }
}

static GLOBAL: EnvConfigProvider<ProcessEnv> = EnvConfigProvider::new(ProcessEnv);

/// Process-wide provider over the real environment.
pub fn global() -> &'static EnvConfigProvider<ProcessEnv> {
    &GLOBAL
}
