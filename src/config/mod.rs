//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! process environment
//!     → env.rs (EnvSource → CallConfig, read once)
//!     → shared via Arc through a ConfigProvider
//!
//! shell config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks, route table)
//!     → ShellConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Both records are immutable once loaded
//! - All file fields have defaults to allow minimal configs
//! - Router variants are presets of one RouterConfig, chosen at startup

pub mod env;
pub mod loader;
pub mod schema;
pub mod validation;

pub use env::{CallConfig, ConfigKey, ConfigProvider, EnvConfigProvider, EnvSource, MapEnv, ProcessEnv};
pub use loader::{load_config, ConfigError};
pub use schema::{
    HistoryConfig, ListenerConfig, NotFoundPolicy, ObservabilityConfig, RootSource, RouteConfig,
    RouterConfig, ShellConfig, Variant,
};
