//! Call shell: route resolution and environment-bound configuration for
//! the calling front end.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod shell;
pub mod views;

pub use config::{CallConfig, ShellConfig};
pub use http::ShellServer;
pub use lifecycle::Shutdown;
pub use routing::{Router, RouterState};
pub use shell::Shell;
