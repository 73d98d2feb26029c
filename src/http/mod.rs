//! Shell host subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (assign or keep x-request-id)
//!     → /_shell/* API handlers, or
//!     → fallback: entry document for application paths
//!     → response carries x-request-id back
//! ```

pub mod request;
pub mod server;

pub use request::{request_id, MakeRequestUuid, X_REQUEST_ID};
pub use server::{ShellServer, X_SHELL_ROUTE};
