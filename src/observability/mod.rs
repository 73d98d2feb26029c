//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Router, shell host and config loading produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (navigation and resolution counters)
//!
//! Consumers:
//!     → stderr (fmt subscriber)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every host log line
//! - Metric calls are no-ops until an exporter is installed

pub mod logging;
pub mod metrics;
