//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Navigation event (start, navigate, push, back/forward)
//!     → history.rs (update entries, href ↔ route location)
//!     → router.rs (re-resolve current location)
//!     → table.rs (best-ranked entry)
//!     → matcher.rs (segment match, bind params)
//!     → RouterState: Resolved(route, params) or NotFound
//!
//! Route Compilation (at construction):
//!     RouteConfig[]
//!     → Parse patterns, reject duplicate names and collisions
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled once, immutable afterwards
//! - Deterministic: same location always resolves to the same route
//! - Unmatched locations go through an explicit not-found policy

pub mod history;
pub mod matcher;
pub mod router;
pub mod table;

pub use history::{History, HistoryBase, HistoryEntry, HistoryMode, MemoryHistory};
pub use matcher::{Params, PathPattern};
pub use router::{NavigationError, RouteNotMatched, Router, RouterError, RouterState};
pub use table::{RouteEntry, RouteMatch, RouteTable, RouteTableError};
