//! State module for tracking crawl progress
//!
//! This module provides the per-run bookkeeping shared by the dispatch loop
//! and its fetch tasks.
//!
//! # Components
//!
//! - `VisitedSet`: URLs already dispatched, with the instant of their latest dispatch
//! - `FoundLinksIndex`: in-domain links discovered on each dispatched URL
//! - `RunStatus`: lifecycle of a crawl run

mod found_links;
mod run_status;
mod visited;

// Re-export main types
pub use found_links::FoundLinksIndex;
pub use run_status::RunStatus;
pub use visited::VisitedSet;
