//! Report Module
//!
//! Terminal presentation of statistics and lookup results. Nothing here touches the
//! store; it only formats values the query layers already returned.

pub mod render;
pub mod types;

pub use render::{full_url, render_lookup, render_stats};
