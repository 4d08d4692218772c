//! Audiobook Catalog Statistics Library
//!
//! This library crate defines the modules behind the `audiobook-stats` binary (`main.rs`).
//!
//! ## Architecture Modules
//! Writes flow ingestion → storage; reads flow stats/lookup → storage → report.
//!
//! - **`storage`**: The embedded document store. A concurrent map of catalog items with
//!   insertion-ordered iteration, regex search, a small aggregation pipeline interpreter,
//!   and a snapshot file so separate runs share one collection.
//! - **`ingestion`**: The load pipeline. Reads the total item count from a verification
//!   request, fans out one fetch-and-insert task per page, and isolates page failures.
//! - **`stats`**: The fixed catalog of seven ranking statistics.
//! - **`lookup`**: Author and title lookup that tolerates words typed in any order.
//! - **`report`**: Terminal panels and tables for the two read paths.
//! - **`config`**: Command-line flags with environment fallbacks.

pub mod config;
pub mod ingestion;
pub mod lookup;
pub mod report;
pub mod stats;
pub mod storage;
