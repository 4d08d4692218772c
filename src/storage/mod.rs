//! Catalog Storage Module
//!
//! Implements the embedded document store holding the loaded audiobook catalog.
//!
//! ## Core Concepts
//! - **Contract**: `CatalogStore` is the only surface the ingestion and query layers see
//!   (count, bulk insert, pattern search, aggregation, drop).
//! - **Storage**: `MemoryStore` keeps documents in a concurrent `DashMap` keyed by id and
//!   tracks insertion order, which is the natural iteration order for ties.
//! - **Persistence**: the whole collection is written as one `bincode` snapshot on flush and
//!   reloaded on open, so a load run and later query runs can be separate processes.
//! - **Aggregation**: `pipeline` interprets the fixed set of ranking pipelines.

pub mod client;
pub mod memory;
pub mod pipeline;
pub mod types;

pub use client::CatalogStore;
pub use memory::MemoryStore;

#[cfg(test)]
mod tests;
