//! Lookup Module
//!
//! Keyword lookup of authors and books with word-order-insensitive matching.
//!
//! ## Submodules
//! - **`resolver`**: permutation-based fallback matching against the store.
//! - **`types`**: lookup kinds, pattern terms and outcomes.

pub mod resolver;
pub mod types;

pub use resolver::resolve;
pub use types::{LookupKind, LookupOutcome};
