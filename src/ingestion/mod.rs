//! Ingestion Service Module
//!
//! Loads the paginated remote audiobook catalog into the store.
//!
//! ## Workflow
//! 1. **Verify**: reads the total item count from a one-item probe.
//! 2. **Plan**: derives the page count and builds one `IngestionTask` per page.
//! 3. **Fetch**: `PageFetcher` downloads and decodes each page concurrently.
//! 4. **Store**: each page is committed with a single bulk insert; failed pages are
//!    logged and skipped without affecting the others.

pub mod coordinator;
pub mod fetcher;
pub mod types;

pub use coordinator::IngestionCoordinator;
pub use fetcher::PageFetcher;
