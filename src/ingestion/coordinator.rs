//! Ingestion Coordinator
//!
//! Drives a one-shot load of the remote catalog into the store.
//!
//! ## Workflow
//! 1. **Precondition**: refuses to run against a non-empty store.
//! 2. **Verification**: probes page 1 with a page size of 1 to read the catalog size.
//!    Failure here is fatal: without a count no task set can be built.
//! 3. **Fan-out**: spawns one fetch-and-insert task per page on a `JoinSet`.
//! 4. **Isolation**: a failed page is logged and recorded as a `PageOutcome::Failed`;
//!    it never fails the run and is never retried.
//! 5. **Commit**: once every task has resolved, the store is flushed once.

use super::fetcher::PageFetcher;
use super::types::{FetchError, IngestError, IngestionSummary, IngestionTask, PageOutcome};
use crate::storage::client::CatalogStore;

use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;

/// Number of pages to request for `count` items.
///
/// `round(count / page_size) + 1`, rounding half to even. The extra page
/// over-provisions; the last page may come back partial or empty.
///
/// `None` when the page count does not fit a `u32` page index.
pub fn total_pages(count: u64, page_size: u32) -> Option<u32> {
    let ratio = count as f64 / page_size as f64;
    u32::try_from(ratio.round_ties_even() as u64)
        .ok()?
        .checked_add(1)
}

/// One task per page index in `[1, total_pages)`.
pub fn build_tasks(total_pages: u32, page_size: u32) -> Vec<IngestionTask> {
    (1..total_pages)
        .map(|page| IngestionTask { page, page_size })
        .collect()
}

pub struct IngestionCoordinator {
    fetcher: Arc<PageFetcher>,
    store: Arc<dyn CatalogStore>,
    page_size: u32,
}

impl IngestionCoordinator {
    pub fn new(fetcher: Arc<PageFetcher>, store: Arc<dyn CatalogStore>, page_size: u32) -> Self {
        Self {
            fetcher,
            store,
            page_size,
        }
    }

    pub async fn run(&self) -> Result<IngestionSummary, IngestError> {
        if self.page_size == 0 {
            return Err(IngestError::InvalidPageSize);
        }

        let existing = self.store.count().await?;
        if existing > 0 {
            return Err(IngestError::NotEmpty(existing));
        }

        let started = Instant::now();

        let reported_count = self.fetcher.verification_count().await.map_err(|e| {
            tracing::error!("Verification request failed: {}", e);
            IngestError::Verification(e)
        })?;

        let total_pages =
            total_pages(reported_count, self.page_size).ok_or(IngestError::PageCountOverflow {
                count: reported_count,
                page_size: self.page_size,
            })?;
        let tasks = build_tasks(total_pages, self.page_size);

        tracing::info!(
            "Catalog reports {} items, requesting {} pages of {}",
            reported_count,
            tasks.len(),
            self.page_size
        );

        let mut set = JoinSet::new();
        for task in tasks {
            let fetcher = self.fetcher.clone();
            let store = self.store.clone();
            set.spawn(async move { fetch_and_insert(&fetcher, store.as_ref(), task).await });
        }

        let mut outcomes = Vec::with_capacity(set.len());
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => tracing::error!("Ingestion task did not complete: {}", e),
            }
        }
        outcomes.sort_by_key(PageOutcome::page);

        self.store.flush().await?;

        let summary = IngestionSummary {
            reported_count,
            total_pages,
            outcomes,
            elapsed: started.elapsed(),
        };

        tracing::info!(
            "Ingestion finished: {} items from {} pages, {} pages failed",
            summary.inserted_items(),
            summary.outcomes.len(),
            summary.failed_pages().len()
        );

        Ok(summary)
    }
}

/// Fetches one page and writes it. Every failure is absorbed into the outcome.
pub async fn fetch_and_insert(
    fetcher: &PageFetcher,
    store: &dyn CatalogStore,
    task: IngestionTask,
) -> PageOutcome {
    let url = fetcher.page_url(task.page, task.page_size);

    let items = match fetcher.fetch_page(task).await {
        Ok(items) => items,
        Err(e) => {
            match &e {
                FetchError::InvalidUrl { .. } => {
                    tracing::error!("Failed to get data from URL `{}`: {}", url, e)
                }
                FetchError::Transport(_) => tracing::error!(
                    "Connection problem while processing URL `{}`: {}",
                    url,
                    e
                ),
                FetchError::Decode(_) => {
                    tracing::error!("Unexpected error while processing URL `{}`: {}", url, e)
                }
            }
            return PageOutcome::Failed {
                page: task.page,
                url,
                error: e.to_string(),
            };
        }
    };

    if items.is_empty() {
        tracing::info!("Processed URL `{}` (empty page)", url);
        return PageOutcome::Inserted {
            page: task.page,
            url,
            items: 0,
        };
    }

    match store.bulk_insert(items).await {
        Ok(inserted) => {
            tracing::info!("Processed URL `{}`", url);
            PageOutcome::Inserted {
                page: task.page,
                url,
                items: inserted,
            }
        }
        Err(e) => {
            tracing::error!("Unexpected error while processing URL `{}`: {}", url, e);
            PageOutcome::Failed {
                page: task.page,
                url,
                error: e.to_string(),
            }
        }
    }
}
