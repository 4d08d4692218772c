//! Ingestion Data Types
//!
//! Defines the wire envelope returned by the remote catalog, the unit of work handed
//! to each concurrent fetch task, and the per-page outcomes collected by the coordinator.

use crate::storage::types::{CatalogItem, Contributor, StoreError};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// JSON envelope of one catalog page.
///
/// Both fields are optional on the wire: the verification probe only needs `count`,
/// a data page only needs `results`. Which one is mandatory is decided by the caller.
#[derive(Debug, Deserialize)]
pub struct PageEnvelope {
    pub count: Option<u64>,
    pub results: Option<Vec<ApiItem>>,
}

/// An audiobook as published by the catalog API (subset of fields).
#[derive(Debug, Deserialize)]
pub struct ApiItem {
    /// Numeric or string identifier; absent ids are replaced on conversion.
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    pub name: Option<String>,
    pub uri: Option<String>,
    pub main_author: Option<Contributor>,
    pub main_actor: Option<Contributor>,
    pub global_rating: Option<f64>,
    pub reviews_count: Option<u64>,
}

impl From<ApiItem> for CatalogItem {
    fn from(item: ApiItem) -> Self {
        let id = match item.id {
            Some(serde_json::Value::String(id)) => id,
            Some(serde_json::Value::Number(id)) => id.to_string(),
            _ => uuid::Uuid::new_v4().to_string(),
        };

        CatalogItem {
            id,
            name: item.name,
            uri: item.uri,
            main_author: item.main_author,
            main_actor: item.main_actor,
            global_rating: item.global_rating,
            reviews_count: item.reviews_count,
        }
    }
}

/// One page to fetch and insert. Consumed exactly once, never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestionTask {
    /// 1-based page index.
    pub page: u32,
    pub page_size: u32,
}

/// How a single ingestion task resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome {
    /// The page was fetched; `items` documents were written (0 for a trailing empty page).
    Inserted { page: u32, url: String, items: usize },
    /// The page contributed nothing. `error` is the logged error text.
    Failed { page: u32, url: String, error: String },
}

impl PageOutcome {
    pub fn page(&self) -> u32 {
        match self {
            PageOutcome::Inserted { page, .. } | PageOutcome::Failed { page, .. } => *page,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            PageOutcome::Inserted { url, .. } | PageOutcome::Failed { url, .. } => url,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, PageOutcome::Failed { .. })
    }
}

/// Result of a completed ingestion run, returned by value to the caller.
#[derive(Debug, Clone)]
pub struct IngestionSummary {
    /// Catalog size reported by the verification probe.
    pub reported_count: u64,
    pub total_pages: u32,
    /// One entry per task, ordered by page index.
    pub outcomes: Vec<PageOutcome>,
    pub elapsed: Duration,
}

impl IngestionSummary {
    pub fn inserted_items(&self) -> usize {
        self.outcomes
            .iter()
            .map(|outcome| match outcome {
                PageOutcome::Inserted { items, .. } => *items,
                PageOutcome::Failed { .. } => 0,
            })
            .sum()
    }

    pub fn failed_pages(&self) -> Vec<u32> {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.is_failure())
            .map(PageOutcome::page)
            .collect()
    }
}

/// Why a single page fetch produced no items.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid URL `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("connection problem: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("page size must be positive")]
    InvalidPageSize,

    #[error("collection already holds {0} documents; drop it before loading again")]
    NotEmpty(u64),

    #[error("catalog reports {count} items, too many pages of {page_size}")]
    PageCountOverflow { count: u64, page_size: u32 },

    #[error("verification request failed, the API response structure may have changed: {0}")]
    Verification(#[source] FetchError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
