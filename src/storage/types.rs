//! Storage Data Types
//!
//! Defines the documents held by the catalog store and the error type shared by
//! every store operation. Field names follow the upstream catalog JSON, since the
//! renderer addresses them by name (`name`, `uri`, `main_author.cover_name`, ...).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A named participant attached to an audiobook (author or narrator).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contributor {
    /// Display name as published on the catalog.
    pub cover_name: Option<String>,
    /// Site-relative link to the contributor page.
    pub uri: Option<String>,
}

impl Contributor {
    pub fn new(cover_name: &str, uri: &str) -> Self {
        Self {
            cover_name: Some(cover_name.to_string()),
            uri: Some(uri.to_string()),
        }
    }
}

/// A single audiobook as persisted in the store.
///
/// Only `id` is guaranteed; upstream data quality varies, so every other field
/// may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Unique identifier within the collection.
    pub id: String,
    pub name: Option<String>,
    pub uri: Option<String>,
    /// Contributor A: the author.
    pub main_author: Option<Contributor>,
    /// Contributor B: the narrator.
    pub main_actor: Option<Contributor>,
    pub global_rating: Option<f64>,
    pub reviews_count: Option<u64>,
}

impl CatalogItem {
    pub fn author_name(&self) -> Option<&str> {
        self.main_author
            .as_ref()
            .and_then(|author| author.cover_name.as_deref())
    }

    pub fn narrator_name(&self) -> Option<&str> {
        self.main_actor
            .as_ref()
            .and_then(|actor| actor.cover_name.as_deref())
    }
}

/// Text fields that support pattern search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchField {
    /// `name`
    BookName,
    /// `main_author.cover_name`
    AuthorName,
    /// `main_actor.cover_name`
    NarratorName,
}

impl SearchField {
    /// Dotted document path, as used in log lines and error messages.
    pub fn path(&self) -> &'static str {
        match self {
            SearchField::BookName => "name",
            SearchField::AuthorName => "main_author.cover_name",
            SearchField::NarratorName => "main_actor.cover_name",
        }
    }

    pub fn value<'a>(&self, item: &'a CatalogItem) -> Option<&'a str> {
        match self {
            SearchField::BookName => item.name.as_deref(),
            SearchField::AuthorName => item.author_name(),
            SearchField::NarratorName => item.narrator_name(),
        }
    }
}

/// Numeric fields usable as sort keys and aggregation inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericField {
    GlobalRating,
    ReviewsCount,
}

impl NumericField {
    pub fn value(&self, item: &CatalogItem) -> Option<f64> {
        match self {
            NumericField::GlobalRating => item.global_rating,
            NumericField::ReviewsCount => item.reviews_count.map(|count| count as f64),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("bulk insert called with an empty batch")]
    EmptyBatch,

    #[error("duplicate document id `{0}`, batch rejected")]
    DuplicateId(String),

    #[error("invalid search pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot encoding failed: {0}")]
    Snapshot(#[from] bincode::Error),

    #[error("snapshot writer task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
