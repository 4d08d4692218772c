use super::client::CatalogStore;
use super::pipeline::{self, AggregationSpec, QueryResult};
use super::types::{CatalogItem, NumericField, SearchField, StoreError};

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use regex::{Regex, RegexBuilder};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone)]
struct StoredDocument {
    /// Insertion sequence; defines natural iteration order.
    seq: u64,
    item: CatalogItem,
}

/// Embedded document store: a concurrent map keyed by document id, optionally
/// persisted to a single snapshot file.
pub struct MemoryStore {
    documents: DashMap<String, StoredDocument>,
    next_seq: AtomicU64,
    snapshot_path: Option<PathBuf>,
    namespace: String,
}

impl MemoryStore {
    /// A store that lives only as long as the process.
    pub fn new(database: &str, collection: &str) -> Self {
        Self {
            documents: DashMap::new(),
            next_seq: AtomicU64::new(0),
            snapshot_path: None,
            namespace: format!("{}.{}", database, collection),
        }
    }

    /// Opens the store persisted under `data_dir`, loading an existing snapshot.
    pub fn open(data_dir: &Path, database: &str, collection: &str) -> Result<Self, StoreError> {
        std::fs::create_dir_all(data_dir)?;

        let mut store = Self::new(database, collection);
        let path = data_dir.join(format!("{}.bin", store.namespace));

        if path.exists() {
            let reader = BufReader::new(File::open(&path)?);
            let items: Vec<CatalogItem> = bincode::deserialize_from(reader)?;
            tracing::debug!("Loaded {} documents from {}", items.len(), path.display());
            for item in items {
                store.store_local(item);
            }
        }

        store.snapshot_path = Some(path);
        Ok(store)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot_path.as_deref()
    }

    /// Inserts or replaces a single document, bypassing batch checks.
    pub fn store_local(&self, item: CatalogItem) {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        self.documents
            .insert(item.id.clone(), StoredDocument { seq, item });
    }

    pub fn get_local(&self, id: &str) -> Option<CatalogItem> {
        self.documents.get(id).map(|doc| doc.item.clone())
    }

    pub fn local_entry_count(&self) -> usize {
        self.documents.len()
    }

    /// All documents, cloned, in natural order.
    pub fn dump(&self) -> Vec<CatalogItem> {
        let mut docs: Vec<StoredDocument> = self
            .documents
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        docs.sort_by_key(|doc| doc.seq);
        docs.into_iter().map(|doc| doc.item).collect()
    }

    fn insert_batch(&self, items: Vec<CatalogItem>) -> Result<usize, StoreError> {
        if items.is_empty() {
            return Err(StoreError::EmptyBatch);
        }

        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if !seen.insert(item.id.as_str()) {
                return Err(StoreError::DuplicateId(item.id.clone()));
            }
        }

        let total = items.len();
        let base = self.next_seq.fetch_add(total as u64, Ordering::SeqCst);
        let mut written: Vec<String> = Vec::with_capacity(total);
        let mut conflict = None;

        for (offset, item) in items.into_iter().enumerate() {
            match self.documents.entry(item.id.clone()) {
                Entry::Vacant(slot) => {
                    written.push(item.id.clone());
                    slot.insert(StoredDocument {
                        seq: base + offset as u64,
                        item,
                    });
                }
                Entry::Occupied(_) => {
                    conflict = Some(item.id);
                    break;
                }
            }
        }

        // Roll back only after the entry guard is dropped.
        if let Some(id) = conflict {
            for written_id in &written {
                self.documents.remove(written_id);
            }
            return Err(StoreError::DuplicateId(id));
        }

        Ok(total)
    }

    /// Matching documents in natural order. Only the matches are cloned.
    fn matching(&self, field: SearchField, pattern: &str) -> Result<Vec<CatalogItem>, StoreError> {
        let re = compile(pattern)?;
        let mut docs: Vec<StoredDocument> = self
            .documents
            .iter()
            .filter(|entry| is_match(field, &re, &entry.item))
            .map(|entry| entry.value().clone())
            .collect();
        docs.sort_by_key(|doc| doc.seq);
        Ok(docs.into_iter().map(|doc| doc.item).collect())
    }

    fn write_snapshot(path: &Path, items: &[CatalogItem]) -> Result<(), StoreError> {
        let tmp = path.with_extension("bin.tmp");
        {
            let mut writer = BufWriter::new(File::create(&tmp)?);
            bincode::serialize_into(&mut writer, items)?;
            writer.flush()?;
        }
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    fn remove_snapshot(path: &Path) -> Result<(), StoreError> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn is_match(field: SearchField, re: &Regex, item: &CatalogItem) -> bool {
    field.value(item).is_some_and(|value| re.is_match(value))
}

fn compile(pattern: &str) -> Result<Regex, StoreError> {
    Ok(RegexBuilder::new(pattern).case_insensitive(true).build()?)
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.documents.len() as u64)
    }

    async fn bulk_insert(&self, items: Vec<CatalogItem>) -> Result<usize, StoreError> {
        let inserted = self.insert_batch(items)?;
        tracing::info!("Inserted {} documents", inserted);
        Ok(inserted)
    }

    async fn search(
        &self,
        field: SearchField,
        pattern: &str,
    ) -> Result<Vec<CatalogItem>, StoreError> {
        let mut found = self.matching(field, pattern)?;
        found.sort_by(|a, b| {
            pipeline::desc_nulls_last(
                NumericField::ReviewsCount.value(a),
                NumericField::ReviewsCount.value(b),
            )
        });
        tracing::debug!("Search {} ~ /{}/i: {} hits", field.path(), pattern, found.len());
        Ok(found)
    }

    async fn count_matching(&self, field: SearchField, pattern: &str) -> Result<u64, StoreError> {
        let re = compile(pattern)?;
        Ok(self
            .documents
            .iter()
            .filter(|entry| is_match(field, &re, &entry.item))
            .count() as u64)
    }

    async fn run_aggregation(
        &self,
        spec: &AggregationSpec,
    ) -> Result<Vec<QueryResult>, StoreError> {
        let results = pipeline::execute(spec, &self.dump());
        tracing::debug!("Aggregation `{}` produced {} results", spec.name, results.len());
        Ok(results)
    }

    async fn drop_all(&self) -> Result<String, StoreError> {
        self.documents.clear();
        if let Some(path) = self.snapshot_path.clone() {
            tokio::task::spawn_blocking(move || Self::remove_snapshot(&path)).await??;
        }
        tracing::info!("Dropped collection {}", self.namespace);
        Ok(self.namespace.clone())
    }

    async fn flush(&self) -> Result<(), StoreError> {
        let Some(path) = self.snapshot_path.clone() else {
            return Ok(());
        };

        let items = self.dump();
        let count = items.len();
        tokio::task::spawn_blocking(move || Self::write_snapshot(&path, &items)).await??;
        tracing::debug!("Flushed {} documents to snapshot", count);
        Ok(())
    }
}
