//! Aggregation Pipelines
//!
//! A small, closed pipeline language executed over the documents of the store.
//! Each ranking statistic is described once as an [`AggregationSpec`] and run by a
//! single interpreter ([`execute`]), so adding a statistic never means adding a
//! new code path in the store.
//!
//! ## Ordering
//! Input documents arrive in natural (insertion) order. Every sort is stable, so
//! ties keep natural order. Groups are emitted in order of first appearance before
//! sorting. Null values always sort last on a descending sort.

use super::types::{CatalogItem, Contributor, NumericField};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// The contributor role a group stage buckets documents by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    /// `main_author.cover_name`
    Author,
    /// `main_actor.cover_name`
    Narrator,
}

impl GroupKey {
    fn contributor<'a>(&self, item: &'a CatalogItem) -> Option<&'a Contributor> {
        match self {
            GroupKey::Author => item.main_author.as_ref(),
            GroupKey::Narrator => item.main_actor.as_ref(),
        }
    }
}

/// What is computed per group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accumulator {
    /// Number of documents in the group.
    Count,
    /// Mean of a numeric field, ignoring documents where it is null.
    Average(NumericField),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    /// Total number of documents.
    Count,
    /// The single document ranked first on a descending sort of `sort_by`.
    TopDocument { sort_by: NumericField },
    /// Group, accumulate, filter on sample size, sort descending, skip, limit.
    Group {
        key: GroupKey,
        accumulator: Accumulator,
        /// Groups with fewer documents are dropped before ranking.
        min_samples: Option<u64>,
        /// Leading ranked groups to discard (known placeholder buckets).
        skip: usize,
        limit: usize,
    },
}

/// A named, immutable pipeline producing one ranking statistic.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationSpec {
    pub name: &'static str,
    pub stage: Stage,
}

/// Projection of a ranked audiobook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookRecord {
    pub name: Option<String>,
    pub uri: Option<String>,
    pub main_author: Option<Contributor>,
    pub main_actor: Option<Contributor>,
    pub global_rating: Option<f64>,
    pub reviews_count: Option<u64>,
}

impl From<&CatalogItem> for BookRecord {
    fn from(item: &CatalogItem) -> Self {
        Self {
            name: item.name.clone(),
            uri: item.uri.clone(),
            main_author: item.main_author.clone(),
            main_actor: item.main_actor.clone(),
            global_rating: item.global_rating,
            reviews_count: item.reviews_count,
        }
    }
}

/// The per-group value, serialized under the field names the renderer expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ContributorMetric {
    AvgRating { sum_books: u64, avg_rating: Option<f64> },
    AvgReviews { sum_books: u64, avg_reviews: Option<f64> },
    NumBooks { num_books: u64 },
    BooksNarrated { books_narrated: u64 },
}

impl ContributorMetric {
    /// The value groups are ranked by.
    pub fn rank_value(&self) -> Option<f64> {
        match self {
            ContributorMetric::AvgRating { avg_rating, .. } => *avg_rating,
            ContributorMetric::AvgReviews { avg_reviews, .. } => *avg_reviews,
            ContributorMetric::NumBooks { num_books } => Some(*num_books as f64),
            ContributorMetric::BooksNarrated { books_narrated } => Some(*books_narrated as f64),
        }
    }
}

/// One ranked contributor group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContributorRecord {
    /// Group key: the contributor display name (null for documents without one).
    #[serde(rename = "_id")]
    pub name: Option<String>,
    /// URI taken from the first document of the group in natural order.
    pub uri: Option<String>,
    #[serde(flatten)]
    pub metric: ContributorMetric,
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    Scalar(u64),
    Book(BookRecord),
    Contributor(ContributorRecord),
    Empty,
}

impl QueryResult {
    pub fn is_empty(&self) -> bool {
        matches!(self, QueryResult::Empty)
    }
}

/// Runs `spec` over `items`, which must be in natural order.
pub fn execute(spec: &AggregationSpec, items: &[CatalogItem]) -> Vec<QueryResult> {
    match &spec.stage {
        Stage::Count => vec![QueryResult::Scalar(items.len() as u64)],
        Stage::TopDocument { sort_by } => {
            let mut ranked: Vec<&CatalogItem> = items.iter().collect();
            ranked.sort_by(|a, b| desc_nulls_last(sort_by.value(a), sort_by.value(b)));
            ranked
                .first()
                .map(|item| vec![QueryResult::Book(BookRecord::from(*item))])
                .unwrap_or_default()
        }
        Stage::Group {
            key,
            accumulator,
            min_samples,
            skip,
            limit,
        } => {
            let mut records: Vec<ContributorRecord> = group(items, *key)
                .into_iter()
                .filter(|bucket| min_samples.is_none_or(|floor| bucket.count >= floor))
                .map(|bucket| bucket.into_record(*key, *accumulator))
                .collect();
            records.sort_by(|a, b| desc_nulls_last(a.metric.rank_value(), b.metric.rank_value()));
            records
                .into_iter()
                .skip(*skip)
                .take(*limit)
                .map(QueryResult::Contributor)
                .collect()
        }
    }
}

struct Bucket<'a> {
    name: Option<String>,
    uri: Option<String>,
    count: u64,
    members: Vec<&'a CatalogItem>,
}

impl Bucket<'_> {
    fn into_record(self, key: GroupKey, accumulator: Accumulator) -> ContributorRecord {
        let metric = match accumulator {
            Accumulator::Count => match key {
                GroupKey::Author => ContributorMetric::NumBooks {
                    num_books: self.count,
                },
                GroupKey::Narrator => ContributorMetric::BooksNarrated {
                    books_narrated: self.count,
                },
            },
            Accumulator::Average(field) => {
                let average = mean(self.members.iter().filter_map(|item| field.value(item)));
                match field {
                    NumericField::GlobalRating => ContributorMetric::AvgRating {
                        sum_books: self.count,
                        avg_rating: average,
                    },
                    NumericField::ReviewsCount => ContributorMetric::AvgReviews {
                        sum_books: self.count,
                        avg_reviews: average,
                    },
                }
            }
        };

        ContributorRecord {
            name: self.name,
            uri: self.uri,
            metric,
        }
    }
}

fn group(items: &[CatalogItem], key: GroupKey) -> Vec<Bucket<'_>> {
    let mut buckets: Vec<Bucket> = Vec::new();
    let mut index: HashMap<Option<String>, usize> = HashMap::new();

    for item in items {
        let contributor = key.contributor(item);
        let name = contributor.and_then(|c| c.cover_name.clone());

        let slot = *index.entry(name.clone()).or_insert_with(|| {
            buckets.push(Bucket {
                name,
                uri: contributor.and_then(|c| c.uri.clone()),
                count: 0,
                members: Vec::new(),
            });
            buckets.len() - 1
        });

        let bucket = &mut buckets[slot];
        bucket.count += 1;
        bucket.members.push(item);
    }

    buckets
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0u64), |(sum, n), value| (sum + value, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// Descending comparator that puts nulls after every value.
pub(crate) fn desc_nulls_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
