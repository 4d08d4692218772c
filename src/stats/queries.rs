//! Ranking Queries
//!
//! Maps each `Statistic` to its aggregation pipeline and runs the full set.

use super::types::{StatRow, Statistic};
use crate::storage::client::CatalogStore;
use crate::storage::pipeline::{Accumulator, AggregationSpec, GroupKey, QueryResult, Stage};
use crate::storage::types::{NumericField, StoreError};

/// Ranked groups discarded by the "most prolific" queries. The top bucket is a
/// placeholder (a syndicating publisher, the anonymous narrator) that would
/// otherwise always win.
pub const PLACEHOLDER_SKIP: usize = 1;

/// Minimum audiobooks per author before an average is ranked.
pub const MIN_AVERAGE_SAMPLES: u64 = 5;

impl Statistic {
    pub fn spec(&self) -> AggregationSpec {
        match self {
            Statistic::TotalBooks => AggregationSpec {
                name: "books_total",
                stage: Stage::Count,
            },
            Statistic::HighestRatedBook => AggregationSpec {
                name: "highest_rated_book",
                stage: Stage::TopDocument {
                    sort_by: NumericField::GlobalRating,
                },
            },
            Statistic::MostReviewedBook => AggregationSpec {
                name: "most_reviewed_book",
                stage: Stage::TopDocument {
                    sort_by: NumericField::ReviewsCount,
                },
            },
            Statistic::MostProlificAuthor => prolific("most_prolific_author", GroupKey::Author),
            Statistic::MostProlificNarrator => {
                prolific("most_prolific_narrator", GroupKey::Narrator)
            }
            Statistic::HighestAvgRatedAuthor => {
                average("highest_avg_rated_author", NumericField::GlobalRating)
            }
            Statistic::HighestAvgReviewedAuthor => {
                average("highest_avg_reviewed_author", NumericField::ReviewsCount)
            }
        }
    }
}

fn prolific(name: &'static str, key: GroupKey) -> AggregationSpec {
    AggregationSpec {
        name,
        stage: Stage::Group {
            key,
            accumulator: Accumulator::Count,
            min_samples: None,
            skip: PLACEHOLDER_SKIP,
            limit: 1,
        },
    }
}

fn average(name: &'static str, field: NumericField) -> AggregationSpec {
    AggregationSpec {
        name,
        stage: Stage::Group {
            key: GroupKey::Author,
            accumulator: Accumulator::Average(field),
            min_samples: Some(MIN_AVERAGE_SAMPLES),
            skip: 0,
            limit: 1,
        },
    }
}

/// Runs one statistic and keeps its best-ranked result.
pub async fn run_statistic(
    store: &dyn CatalogStore,
    statistic: Statistic,
) -> Result<StatRow, StoreError> {
    let result = store
        .run_aggregation(&statistic.spec())
        .await?
        .into_iter()
        .next()
        .unwrap_or(QueryResult::Empty);

    Ok(StatRow { statistic, result })
}

/// Runs every statistic in display order. Store failures are not absorbed.
pub async fn run_all(store: &dyn CatalogStore) -> Result<Vec<StatRow>, StoreError> {
    let mut rows = Vec::with_capacity(Statistic::ALL.len());
    for statistic in Statistic::ALL {
        rows.push(run_statistic(store, statistic).await?);
    }
    Ok(rows)
}
