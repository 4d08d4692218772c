//! Storage Module Tests
//!
//! Validates the embedded store and the aggregation interpreter.
//!
//! ## Test Scopes
//! - **MemoryStore**: batch insert semantics, pattern search, drop, snapshot persistence.
//! - **Pipeline**: grouping, skip, sample floors and null handling of the ranking stages.

#[cfg(test)]
mod tests {
    use crate::storage::client::CatalogStore;
    use crate::storage::memory::MemoryStore;
    use crate::storage::pipeline::{
        self, Accumulator, AggregationSpec, ContributorMetric, GroupKey, QueryResult, Stage,
    };
    use crate::storage::types::{CatalogItem, Contributor, NumericField, SearchField, StoreError};

    fn book(id: &str, name: &str, author: &str, rating: Option<f64>, reviews: Option<u64>) -> CatalogItem {
        CatalogItem {
            id: id.to_string(),
            name: Some(name.to_string()),
            uri: Some(format!("/audiobook/{}", id)),
            main_author: Some(Contributor::new(author, &format!("/author/{}", author))),
            main_actor: Some(Contributor::new("Reader", "/actor/reader")),
            global_rating: rating,
            reviews_count: reviews,
        }
    }

    fn narrated(id: &str, narrator: &str) -> CatalogItem {
        CatalogItem {
            id: id.to_string(),
            main_actor: Some(Contributor::new(narrator, &format!("/actor/{}", narrator))),
            ..Default::default()
        }
    }

    fn store() -> MemoryStore {
        MemoryStore::new("catalog", "audiobooks")
    }

    // ============================================================
    // MEMORY STORE - bulk insert
    // ============================================================

    #[tokio::test]
    async fn test_bulk_insert_increases_count() {
        let store = store();
        assert!(store.is_empty().await.unwrap());

        let inserted = store
            .bulk_insert(vec![
                book("1", "Anna Karenina", "Lev Tolstoy", Some(4.8), Some(10)),
                book("2", "War and Peace", "Lev Tolstoy", Some(4.9), Some(20)),
            ])
            .await
            .unwrap();

        assert_eq!(inserted, 2);
        assert_eq!(store.count().await.unwrap(), 2);
        assert!(!store.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn test_bulk_insert_rejects_empty_batch() {
        let store = store();
        let result = store.bulk_insert(vec![]).await;

        assert!(matches!(result, Err(StoreError::EmptyBatch)));
    }

    #[tokio::test]
    async fn test_bulk_insert_duplicate_rejects_whole_batch() {
        let store = store();
        store
            .bulk_insert(vec![book("1", "First", "A", None, None)])
            .await
            .unwrap();

        // "2" is new but "1" collides, so nothing from this batch may land
        let result = store
            .bulk_insert(vec![
                book("2", "Second", "A", None, None),
                book("1", "Clash", "A", None, None),
            ])
            .await;

        assert!(matches!(result, Err(StoreError::DuplicateId(id)) if id == "1"));
        assert_eq!(store.count().await.unwrap(), 1);
        assert!(store.get_local("2").is_none());
        assert_eq!(store.get_local("1").unwrap().name.as_deref(), Some("First"));
    }

    #[tokio::test]
    async fn test_bulk_insert_duplicate_inside_batch() {
        let store = store();
        let result = store
            .bulk_insert(vec![
                book("7", "One", "A", None, None),
                book("7", "Two", "A", None, None),
            ])
            .await;

        assert!(matches!(result, Err(StoreError::DuplicateId(_))));
        assert_eq!(store.local_entry_count(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_bulk_inserts_union() {
        let store = std::sync::Arc::new(store());
        let mut handles = Vec::new();

        for page in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let items = (0..25)
                    .map(|i| book(&format!("{}-{}", page, i), "Title", "Author", None, None))
                    .collect();
                store.bulk_insert(items).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.count().await.unwrap(), 200);
    }

    #[tokio::test]
    async fn test_dump_preserves_insertion_order() {
        let store = store();
        store
            .bulk_insert(vec![book("b", "B", "X", None, None), book("a", "A", "X", None, None)])
            .await
            .unwrap();
        store
            .bulk_insert(vec![book("c", "C", "X", None, None)])
            .await
            .unwrap();

        let ids: Vec<String> = store.dump().into_iter().map(|item| item.id).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    // ============================================================
    // MEMORY STORE - search
    // ============================================================

    #[tokio::test]
    async fn test_search_case_insensitive_sorted_by_reviews() {
        let store = store();
        store
            .bulk_insert(vec![
                book("1", "Анна Каренина", "Лев Николаевич Толстой", None, Some(5)),
                book("2", "Война и мир", "Лев Николаевич Толстой", None, Some(50)),
                book("3", "Детство", "Лев Николаевич Толстой", None, None),
                book("4", "Идиот", "Фёдор Достоевский", None, Some(100)),
            ])
            .await
            .unwrap();

        let found = store
            .search(SearchField::AuthorName, "лев николаевич толстой")
            .await
            .unwrap();

        let ids: Vec<&str> = found.iter().map(|item| item.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1", "3"], "reviews desc, null last");
    }

    #[tokio::test]
    async fn test_count_matching_agrees_with_search() {
        let store = store();
        store
            .bulk_insert(vec![
                book("1", "Мастер и Маргарита", "Булгаков", None, None),
                book("2", "Собачье сердце", "Булгаков", None, None),
                book("3", "Белая гвардия", "Булгаков", None, None),
            ])
            .await
            .unwrap();

        let count = store
            .count_matching(SearchField::BookName, "серд|гвард")
            .await
            .unwrap();
        let found = store.search(SearchField::BookName, "серд|гвард").await.unwrap();

        assert_eq!(count, 2);
        assert_eq!(found.len(), 2);
    }

    #[tokio::test]
    async fn test_search_skips_documents_without_field() {
        let store = store();
        store
            .bulk_insert(vec![
                CatalogItem {
                    id: "anon".to_string(),
                    ..Default::default()
                },
                narrated("n1", "Reader"),
            ])
            .await
            .unwrap();

        let count = store.count_matching(SearchField::AuthorName, ".*").await.unwrap();
        assert_eq!(count, 0);

        let narrators = store.count_matching(SearchField::NarratorName, "reader").await.unwrap();
        assert_eq!(narrators, 1);
    }

    #[tokio::test]
    async fn test_search_invalid_pattern() {
        let store = store();
        let result = store.search(SearchField::BookName, "(unclosed").await;
        let count = store.count_matching(SearchField::BookName, "(unclosed").await;

        assert!(matches!(result, Err(StoreError::Pattern(_))));
        assert!(matches!(count, Err(StoreError::Pattern(_))));
    }

    #[tokio::test]
    async fn test_search_ties_keep_insertion_order() {
        let store = store();
        let items: Vec<CatalogItem> = (0..50)
            .map(|i| book(&format!("b{}", i), &format!("Сказка {}", i), "Народ", None, Some(7)))
            .collect();
        store.bulk_insert(items).await.unwrap();
        store
            .bulk_insert(vec![book("other", "Роман", "Народ", None, Some(7))])
            .await
            .unwrap();

        let found = store.search(SearchField::BookName, "сказка").await.unwrap();

        let ids: Vec<String> = found.into_iter().map(|item| item.id).collect();
        let expected: Vec<String> = (0..50).map(|i| format!("b{}", i)).collect();
        assert_eq!(ids, expected);
    }

    // ============================================================
    // MEMORY STORE - drop and persistence
    // ============================================================

    #[tokio::test]
    async fn test_drop_all_returns_namespace() {
        let store = store();
        store
            .bulk_insert(vec![book("1", "X", "Y", None, None)])
            .await
            .unwrap();

        let name = store.drop_all().await.unwrap();

        assert_eq!(name, "catalog.audiobooks");
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_snapshot_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();

        {
            let store = MemoryStore::open(dir.path(), "catalog", "audiobooks").unwrap();
            store
                .bulk_insert(vec![
                    book("1", "First", "A", Some(4.0), Some(3)),
                    book("2", "Second", "B", None, None),
                ])
                .await
                .unwrap();
            store.flush().await.unwrap();
        }

        let reopened = MemoryStore::open(dir.path(), "catalog", "audiobooks").unwrap();
        assert_eq!(reopened.count().await.unwrap(), 2);

        let ids: Vec<String> = reopened.dump().into_iter().map(|item| item.id).collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert_eq!(reopened.get_local("1").unwrap().global_rating, Some(4.0));
    }

    #[tokio::test]
    async fn test_drop_all_removes_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::open(dir.path(), "catalog", "audiobooks").unwrap();
        store
            .bulk_insert(vec![book("1", "X", "Y", None, None)])
            .await
            .unwrap();
        store.flush().await.unwrap();

        let snapshot = store.snapshot_path().unwrap().to_path_buf();
        assert!(snapshot.exists());

        store.drop_all().await.unwrap();
        assert!(!snapshot.exists());

        let reopened = MemoryStore::open(dir.path(), "catalog", "audiobooks").unwrap();
        assert!(reopened.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn test_drop_all_before_first_flush() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::open(dir.path(), "catalog", "audiobooks").unwrap();
        store
            .bulk_insert(vec![book("1", "X", "Y", None, None)])
            .await
            .unwrap();

        assert!(!store.snapshot_path().unwrap().exists());
        assert_eq!(store.drop_all().await.unwrap(), "catalog.audiobooks");
        assert!(store.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn test_flush_without_snapshot_is_noop() {
        let store = store();
        assert!(store.flush().await.is_ok());
        assert!(store.snapshot_path().is_none());
    }

    // ============================================================
    // PIPELINE - interpreter
    // ============================================================

    fn prolific_authors() -> AggregationSpec {
        AggregationSpec {
            name: "prolific",
            stage: Stage::Group {
                key: GroupKey::Author,
                accumulator: Accumulator::Count,
                min_samples: None,
                skip: 1,
                limit: 1,
            },
        }
    }

    #[test]
    fn test_pipeline_count() {
        let items = vec![book("1", "A", "X", None, None), book("2", "B", "X", None, None)];
        let spec = AggregationSpec {
            name: "total",
            stage: Stage::Count,
        };

        assert_eq!(pipeline::execute(&spec, &items), vec![QueryResult::Scalar(2)]);
    }

    #[test]
    fn test_pipeline_top_document_nulls_last() {
        let items = vec![
            book("1", "Unrated", "X", None, None),
            book("2", "Good", "X", Some(4.1), None),
            book("3", "Best", "X", Some(4.9), None),
        ];
        let spec = AggregationSpec {
            name: "top",
            stage: Stage::TopDocument {
                sort_by: NumericField::GlobalRating,
            },
        };

        let results = pipeline::execute(&spec, &items);
        match &results[..] {
            [QueryResult::Book(record)] => assert_eq!(record.name.as_deref(), Some("Best")),
            other => panic!("unexpected results: {:?}", other),
        }
    }

    #[test]
    fn test_pipeline_top_document_tie_keeps_natural_order() {
        let items = vec![
            book("1", "Earlier", "X", None, Some(7)),
            book("2", "Later", "X", None, Some(7)),
        ];
        let spec = AggregationSpec {
            name: "top",
            stage: Stage::TopDocument {
                sort_by: NumericField::ReviewsCount,
            },
        };

        let results = pipeline::execute(&spec, &items);
        match &results[..] {
            [QueryResult::Book(record)] => assert_eq!(record.name.as_deref(), Some("Earlier")),
            other => panic!("unexpected results: {:?}", other),
        }
    }

    #[test]
    fn test_pipeline_top_document_empty_input() {
        let spec = AggregationSpec {
            name: "top",
            stage: Stage::TopDocument {
                sort_by: NumericField::GlobalRating,
            },
        };

        assert!(pipeline::execute(&spec, &[]).is_empty());
    }

    #[test]
    fn test_pipeline_skip_returns_second_ranked_group() {
        let mut items = Vec::new();
        // Placeholder bucket dominates with 5 items, real authors follow
        for i in 0..5 {
            items.push(book(&format!("p{}", i), "Issue", "Newspaper", None, None));
        }
        for i in 0..3 {
            items.push(book(&format!("c{}", i), "Story", "Chekhov", None, None));
        }
        items.push(book("g0", "Dead Souls", "Gogol", None, None));

        let results = pipeline::execute(&prolific_authors(), &items);

        match &results[..] {
            [QueryResult::Contributor(record)] => {
                assert_eq!(record.name.as_deref(), Some("Chekhov"));
                assert_eq!(record.uri.as_deref(), Some("/author/Chekhov"));
                assert_eq!(record.metric, ContributorMetric::NumBooks { num_books: 3 });
            }
            other => panic!("unexpected results: {:?}", other),
        }
    }

    #[test]
    fn test_pipeline_skip_with_single_group_is_empty() {
        let items = vec![book("1", "A", "Only", None, None)];
        assert!(pipeline::execute(&prolific_authors(), &items).is_empty());
    }

    #[test]
    fn test_pipeline_narrator_metric_name() {
        let items = vec![
            narrated("1", "Anonymous"),
            narrated("2", "Anonymous"),
            narrated("3", "Anonymous"),
            narrated("4", "Klyukvin"),
            narrated("5", "Klyukvin"),
        ];
        let spec = AggregationSpec {
            name: "narrators",
            stage: Stage::Group {
                key: GroupKey::Narrator,
                accumulator: Accumulator::Count,
                min_samples: None,
                skip: 1,
                limit: 1,
            },
        };

        let results = pipeline::execute(&spec, &items);
        let QueryResult::Contributor(record) = &results[0] else {
            panic!("expected contributor record");
        };
        let json = serde_json::to_value(record).unwrap();

        assert_eq!(json["_id"], "Klyukvin");
        assert_eq!(json["books_narrated"], 2);
        assert_eq!(json["uri"], "/actor/Klyukvin");
    }

    #[test]
    fn test_pipeline_average_floor_excludes_small_groups() {
        let mut items = vec![book("solo", "One Hit", "Solo", Some(5.0), None)];
        for i in 0..5 {
            items.push(book(&format!("a{}", i), "A", "Steady", Some(4.0), None));
        }
        for i in 0..6 {
            items.push(book(&format!("b{}", i), "B", "Better", Some(4.5), None));
        }
        let spec = AggregationSpec {
            name: "avg_rating",
            stage: Stage::Group {
                key: GroupKey::Author,
                accumulator: Accumulator::Average(NumericField::GlobalRating),
                min_samples: Some(5),
                skip: 0,
                limit: 1,
            },
        };

        let results = pipeline::execute(&spec, &items);
        let QueryResult::Contributor(record) = &results[0] else {
            panic!("expected contributor record");
        };

        assert_eq!(results.len(), 1);
        assert_eq!(record.name.as_deref(), Some("Better"));
        assert_eq!(
            record.metric,
            ContributorMetric::AvgRating {
                sum_books: 6,
                avg_rating: Some(4.5)
            }
        );
    }

    #[test]
    fn test_pipeline_average_ignores_nulls() {
        let items = vec![
            book("1", "A", "Mixed", None, Some(10)),
            book("2", "B", "Mixed", None, None),
            book("3", "C", "Mixed", None, Some(20)),
        ];
        let spec = AggregationSpec {
            name: "avg_reviews",
            stage: Stage::Group {
                key: GroupKey::Author,
                accumulator: Accumulator::Average(NumericField::ReviewsCount),
                min_samples: Some(3),
                skip: 0,
                limit: 1,
            },
        };

        let results = pipeline::execute(&spec, &items);
        let QueryResult::Contributor(record) = &results[0] else {
            panic!("expected contributor record");
        };
        let json = serde_json::to_value(record).unwrap();

        assert_eq!(json["sum_books"], 3);
        assert_eq!(json["avg_reviews"], 15.0);
    }

    #[test]
    fn test_pipeline_missing_contributor_forms_null_group() {
        let mut items: Vec<CatalogItem> = (0..4)
            .map(|i| CatalogItem {
                id: format!("x{}", i),
                ..Default::default()
            })
            .collect();
        items.push(book("1", "A", "Named", None, None));
        items.push(book("2", "B", "Named", None, None));

        let results = pipeline::execute(&prolific_authors(), &items);
        let QueryResult::Contributor(record) = &results[0] else {
            panic!("expected contributor record");
        };

        // The null bucket ranks first and is the one skipped
        assert_eq!(record.name.as_deref(), Some("Named"));
    }
}
