//! Permutation Resolver
//!
//! Users type names in any order ("Толстой Лев", "Лев Толстой"). Each distinct
//! ordering of the query words is tried as a pattern, in enumeration order, and the
//! first ordering with at least one match wins.

use super::types::{LookupKind, LookupOutcome, Term};
use crate::storage::client::CatalogStore;
use crate::storage::types::StoreError;

use itertools::Itertools;

/// Longest query accepted, in words.
pub const MAX_QUERY_WORDS: usize = 9;

/// Upper bound on count probes per lookup (7!). A 9-word query would otherwise
/// enumerate 362880 orderings.
pub const MAX_PERMUTATION_PROBES: usize = 5040;

/// Rows returned for a successful lookup.
pub const DEFAULT_DISPLAY_LIMIT: usize = 10;

/// Builds the terms to permute. Two-word author queries get an optional
/// middle-name slot so "Лев Толстой" also finds "Лев Николаевич Толстой".
pub fn query_terms(kind: LookupKind, words: &[String]) -> Vec<Term> {
    let mut terms: Vec<Term> = words.iter().cloned().map(Term::Word).collect();
    if kind == LookupKind::Author && words.len() == 2 {
        terms.push(Term::OptionalMiddleName);
    }
    terms
}

/// Distinct orderings of `terms`, rendered as patterns, capped.
///
/// Orderings of the user words alone come first, so "Лев Толстой" still matches
/// an author stored under exactly those two words. Orderings that include the
/// middle-name slot follow.
pub fn candidate_patterns(terms: &[Term]) -> Vec<String> {
    let words: Vec<&Term> = terms
        .iter()
        .filter(|term| matches!(term, Term::Word(_)))
        .collect();
    let widened: Vec<&Term> = terms.iter().collect();

    let mut orderings = vec![words];
    if orderings[0].len() < widened.len() {
        orderings.push(widened);
    }

    orderings
        .into_iter()
        .flat_map(|group| {
            let len = group.len();
            group.into_iter().permutations(len)
        })
        .map(|ordering| ordering.iter().map(|term| term.to_pattern()).join(" "))
        .unique()
        .take(MAX_PERMUTATION_PROBES)
        .collect()
}

pub async fn resolve(
    store: &dyn CatalogStore,
    kind: LookupKind,
    query: &[String],
    display_limit: usize,
) -> Result<LookupOutcome, StoreError> {
    let words: Vec<String> = query
        .iter()
        .flat_map(|arg| arg.split_whitespace())
        .map(str::to_string)
        .collect();

    if words.is_empty() {
        return Ok(LookupOutcome::Empty);
    }

    let header = words.join(" ");

    if words.len() > MAX_QUERY_WORDS {
        tracing::warn!("Lookup `{}` rejected: {} words", header, words.len());
        return Ok(LookupOutcome::TooLong {
            header,
            words: words.len(),
        });
    }

    let field = kind.field();
    let terms = query_terms(kind, &words);

    for pattern in candidate_patterns(&terms) {
        let hits = store.count_matching(field, &pattern).await?;
        if hits == 0 {
            continue;
        }

        tracing::debug!("Lookup `{}` matched {} documents via /{}/", header, hits, pattern);

        let mut matches = store.search(field, &pattern).await?;
        matches.truncate(display_limit);
        return Ok(LookupOutcome::Found {
            header,
            pattern,
            matches,
        });
    }

    Ok(LookupOutcome::NotFound { header })
}
