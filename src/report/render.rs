//! Panel and Table Rendering
//!
//! Turns query results into plain styled text. Statistics become a list of
//! [`Fragment`]s first, so what is shown for each statistic is data, not a
//! formatting code path.

use super::types::{Fragment, LookupRow, MISSING, Panel, SITE_ROOT};
use crate::lookup::resolver::MAX_QUERY_WORDS;
use crate::lookup::types::LookupOutcome;
use crate::stats::types::{StatRow, Statistic};
use crate::storage::pipeline::{BookRecord, ContributorMetric, ContributorRecord, QueryResult};
use crate::storage::types::CatalogItem;

use comfy_table::{ContentArrangement, Table};
use console::style;

/// Joins a stored `uri` onto the site root.
pub fn full_url(uri: Option<&str>) -> String {
    match uri {
        Some(uri) => format!("{}{}", SITE_ROOT, uri),
        None => MISSING.to_string(),
    }
}

fn number(value: Option<f64>) -> String {
    value.map_or_else(|| MISSING.to_string(), |v| format!("{:.2}", v))
}

fn text(value: Option<&str>) -> String {
    value.unwrap_or(MISSING).to_string()
}

fn book_fragments(book: &BookRecord, metric: &'static str, value: String) -> Vec<Fragment> {
    vec![
        Fragment::Book {
            name: book.name.clone(),
            metric,
            value,
        },
        Fragment::BookAuthor(book.main_author.as_ref().and_then(|c| c.cover_name.clone())),
        Fragment::BookNarrator(book.main_actor.as_ref().and_then(|c| c.cover_name.clone())),
        Fragment::Url(book.uri.clone()),
    ]
}

fn contributor_fragments(record: &ContributorRecord) -> Vec<Fragment> {
    let (metric, value, samples) = match &record.metric {
        ContributorMetric::NumBooks { num_books } => ("books", num_books.to_string(), None),
        ContributorMetric::BooksNarrated { books_narrated } => {
            ("books narrated", books_narrated.to_string(), None)
        }
        ContributorMetric::AvgRating {
            sum_books,
            avg_rating,
        } => ("average rating", number(*avg_rating), Some(*sum_books)),
        ContributorMetric::AvgReviews {
            sum_books,
            avg_reviews,
        } => ("average reviews", number(*avg_reviews), Some(*sum_books)),
    };

    let mut fragments = vec![Fragment::Contributor {
        name: record.name.clone(),
        metric,
        value,
    }];
    if let Some(samples) = samples {
        fragments.push(Fragment::SampleCount(samples));
    }
    fragments.push(Fragment::Url(record.uri.clone()));
    fragments
}

/// Builds the panel for one computed statistic.
pub fn panel_for(row: &StatRow) -> Panel {
    let fragments = match (&row.result, row.statistic) {
        (QueryResult::Scalar(total), _) => vec![Fragment::Total(*total)],
        (QueryResult::Book(book), Statistic::MostReviewedBook) => book_fragments(
            book,
            "reviews",
            book.reviews_count
                .map_or_else(|| MISSING.to_string(), |n| n.to_string()),
        ),
        (QueryResult::Book(book), _) => book_fragments(book, "rating", number(book.global_rating)),
        (QueryResult::Contributor(record), _) => contributor_fragments(record),
        (QueryResult::Empty, _) => Vec::new(),
    };

    Panel {
        title: row.statistic.title(),
        fragments,
    }
}

fn render_fragment(fragment: &Fragment) -> String {
    let sep = style("|").bold().yellow();
    match fragment {
        Fragment::Total(total) => format!("{}", style(total).magenta()),
        Fragment::Book {
            name,
            metric,
            value,
        }
        | Fragment::Contributor {
            name,
            metric,
            value,
        } => format!(
            "{} ({}: {}) {}",
            style(text(name.as_deref())).cyan(),
            metric,
            style(value).magenta(),
            sep
        ),
        Fragment::BookAuthor(name) => format!(
            "{}: {} {}",
            style("Author").cyan(),
            style(text(name.as_deref())).magenta(),
            sep
        ),
        Fragment::BookNarrator(name) => format!(
            "{}: {} {}",
            style("Narrator").cyan(),
            style(text(name.as_deref())).magenta(),
            sep
        ),
        Fragment::SampleCount(count) => format!(
            "{}: {} {}",
            style("Books").cyan(),
            style(count).magenta(),
            sep
        ),
        Fragment::Url(uri) => format!(
            "{}: {}",
            style("URL").cyan(),
            style(full_url(uri.as_deref())).magenta()
        ),
    }
}

/// Renders a panel as a title line followed by an indented body.
pub fn render_panel(panel: &Panel) -> String {
    let body = if panel.fragments.is_empty() {
        style("no data").dim().to_string()
    } else {
        panel
            .fragments
            .iter()
            .map(render_fragment)
            .collect::<Vec<_>>()
            .join(" ")
    };

    format!(
        "{}\n  {}\n",
        style(format!("== {} ==", panel.title)).green().bold(),
        body
    )
}

/// Renders every statistic, one panel each, in display order.
pub fn render_stats(rows: &[StatRow]) -> String {
    rows.iter()
        .map(|row| render_panel(&panel_for(row)))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn lookup_row(item: &CatalogItem) -> LookupRow {
    LookupRow {
        book: text(item.name.as_deref()),
        narrator: text(item.narrator_name()),
        reviews: item
            .reviews_count
            .map_or_else(|| MISSING.to_string(), |n| n.to_string()),
        url: full_url(item.uri.as_deref()),
    }
}

pub fn lookup_table(header: &str, matches: &[CatalogItem]) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Book", "Narrator", "Reviews", "URL"]);

    for row in matches.iter().map(lookup_row) {
        table.add_row(vec![row.book, row.narrator, row.reviews, row.url]);
    }

    format!(
        "{}\n{}",
        style(format!("Results for `{}`", header)).green().bold(),
        table
    )
}

/// Renders a lookup outcome: a table of matches or a one-line message.
pub fn render_lookup(outcome: &LookupOutcome) -> String {
    match outcome {
        LookupOutcome::Found {
            header, matches, ..
        } => lookup_table(header, matches),
        LookupOutcome::NotFound { header } => format!(
            "{}",
            style(format!("Nothing found for `{}`", header)).red().bold()
        ),
        LookupOutcome::TooLong { header, words } => format!(
            "{}",
            style(format!(
                "Query `{}` is too long ({} words). Use at most {} words.",
                header, words, MAX_QUERY_WORDS
            ))
            .red()
            .bold()
        ),
        LookupOutcome::Empty => format!("{}", style("Nothing to look up").red().bold()),
    }
}
