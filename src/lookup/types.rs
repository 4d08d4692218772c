use crate::storage::types::{CatalogItem, SearchField};

/// What the user is looking up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
    Author,
    Book,
}

impl LookupKind {
    pub fn field(&self) -> SearchField {
        match self {
            LookupKind::Author => SearchField::AuthorName,
            LookupKind::Book => SearchField::BookName,
        }
    }
}

/// One element of a permuted query pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    /// A user word, matched literally.
    Word(String),
    /// Optional middle name or patronymic between first and last name.
    OptionalMiddleName,
}

impl Term {
    pub const MIDDLE_NAME_PATTERN: &'static str = "[а-яa-z]* ?";

    pub fn to_pattern(&self) -> String {
        match self {
            Term::Word(word) => regex::escape(word),
            Term::OptionalMiddleName => Self::MIDDLE_NAME_PATTERN.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    /// `pattern` is the first permutation that matched; `matches` are ordered by reviews.
    Found {
        header: String,
        pattern: String,
        matches: Vec<CatalogItem>,
    },
    /// No permutation matched. `header` is the query as typed.
    NotFound { header: String },
    /// The query has more words than the lookup accepts.
    TooLong { header: String, words: usize },
    /// Nothing to look up.
    Empty,
}
