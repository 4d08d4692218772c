/// Site root that stored `uri` values are relative to.
pub const SITE_ROOT: &str = "https://zvukislov.ru";

/// Shown in place of a missing value.
pub const MISSING: &str = "n/a";

/// One render instruction inside a statistics panel.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    /// Total number of stored audiobooks.
    Total(u64),
    /// Book name with the metric it was ranked by.
    Book {
        name: Option<String>,
        metric: &'static str,
        value: String,
    },
    /// Contributor display name with the metric it was ranked by.
    Contributor {
        name: Option<String>,
        metric: &'static str,
        value: String,
    },
    BookAuthor(Option<String>),
    BookNarrator(Option<String>),
    /// Number of books an average was computed over.
    SampleCount(u64),
    Url(Option<String>),
}

/// A titled panel for one statistic.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub title: &'static str,
    pub fragments: Vec<Fragment>,
}

/// One row of the lookup table.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupRow {
    pub book: String,
    pub narrator: String,
    pub reviews: String,
    pub url: String,
}
