//! Command-line configuration
//!
//! Every option has an environment fallback; exactly one mode flag selects the
//! operation the process runs.

use clap::{ArgGroup, Parser};
use std::path::PathBuf;
use std::time::Duration;

use crate::lookup::LookupKind;

#[derive(Debug, Parser)]
#[command(name = "audiobook-stats")]
#[command(about = "Loads the zvukislov.ru audiobook catalog and reports rankings over it")]
#[command(version)]
#[command(group(
    ArgGroup::new("mode")
        .required(true)
        .args(["load", "drop_collection", "stats", "author", "book", "test"])
))]
pub struct Cli {
    /// Catalog API root
    #[arg(long, env = "CATALOG_BASE_URL", default_value = "https://zvukislov.ru/api")]
    pub base_url: String,

    /// Directory holding the collection snapshot
    #[arg(long, env = "CATALOG_DATA_DIR", default_value = ".audiobook-stats")]
    pub data_dir: PathBuf,

    #[arg(long, env = "CATALOG_DATABASE", default_value = "zvukislov")]
    pub database: String,

    #[arg(long, env = "CATALOG_COLLECTION", default_value = "audiobooks")]
    pub collection: String,

    /// Items requested per catalog page
    #[arg(long, env = "CATALOG_PAGE_SIZE", default_value_t = 1000)]
    pub page_size: u32,

    /// Per-request timeout in seconds
    #[arg(long, env = "CATALOG_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Rows shown for a lookup
    #[arg(long, default_value_t = crate::lookup::resolver::DEFAULT_DISPLAY_LIMIT)]
    pub limit: usize,

    /// Load the whole catalog into an empty collection
    #[arg(short = 'l', long)]
    pub load: bool,

    /// Drop the collection
    #[arg(short = 'D', long)]
    pub drop_collection: bool,

    /// Show ranking statistics
    #[arg(short = 's', long)]
    pub stats: bool,

    /// Look up audiobooks by author name
    #[arg(short = 'a', long, num_args = 1.., value_name = "WORDS")]
    pub author: Option<Vec<String>>,

    /// Look up audiobooks by title
    #[arg(short = 'b', long, num_args = 1.., value_name = "WORDS")]
    pub book: Option<Vec<String>>,

    /// Check that the catalog answers and report the stored count
    #[arg(short = 't', long)]
    pub test: bool,
}

/// The single operation selected on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Load,
    DropCollection,
    Stats,
    Lookup(LookupKind, Vec<String>),
    Test,
}

impl Cli {
    pub fn mode(&self) -> Mode {
        if self.load {
            Mode::Load
        } else if self.drop_collection {
            Mode::DropCollection
        } else if self.stats {
            Mode::Stats
        } else if let Some(words) = &self.author {
            Mode::Lookup(LookupKind::Author, words.clone())
        } else if let Some(words) = &self.book {
            Mode::Lookup(LookupKind::Book, words.clone())
        } else {
            Mode::Test
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
