use anyhow::Context;
use audiobook_stats::config::{Cli, Mode};
use audiobook_stats::ingestion::{IngestionCoordinator, PageFetcher};
use audiobook_stats::report::{render_lookup, render_stats};
use audiobook_stats::storage::{CatalogStore, MemoryStore};
use audiobook_stats::{lookup, stats};
use clap::Parser;
use console::style;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let store = Arc::new(
        MemoryStore::open(&cli.data_dir, &cli.database, &cli.collection).with_context(|| {
            format!("failed to open collection in {}", cli.data_dir.display())
        })?,
    );
    tracing::debug!(
        "Opened {} ({} documents)",
        store.namespace(),
        store.local_entry_count()
    );

    match cli.mode() {
        Mode::Load => {
            let fetcher = Arc::new(PageFetcher::new(&cli.base_url, cli.timeout()));
            let coordinator = IngestionCoordinator::new(fetcher, store.clone(), cli.page_size);

            let summary = coordinator.run().await.context("catalog load aborted")?;

            println!(
                "{} {} audiobooks from {} pages in {:.2} seconds",
                style("Loaded").green().bold(),
                summary.inserted_items(),
                summary.outcomes.len(),
                summary.elapsed.as_secs_f64()
            );
            let failed = summary.failed_pages();
            if !failed.is_empty() {
                println!(
                    "{} pages failed: {:?}",
                    style(failed.len()).red().bold(),
                    failed
                );
            }
        }
        Mode::DropCollection => {
            let namespace = store.drop_all().await?;
            println!("{} {}", style("Dropped").yellow().bold(), namespace);
        }
        Mode::Stats => {
            let rows = stats::run_all(store.as_ref()).await?;
            println!("{}", render_stats(&rows));
        }
        Mode::Lookup(kind, words) => {
            let outcome = lookup::resolve(store.as_ref(), kind, &words, cli.limit).await?;
            println!("{}", render_lookup(&outcome));
        }
        Mode::Test => {
            let fetcher = PageFetcher::new(&cli.base_url, cli.timeout());
            let reported = fetcher
                .verification_count()
                .await
                .with_context(|| format!("catalog at {} did not answer", cli.base_url))?;
            let stored = store.count().await?;

            println!(
                "{} catalog reports {} audiobooks, {} holds {}",
                style("OK").green().bold(),
                reported,
                store.namespace(),
                stored
            );
        }
    }

    Ok(())
}
