use clap::Parser;
use color_eyre::eyre::Result;
use drivetree::config::Settings;
use drivetree::core::{DuplicateDetector, JsonPageSource, TreeBuilder, statistics};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod cli;
mod render;

use cli::Cli;
use render::{DuplicatesView, StatisticsView, TreeView};

#[cfg(not(windows))]
#[global_allocator]
static GLOBAL: jemallocator::Jemalloc = jemallocator::Jemalloc;

#[cfg(windows)]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<()> {
    // Install error hooks
    color_eyre::install()?;

    let cli = Cli::parse();
    let settings = cli.settings().await?;
    setup_logging(&settings);

    if let Err(e) = run(&cli, &settings).await {
        error!("drivetree failed: {}", e);
        return Err(e);
    }
    Ok(())
}

/// Logs to stderr; `RUST_LOG` wins over the configured filter.
fn setup_logging(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

async fn run(cli: &Cli, settings: &Settings) -> Result<()> {
    let pages = JsonPageSource::new(&cli.pages).load().await?;

    let mut builder = TreeBuilder::new(settings);
    builder.ingest_all(pages)?;
    let (mut tree, report) = builder.finish()?;

    for id in &cli.without {
        match tree.remove(id) {
            Ok(removal) => info!(
                "Without {}: {} item(s) removed, {} folder(s) pruned",
                id,
                removal.removed.len(),
                removal.pruned.len()
            ),
            Err(e) => warn!("Cannot leave out {}: {}", id, e),
        }
    }

    print!("{}", TreeView::new(&tree, cli.depth));
    println!();
    println!("{report}");

    if cli.duplicates || cli.stats {
        let duplicates = DuplicateDetector::new()
            .include_trashed(settings.include_trashed)
            .detect_in_tree(&tree);
        if cli.duplicates {
            println!();
            print!("{}", DuplicatesView(&duplicates));
        }
        if cli.stats {
            println!();
            print!("{}", StatisticsView(&statistics::collect(&tree, Some(&duplicates))));
        }
    }
    Ok(())
}
