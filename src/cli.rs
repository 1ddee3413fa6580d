use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::Result;
use drivetree::config::{InvalidRecordPolicy, PrunePolicy, Settings};

#[derive(Debug, Parser)]
#[command(name = "drivetree")]
#[command(about = "Folder sizes for a Google Drive listing", long_about = None)]
pub struct Cli {
    /// Saved `files.list` responses, read in order
    #[arg(required = true)]
    pub pages: Vec<PathBuf>,

    /// Settings file (defaults to the user config directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Levels to print below each top-level heading
    #[arg(short, long, default_value_t = 2)]
    pub depth: usize,

    /// Count trashed items too
    #[arg(long)]
    pub include_trashed: bool,

    /// Stop at the first invalid record instead of skipping it
    #[arg(long)]
    pub abort_on_invalid: bool,

    /// Which emptied parents a removal prunes: all-parents or last-parent
    #[arg(long)]
    pub prune_policy: Option<PrunePolicy>,

    /// Show the tree as it would be without these item ids
    #[arg(long, value_name = "ID")]
    pub without: Vec<String>,

    /// List files sharing a checksum
    #[arg(long)]
    pub duplicates: bool,

    /// Print totals by type and the largest files
    #[arg(long)]
    pub stats: bool,
}

impl Cli {
    /// Loads settings and applies the command-line overrides.
    pub async fn settings(&self) -> Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => Settings::load_from(path).await?,
            None => Settings::load().await?,
        };
        if self.include_trashed {
            settings.include_trashed = true;
        }
        if self.abort_on_invalid {
            settings.on_invalid = InvalidRecordPolicy::Abort;
        }
        if let Some(policy) = self.prune_policy {
            settings.prune_policy = policy;
        }
        Ok(settings)
    }
}
