use std::path::{Path, PathBuf};

use color_eyre::eyre::{Result, WrapErr};
use drivetree_models::{FilePage, RawItem};
use serde::Deserialize;
use tracing::{debug, info, warn};

/// Accepted layouts of a listing dump.
#[derive(Deserialize)]
#[serde(untagged)]
enum Listing {
    Items(Vec<RawItem>),
    Pages(Vec<FilePage>),
    Page(FilePage),
}

/// Parses one JSON document into pages.
///
/// The document may be a single `files.list` page, an array of pages, or a
/// bare array of item records (treated as one page).
///
/// # Errors
///
/// Returns an error if `json` matches none of those layouts.
pub fn parse_pages(json: &str) -> Result<Vec<FilePage>> {
    let listing: Listing =
        serde_json::from_str(json).wrap_err("expected a files.list page, an array of pages, or an array of items")?;
    Ok(match listing {
        Listing::Items(files) => vec![FilePage {
            files,
            ..FilePage::default()
        }],
        Listing::Pages(pages) => pages,
        Listing::Page(page) => vec![page],
    })
}

/// Listing dumps on disk, read in the order given.
#[derive(Debug, Clone, Default)]
pub struct JsonPageSource {
    paths: Vec<PathBuf>,
}

impl JsonPageSource {
    #[must_use]
    pub fn new(paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Reads every file and returns all of their pages.
    ///
    /// # Errors
    ///
    /// Fails on the first file that cannot be read or parsed.
    pub async fn load(&self) -> Result<Vec<FilePage>> {
        let mut pages = Vec::new();
        for path in &self.paths {
            pages.extend(Self::load_file(path).await?);
        }
        let items: usize = pages.iter().map(|p| p.files.len()).sum();
        info!("Loaded {} page(s) with {} item(s) from {} file(s)", pages.len(), items, self.paths.len());
        Ok(pages)
    }

    /// # Errors
    ///
    /// Returns an error if `path` cannot be read or parsed.
    pub async fn load_file(path: &Path) -> Result<Vec<FilePage>> {
        let content = tokio::fs::read_to_string(path)
            .await
            .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
        let pages = parse_pages(&content).wrap_err_with(|| format!("Failed to parse {}", path.display()))?;

        if pages.iter().any(|p| p.incomplete_search) {
            warn!("{:?} reports an incomplete search; the tree may be missing items", path);
        }
        if pages.last().is_some_and(|p| !p.is_last()) {
            debug!("{:?} ends with a page token; later pages are not included", path);
        }
        Ok(pages)
    }
}
