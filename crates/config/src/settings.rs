use color_eyre::eyre::Result;
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::{debug, info};

const APP_NAME: &str = "drivetree";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Files above this many bytes are rejected as invalid.
    #[serde(default)]
    pub max_file_size: Option<u64>,
    #[serde(default)]
    pub include_trashed: bool,
    #[serde(default)]
    pub on_invalid: InvalidRecordPolicy,
    #[serde(default)]
    pub prune_policy: PrunePolicy,
    #[serde(default = "default_root_segment")]
    pub root_segment: String,
    #[serde(default = "default_orphan_segment")]
    pub orphan_segment: String,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

// Default value functions for serde
fn default_root_segment() -> String {
    "My Drive".to_string()
}
fn default_orphan_segment() -> String {
    "Shared with me".to_string()
}
fn default_log_filter() -> String {
    "drivetree=info,warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_file_size: None,
            include_trashed: false,
            on_invalid: InvalidRecordPolicy::default(),
            prune_policy: PrunePolicy::default(),
            root_segment: default_root_segment(),
            orphan_segment: default_orphan_segment(),
            log_filter: default_log_filter(),
        }
    }
}

impl Settings {
    /// Loads settings from the user config directory, falling back to defaults
    /// when no config file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be determined, or the
    /// file exists but cannot be read or parsed.
    pub async fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path).await
        } else {
            debug!("No config at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// # Errors
    ///
    /// Returns an error if `path` cannot be read or is not valid TOML for `Settings`.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let settings: Settings = toml::from_str(&content)?;
        info!("Settings loaded from {:?}", path);
        Ok(settings)
    }

    /// # Errors
    ///
    /// Returns an error if the config directory cannot be determined or written.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails or `path` cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        info!("Settings saved to {:?}", path);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the platform has no config directory.
    pub fn config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().ok_or_else(|| color_eyre::eyre::eyre!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }
}

/// What a build does with a record that fails validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InvalidRecordPolicy {
    #[default]
    Skip,
    Abort,
}

impl FromStr for InvalidRecordPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "abort" => Ok(Self::Abort),
            _ => Err(format!("Unknown invalid-record policy: {s}")),
        }
    }
}

impl fmt::Display for InvalidRecordPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skip => write!(f, "skip"),
            Self::Abort => write!(f, "abort"),
        }
    }
}

/// Which emptied parents a removal may prune.
///
/// `AllParents` considers every folder the removed item was linked into.
/// `LastParent` only considers the most recently linked one, which is how
/// single-parent trees were handled before multi-parent items were modelled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrunePolicy {
    #[default]
    AllParents,
    LastParent,
}

impl FromStr for PrunePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all-parents" | "all" => Ok(Self::AllParents),
            "last-parent" | "last" => Ok(Self::LastParent),
            _ => Err(format!("Unknown prune policy: {s}")),
        }
    }
}

impl fmt::Display for PrunePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllParents => write!(f, "all-parents"),
            Self::LastParent => write!(f, "last-parent"),
        }
    }
}
