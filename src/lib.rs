//! Folder sizes for Google Drive listings.
//!
//! Re-exports the workspace crates under one roof.

pub use drivetree_config as config;
pub use drivetree_core as core;
pub use drivetree_models as models;
pub use drivetree_utils as utils;
