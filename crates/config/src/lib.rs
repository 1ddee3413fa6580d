mod settings;

pub use settings::{InvalidRecordPolicy, PrunePolicy, Settings};
