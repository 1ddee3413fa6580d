mod bytes;
pub mod mime;

pub use bytes::{format_bytes, percent_of};
pub use mime::{categorize, is_workspace_native};
