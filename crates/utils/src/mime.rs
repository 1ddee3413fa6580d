use drivetree_models::MimeCategory;
use regex::Regex;

#[allow(clippy::expect_used)]
// Workspace-native formats are exported on demand and report no size or checksum
pub static WORKSPACE_MIME: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(r"^application/vnd\.google-apps\.[a-z-]+$").expect("Failed to compile WORKSPACE_MIME regex")
});

#[must_use]
pub fn is_workspace_native(mime_type: &str) -> bool {
    WORKSPACE_MIME.is_match(mime_type)
}

#[must_use]
pub fn categorize(mime_type: &str) -> MimeCategory {
    if is_workspace_native(mime_type) {
        return MimeCategory::Workspace;
    }

    let (top, sub) = mime_type.split_once('/').unwrap_or((mime_type, ""));
    match (top.to_lowercase().as_str(), sub.to_lowercase().as_str()) {
        ("image", _) => MimeCategory::Image,
        ("video", _) => MimeCategory::Video,
        ("audio", _) => MimeCategory::Audio,

        ("text", _)
        | (
            "application",
            "pdf" | "msword" | "rtf" | "json" | "xml" | "vnd.oasis.opendocument.text"
            | "vnd.oasis.opendocument.spreadsheet" | "vnd.ms-excel" | "vnd.ms-powerpoint",
        ) => MimeCategory::Document,
        ("application", s) if s.starts_with("vnd.openxmlformats-officedocument") => MimeCategory::Document,

        (
            "application",
            "zip" | "gzip" | "x-gzip" | "x-tar" | "x-7z-compressed" | "x-rar-compressed" | "vnd.rar" | "x-bzip2"
            | "x-xz",
        ) => MimeCategory::Archive,

        _ => MimeCategory::Other,
    }
}
