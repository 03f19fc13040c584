//! Workbooks in the root directory exposed as `excel://` resources.

use crate::state::AppState;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use rmcp::model::{AnnotateAble, RawResource, Resource};
use std::sync::Arc;
use tokio::task;
use walkdir::WalkDir;

pub const URI_SCHEME: &str = "excel://";
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const TIMEOUT_MESSAGE: &str = "Error: Operation timed out while reading Excel file";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDescriptor {
    pub uri: String,
    pub name: String,
    pub mime_type: String,
    pub description: String,
}

impl ResourceDescriptor {
    fn for_file(file_name: &str) -> Self {
        Self {
            uri: format!("{URI_SCHEME}{}", quote(file_name)),
            name: file_name.to_string(),
            mime_type: XLSX_MIME.to_string(),
            description: format!("Excel workbook: {file_name}"),
        }
    }

    pub fn to_resource(&self) -> Resource {
        let mut raw = RawResource::new(self.uri.clone(), self.name.clone());
        raw.description = Some(self.description.clone());
        raw.mime_type = Some(self.mime_type.clone());
        raw.no_annotation()
    }
}

/// Scans the root (not its subdirectories). Enumeration failures yield an
/// empty list so capability discovery keeps working.
pub fn list_resources(state: &AppState) -> Vec<ResourceDescriptor> {
    let config = state.config();
    let mut names = Vec::new();
    for entry in WalkDir::new(&config.excel_root).min_depth(1).max_depth(1) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                tracing::warn!(root = %config.excel_root.display(), error = %error, "resource listing failed");
                return Vec::new();
            }
        };
        if !entry.file_type().is_file() || !config.is_supported_extension(entry.path()) {
            continue;
        }
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    names.iter().map(|name| ResourceDescriptor::for_file(name)).collect()
}

/// Always answers with text; failures become definite messages.
pub async fn read_resource(state: Arc<AppState>, uri: &str) -> String {
    tracing::info!(uri = uri, "resource read requested");
    let Some(encoded) = uri.strip_prefix(URI_SCHEME) else {
        return format!("Error reading resource: Invalid URI scheme: {uri}");
    };
    let name = unquote(encoded);
    let path = state.resolver().resolve(&name);
    if !path.as_path().exists() {
        return format!("Error: File not found: {name}");
    }

    let timeout = state.config().resource_timeout();
    let backend = state.backend();
    // The worker is abandoned, not cancelled, when the bound elapses.
    let worker = task::spawn_blocking(move || backend.workbook_metadata(&path, true));
    match tokio::time::timeout(timeout, worker).await {
        Ok(Ok(Ok(metadata))) => serde_json::to_string_pretty(&metadata)
            .unwrap_or_else(|e| format!("Error reading workbook: {e}")),
        Ok(Ok(Err(error))) => format!("Error reading workbook: {error}"),
        Ok(Err(join_error)) => {
            tracing::error!(uri = uri, error = %join_error, "resource worker failed");
            format!("Error reading workbook: {join_error}")
        }
        Err(_) => {
            tracing::warn!(uri = uri, timeout_ms = timeout.as_millis() as u64, "resource read timed out");
            TIMEOUT_MESSAGE.to_string()
        }
    }
}

/// URL path quoting: unreserved characters and `/` pass, the rest is `%XX`.
const PATH_SAFE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~')
    .remove(b'/');

pub fn quote(raw: &str) -> String {
    utf8_percent_encode(raw, PATH_SAFE).to_string()
}

/// Reverses [`quote`]; malformed escapes are kept as written.
pub fn unquote(encoded: &str) -> String {
    percent_decode_str(encoded).decode_utf8_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoting_matches_url_path_rules() {
        assert_eq!(quote("a.xlsx"), "a.xlsx");
        assert_eq!(quote("Q1 report (final).xlsx"), "Q1%20report%20%28final%29.xlsx");
        assert_eq!(quote("dir/ü.xlsx"), "dir/%C3%BC.xlsx");
    }

    #[test]
    fn unquote_reverses_and_tolerates_garbage() {
        assert_eq!(unquote("Q1%20report%20%28final%29.xlsx"), "Q1 report (final).xlsx");
        assert_eq!(unquote("dir/%C3%BC.xlsx"), "dir/ü.xlsx");
        assert_eq!(unquote("100%.xlsx"), "100%.xlsx");
        assert_eq!(unquote("%zz"), "%zz");
        assert_eq!(unquote("%E2%82"), "\u{FFFD}");
    }
}
