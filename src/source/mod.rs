//! Where entry metadata, listings and previews come from.

use serde::{Deserialize, Serialize};

use crate::error::Result;

mod http;
mod local;

pub use http::HttpSource;
pub use local::LocalSource;

/// Marker appended to previews cut at the byte cap.
pub const ELLIPSIS: &str = "…";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

/// Result of stat-ing a path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

/// One row of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildEntry {
    #[serde(rename = "entry")]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchKind {
    Entry,
    Listing,
    Preview,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchRequest {
    pub path: String,
    pub kind: FetchKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchPayload {
    Entry(EntryInfo),
    Listing(Vec<ChildEntry>),
    Preview(String),
}

/// A finished fetch, posted back to the render thread.
#[derive(Debug)]
pub struct FetchOutcome {
    pub request: FetchRequest,
    pub result: Result<FetchPayload>,
}

/// Stat, list and preview filesystem entries by path string.
///
/// Implementations block; they are called from worker threads.
pub trait EntrySource: Send + Sync {
    fn stat(&self, path: &str) -> Result<EntryInfo>;

    /// Immediate children with their kinds, in display order.
    fn list_dir(&self, path: &str) -> Result<Vec<ChildEntry>>;

    /// Leading text of a file, cut at the last full line plus [`ELLIPSIS`]
    /// when longer than the source's byte cap.
    fn preview(&self, path: &str) -> Result<String>;

    fn fetch(&self, request: &FetchRequest) -> Result<FetchPayload> {
        match request.kind {
            FetchKind::Entry => self.stat(&request.path).map(FetchPayload::Entry),
            FetchKind::Listing => self.list_dir(&request.path).map(FetchPayload::Listing),
            FetchKind::Preview => self.preview(&request.path).map(FetchPayload::Preview),
        }
    }
}

/// `parent + "/" + name`, without doubling a trailing separator.
pub fn child_path(parent: &str, name: &str) -> String {
    if parent.ends_with('/') {
        format!("{}{}", parent, name)
    } else {
        format!("{}/{}", parent, name)
    }
}

/// Last component of a path string, for labels.
pub fn display_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return "/";
    }
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

/// Decode a preview read; `hit_cap` cuts after the last newline and marks it.
pub fn clip_preview(bytes: &[u8], hit_cap: bool) -> String {
    let text = String::from_utf8_lossy(bytes);
    if !hit_cap {
        return text.into_owned();
    }
    let keep = text.rfind('\n').map(|idx| idx + 1).unwrap_or(0);
    format!("{}{}", &text[..keep], ELLIPSIS)
}
