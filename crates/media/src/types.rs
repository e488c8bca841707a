//! Data types crossing the engine boundary.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A local file handed to the engine by the embedding application,
/// typically a spooled multipart upload.
#[derive(Debug, Clone)]
pub struct MediaFile {
    /// Where the bytes sit on local disk.
    pub path: PathBuf,
    /// Filename as the end user supplied it. Only its extension survives
    /// into the stored object name.
    pub original_name: String,
    /// Declared content type, checked against the allow-list.
    pub content_type: String,
}

/// Everything one upload needs, computed once after validation and never
/// re-derived mid-flight.
#[derive(Debug, Clone)]
pub(crate) struct UploadDescriptor {
    pub source: PathBuf,
    pub remote_path: String,
    pub size_bytes: u64,
    pub content_type: String,
    pub original_name: String,
}

/// Outcome of a completed upload, shaped for JSON responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    pub success: bool,
    pub remote_url: String,
    pub remote_path: String,
    pub size_bytes: u64,
    pub content_type: String,
    pub original_name: String,
}

/// One object in a user's media catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    /// Store-assigned object id, needed for deletes.
    pub id: String,
    /// Base filename without the directory prefix.
    pub name: String,
    pub remote_path: String,
    pub url: String,
    pub size_bytes: u64,
    pub content_type: String,
    pub category: MediaCategory,
    /// Upload time in epoch milliseconds, zero when the store omitted it.
    pub uploaded_at_epoch: i64,
    /// Display-ready size, e.g. `1.50 MB`.
    pub human_size: String,
}

/// Broad classification used for catalog filtering and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaCategory {
    Image,
    Video,
    Audio,
    Document,
    Archive,
    Other,
}

impl MediaCategory {
    /// Parses the lowercase wire form, `None` for anything unknown.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "image" => Some(MediaCategory::Image),
            "video" => Some(MediaCategory::Video),
            "audio" => Some(MediaCategory::Audio),
            "document" => Some(MediaCategory::Document),
            "archive" => Some(MediaCategory::Archive),
            "other" => Some(MediaCategory::Other),
            _ => None,
        }
    }
}
