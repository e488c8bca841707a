//! Owner-scoped catalog listing.

use std::path::Path;

use skystow_remote::RemoteObject;
use tracing::debug;

use crate::error::StoreError;
use crate::gateway::ObjectGateway;
use crate::types::{CatalogEntry, MediaCategory};

/// Directories scanned when assembling a user's catalog.
pub(crate) const USER_MEDIA_DIRECTORIES: &[&str] = &["avatars", "attachments", "documents"];

/// Page bounds for one listing call. The floor keeps a category filter
/// from starving when the caller asks for only a handful of entries.
const LIST_PAGE_MIN: u32 = 100;
const LIST_PAGE_LIMIT: u32 = 1000;

/// Collects a user's media across the known directories, newest first,
/// truncated to `max_files`.
pub(crate) async fn list_user_media(
    gateway: &dyn ObjectGateway,
    owner_id: &str,
    category: Option<MediaCategory>,
    max_files: u32,
) -> Result<Vec<CatalogEntry>, StoreError> {
    if owner_id.trim().is_empty() {
        return Err(StoreError::Validation("missing owner id".into()));
    }

    let page_size = max_files.clamp(LIST_PAGE_MIN, LIST_PAGE_LIMIT);
    let mut entries = Vec::new();

    for directory in USER_MEDIA_DIRECTORIES {
        let prefix = format!("{directory}/{owner_id}/");
        let objects = gateway.list_objects(prefix, page_size).await?;

        for object in objects {
            if is_directory_marker(&object) {
                continue;
            }
            let entry_category = classify(&object.file_name, &object.content_type);
            if let Some(wanted) = category
                && entry_category != wanted
            {
                continue;
            }
            let url = gateway.download_url(object.file_name.clone()).await?;
            entries.push(CatalogEntry {
                id: object.file_id,
                name: base_name(&object.file_name).to_string(),
                url,
                size_bytes: object.content_length,
                human_size: format_file_size(object.content_length),
                content_type: object.content_type,
                category: entry_category,
                uploaded_at_epoch: object.upload_timestamp,
                remote_path: object.file_name,
            });
        }
    }

    // Objects the store reported without a timestamp sort last.
    entries.sort_by_key(|entry| std::cmp::Reverse(entry.uploaded_at_epoch));
    entries.truncate(max_files as usize);

    debug!(owner = %owner_id, count = entries.len(), "catalog assembled");
    Ok(entries)
}

/// Zero-length placeholder objects some tools create to fake folders.
fn is_directory_marker(object: &RemoteObject) -> bool {
    object.file_name.ends_with('/')
        || (object.content_length == 0 && object.content_type == "application/x-directory")
}

fn base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Classifies an object by its filename extension, falling back to the
/// stored content type when the extension is unknown.
pub fn classify(file_name: &str, content_type: &str) -> MediaCategory {
    if let Some(by_extension) = category_for_extension(file_name) {
        return by_extension;
    }
    category_for_content_type(content_type)
}

fn category_for_extension(file_name: &str) -> Option<MediaCategory> {
    let ext = Path::new(file_name).extension()?.to_str()?.to_ascii_lowercase();
    let category = match ext.as_str() {
        "jpg" | "jpeg" | "png" | "gif" | "webp" | "bmp" | "svg" | "heic" => MediaCategory::Image,
        "mp4" | "mov" | "avi" | "mkv" | "webm" => MediaCategory::Video,
        "mp3" | "wav" | "ogg" | "m4a" | "flac" => MediaCategory::Audio,
        "pdf" | "doc" | "docx" | "xls" | "xlsx" | "ppt" | "pptx" | "txt" | "md" | "csv"
        | "rtf" | "odt" => MediaCategory::Document,
        "zip" | "rar" | "7z" | "tar" | "gz" => MediaCategory::Archive,
        _ => return None,
    };
    Some(category)
}

fn category_for_content_type(content_type: &str) -> MediaCategory {
    let lower = content_type.to_ascii_lowercase();
    if lower.starts_with("image/") {
        MediaCategory::Image
    } else if lower.starts_with("video/") {
        MediaCategory::Video
    } else if lower.starts_with("audio/") {
        MediaCategory::Audio
    } else if lower.starts_with("text/") || lower == "application/pdf" {
        MediaCategory::Document
    } else if matches!(
        lower.as_str(),
        "application/zip" | "application/gzip" | "application/x-tar" | "application/x-7z-compressed"
    ) {
        MediaCategory::Archive
    } else {
        MediaCategory::Other
    }
}

/// Human-readable size with binary units. Bytes render whole; kilobytes get
/// one decimal under 10; megabytes and up get two decimals under 10 and one
/// above.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    if bytes == 0 {
        return "0 B".to_string();
    }
    // Dividing by 1024 is exact in f64, so unit boundaries land precisely.
    let mut value = bytes as f64;
    let mut exponent = 0;
    while value >= 1024.0 && exponent < UNITS.len() - 1 {
        value /= 1024.0;
        exponent += 1;
    }
    let unit = UNITS[exponent];
    match exponent {
        0 => format!("{value:.0} {unit}"),
        1 if value < 10.0 => format!("{value:.1} {unit}"),
        1 => format!("{value:.0} {unit}"),
        _ if value < 10.0 => format!("{value:.2} {unit}"),
        _ => format!("{value:.1} {unit}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{GatewayCall, MockGateway, stored_object};

    #[test]
    fn formats_sizes_with_unit_scaled_precision() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(950), "950 B");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(15360), "15 KB");
        assert_eq!(format_file_size(1_572_864), "1.50 MB");
        assert_eq!(format_file_size(157_286_400), "150.0 MB");
    }

    #[test]
    fn formats_edge_sizes() {
        assert_eq!(format_file_size(1), "1 B");
        assert_eq!(format_file_size(1023), "1023 B");
        assert_eq!(format_file_size(1024), "1.0 KB");
        assert_eq!(format_file_size(1024 * 1024), "1.00 MB");
        assert_eq!(format_file_size(1024 * 1024 * 1024), "1.00 GB");
        assert_eq!(format_file_size(10 * 1024 * 1024 * 1024), "10.0 GB");
    }

    #[test]
    fn extension_beats_content_type() {
        assert_eq!(classify("a/b/photo.JPG", "application/pdf"), MediaCategory::Image);
        assert_eq!(classify("song.flac", "application/octet-stream"), MediaCategory::Audio);
        assert_eq!(classify("clip.mkv", "text/plain"), MediaCategory::Video);
        assert_eq!(classify("notes.md", "video/mp4"), MediaCategory::Document);
        assert_eq!(classify("bundle.tar", "image/png"), MediaCategory::Archive);
    }

    #[test]
    fn unknown_extension_falls_back_to_content_type() {
        assert_eq!(classify("pic.raw", "image/x-raw"), MediaCategory::Image);
        assert_eq!(classify("movie.bin", "video/x-matroska"), MediaCategory::Video);
        assert_eq!(classify("track", "audio/aac"), MediaCategory::Audio);
        assert_eq!(classify("paper.tex", "text/x-tex"), MediaCategory::Document);
        assert_eq!(classify("scan", "application/pdf"), MediaCategory::Document);
        assert_eq!(classify("blob.dat", "application/octet-stream"), MediaCategory::Other);
    }

    #[tokio::test]
    async fn lists_across_directories_scoped_to_owner() {
        let gateway = MockGateway::new();
        gateway.script_list(Ok(vec![stored_object(
            "id-1",
            "avatars/u1/100_aa.png",
            "image/png",
            2048,
            300,
        )]));
        gateway.script_list(Ok(vec![stored_object(
            "id-2",
            "attachments/u1/100_bb.mp4",
            "video/mp4",
            4096,
            100,
        )]));
        gateway.script_list(Ok(vec![stored_object(
            "id-3",
            "documents/u1/100_cc.pdf",
            "application/pdf",
            1024,
            200,
        )]));

        let entries = list_user_media(&gateway, "u1", None, 10).await.unwrap();

        let prefixes: Vec<String> = gateway
            .recorded()
            .into_iter()
            .filter_map(|call| match call {
                GatewayCall::ListObjects { prefix, .. } => Some(prefix),
                _ => None,
            })
            .collect();
        assert_eq!(
            prefixes,
            vec![
                "avatars/u1/".to_string(),
                "attachments/u1/".to_string(),
                "documents/u1/".to_string(),
            ]
        );

        // Newest first across all directories.
        let ids: Vec<&str> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["id-1", "id-3", "id-2"]);
        assert_eq!(entries[0].name, "100_aa.png");
        assert_eq!(entries[0].remote_path, "avatars/u1/100_aa.png");
        assert_eq!(entries[0].human_size, "2.0 KB");
        assert_eq!(entries[0].category, MediaCategory::Image);
        assert!(entries[0].url.ends_with("/avatars/u1/100_aa.png"), "got {}", entries[0].url);
    }

    #[tokio::test]
    async fn skips_directory_markers() {
        let gateway = MockGateway::new();
        gateway.script_list(Ok(vec![
            stored_object("id-m1", "avatars/u1/", "application/x-directory", 0, 0),
            stored_object("id-m2", "avatars/u1/thumbs", "application/x-directory", 0, 0),
            stored_object("id-1", "avatars/u1/100_aa.png", "image/png", 10, 1),
        ]));

        let entries = list_user_media(&gateway, "u1", None, 10).await.unwrap();

        let ids: Vec<&str> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["id-1"]);
    }

    #[tokio::test]
    async fn filters_by_category() {
        let gateway = MockGateway::new();
        gateway.script_list(Ok(vec![
            stored_object("id-1", "avatars/u1/a.png", "image/png", 10, 3),
            stored_object("id-2", "avatars/u1/b.mp4", "video/mp4", 10, 2),
        ]));
        gateway.script_list(Ok(vec![stored_object(
            "id-3",
            "attachments/u1/c.png",
            "image/png",
            10,
            1,
        )]));

        let entries = list_user_media(&gateway, "u1", Some(MediaCategory::Image), 10)
            .await
            .unwrap();

        let ids: Vec<&str> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["id-1", "id-3"]);
    }

    #[tokio::test]
    async fn truncates_to_max_files() {
        let gateway = MockGateway::new();
        gateway.script_list(Ok(vec![
            stored_object("id-1", "avatars/u1/a.png", "image/png", 10, 5),
            stored_object("id-2", "avatars/u1/b.png", "image/png", 10, 4),
            stored_object("id-3", "avatars/u1/c.png", "image/png", 10, 3),
        ]));

        let entries = list_user_media(&gateway, "u1", None, 2).await.unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, "id-1");
        assert_eq!(entries[1].id, "id-2");

        // Small requests still list a padded page so filters have slack.
        for call in gateway.recorded() {
            if let GatewayCall::ListObjects { max_count, .. } = call {
                assert_eq!(max_count, 100);
            }
        }
    }

    #[tokio::test]
    async fn missing_timestamps_sort_last() {
        let gateway = MockGateway::new();
        gateway.script_list(Ok(vec![
            stored_object("id-untimed", "avatars/u1/old.png", "image/png", 10, 0),
            stored_object("id-new", "avatars/u1/new.png", "image/png", 10, 999),
        ]));

        let entries = list_user_media(&gateway, "u1", None, 10).await.unwrap();

        let ids: Vec<&str> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["id-new", "id-untimed"]);
    }

    #[tokio::test]
    async fn rejects_blank_owner() {
        let gateway = MockGateway::new();
        let err = list_user_media(&gateway, "  ", None, 10).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)), "got {err:?}");
        assert!(gateway.recorded().is_empty());
    }

    #[tokio::test]
    async fn listing_failure_surfaces() {
        let gateway = MockGateway::new();
        gateway.script_list(Err(crate::testutil::service_unavailable()));

        let err = list_user_media(&gateway, "u1", None, 10).await.unwrap_err();
        assert!(matches!(err, StoreError::Remote(_)), "got {err:?}");
    }
}
