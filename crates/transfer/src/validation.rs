use crate::TransferError;

/// Validates a remote object path before it is sent to the store.
///
/// Remote paths are forward-slash keys, not OS paths. Rejects:
/// - Empty paths
/// - Leading slashes (keys are always relative)
/// - Backslashes (never valid in a key)
/// - Empty segments (`a//b`)
/// - `.` and `..` segments
pub fn validate_remote_path(path: &str) -> Result<(), TransferError> {
    if path.is_empty() {
        return Err(TransferError::InvalidPath("empty path".into()));
    }

    if path.starts_with('/') {
        return Err(TransferError::InvalidPath(format!(
            "leading slash not allowed: {path}"
        )));
    }

    if path.contains('\\') {
        return Err(TransferError::InvalidPath(format!(
            "backslash not allowed: {path}"
        )));
    }

    for segment in path.split('/') {
        match segment {
            "" => {
                return Err(TransferError::InvalidPath(format!(
                    "empty segment: {path}"
                )));
            }
            "." | ".." => {
                return Err(TransferError::InvalidPath(format!(
                    "relative segment not allowed: {path}"
                )));
            }
            _ => {}
        }
    }

    Ok(())
}
