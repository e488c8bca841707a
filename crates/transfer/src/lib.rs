//! Local-file mechanics for object uploads: content digests and
//! fixed-size part reading.

mod chunked;
mod validation;

pub use chunked::{ChunkReader, Part, sha1_hex};
pub use validation::validate_remote_path;

/// Fixed part size for multi-part uploads: 5 MiB.
///
/// This is the smallest part size the object store accepts for any part
/// other than the last one.
pub const PART_SIZE: usize = 5 * 1024 * 1024;

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid remote path: {0}")]
    InvalidPath(String),
}
