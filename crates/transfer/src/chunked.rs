use std::io::Read;
use std::path::Path;

use sha1::{Digest, Sha1};

use crate::{PART_SIZE, TransferError};

// ---------------------------------------------------------------------------
// Digest helpers
// ---------------------------------------------------------------------------

/// Computes SHA-1 of `data` and returns the hex-encoded digest.
///
/// The object store verifies this digest server-side for whole objects and
/// for individual parts, so the same helper serves both paths.
pub fn sha1_hex(data: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

// ---------------------------------------------------------------------------
// ChunkReader
// ---------------------------------------------------------------------------

/// One part of a multi-part upload.
///
/// Part numbers are 1-based and strictly increasing; the store assembles the
/// final object in part-number order.
#[derive(Debug, Clone)]
pub struct Part {
    pub number: u32,
    pub offset: u64,
    pub data: Vec<u8>,
    pub sha1: String,
}

/// Reads a file in fixed-size parts with automatic SHA-1 digests.
///
/// The file handle is held for the lifetime of the reader and released on
/// drop, whichever way the surrounding upload exits.
pub struct ChunkReader {
    file: std::fs::File,
    part_size: usize,
    offset: u64,
    file_size: u64,
    next_number: u32,
}

impl ChunkReader {
    /// Opens `path` for part-wise reading.
    ///
    /// If `part_size` is 0, [`PART_SIZE`] is used.
    pub fn open(path: &Path, part_size: usize) -> Result<Self, TransferError> {
        let file = std::fs::File::open(path)?;
        let file_size = file.metadata()?.len();
        let part_size = if part_size == 0 { PART_SIZE } else { part_size };
        Ok(Self {
            file,
            part_size,
            offset: 0,
            file_size,
            next_number: 1,
        })
    }

    /// Reads the next part. Returns `None` once the file is exhausted.
    pub fn next_part(&mut self) -> Result<Option<Part>, TransferError> {
        let remaining = self.file_size.saturating_sub(self.offset);
        if remaining == 0 {
            return Ok(None);
        }

        let read_size = std::cmp::min(remaining as usize, self.part_size);
        let mut buf = vec![0u8; read_size];
        self.file.read_exact(&mut buf)?;

        let part = Part {
            number: self.next_number,
            offset: self.offset,
            sha1: sha1_hex(&buf),
            data: buf,
        };
        self.offset += read_size as u64;
        self.next_number += 1;
        Ok(Some(part))
    }

    /// Total file size in bytes.
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Bytes remaining to read.
    pub fn remaining(&self) -> u64 {
        self.file_size.saturating_sub(self.offset)
    }

    /// Number of parts this file will produce.
    pub fn part_count(&self) -> u32 {
        self.file_size.div_ceil(self.part_size as u64) as u32
    }
}
