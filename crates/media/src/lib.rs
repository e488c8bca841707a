//! Remote media storage engine.
//!
//! Validates user files, ships them to the remote object store over a
//! single-shot or multi-part path picked by size, replaces old objects only
//! after the new one is durable, and lists a user's stored media newest
//! first.
//!
//! All network access goes through the [`ObjectGateway`] trait so the
//! transfer flows stay testable; embedding code normally calls
//! [`MediaStore::new`], which wires the trait to the REST client.

mod catalog;
mod chunked;
mod error;
mod gateway;
mod replace;
mod simple;
mod store;
mod types;
mod upload;

#[cfg(test)]
mod testutil;

pub use catalog::{classify, format_file_size};
pub use error::StoreError;
pub use gateway::{GatewayFuture, ObjectGateway};
pub use store::MediaStore;
pub use types::{CatalogEntry, MediaCategory, MediaFile, UploadResult};
pub use upload::{ALLOWED_CONTENT_TYPES, MAX_OBJECT_BYTES, SIMPLE_LIMIT_BYTES};
