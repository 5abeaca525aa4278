//! Object storage backends
//!
//! Submodules:
//! - `s3`: AWS S3 and S3-compatible services (MinIO, RustFS, ...)
//! - `localfs`: a local directory standing in for a bucket, used by tests and
//!   by the CLI to read and write policy files on disk
//!
//! A backend only moves whole objects. Missing objects are reported as an
//! `std::io::Error` of kind `NotFound` so callers can tell them apart.

use std::pin::Pin;

use async_trait::async_trait;
use tokio::io::AsyncBufRead;

use crate::error::BoxError;

pub mod localfs;
pub mod s3;

/// Buffered body of a fetched object, consumed one line at a time.
pub type ObjectReader = Pin<Box<dyn AsyncBufRead + Send>>;

#[async_trait]
pub trait ObjectBackend: Send + Sync {
    /// Replaces the object at `key` with `data`.
    async fn put_object(&self, key: &str, data: Vec<u8>) -> Result<(), BoxError>;

    /// Opens the object at `key` for streaming reads.
    async fn get_object(&self, key: &str) -> Result<ObjectReader, BoxError>;
}
