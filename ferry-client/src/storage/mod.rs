//! Object storage abstraction
//!
//! The facade talks to the object store only through [`ObjectStorage`], so
//! tests can substitute an in-memory backend for the S3 one.

mod s3;

use std::time::Duration;

use async_trait::async_trait;
use ferry_core::domain::storage::{Bucket, ObjectInfo};
use futures::stream::BoxStream;

use crate::error::StorageError;

pub use s3::S3Storage;

/// Stream of listed objects; an error item does not end the stream
pub type ObjectStream<'a> = BoxStream<'a, Result<ObjectInfo, StorageError>>;

/// HTTP method a presigned URL is issued for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresignMethod {
    Get,
    Put,
}

/// A key that a batch removal could not delete
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRemovalError {
    pub key: String,
    pub message: String,
}

/// Operations the facade needs from an object store
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn list_buckets(&self) -> Result<Vec<Bucket>, StorageError>;

    async fn make_bucket(&self, name: &str) -> Result<(), StorageError>;

    async fn bucket_exists(&self, name: &str) -> Result<bool, StorageError>;

    /// Lists every object under `prefix`, recursively
    fn list_objects<'a>(&'a self, bucket: &'a str, prefix: &'a str) -> ObjectStream<'a>;

    /// Issues a presigned URL for one object
    async fn presign(
        &self,
        method: PresignMethod,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> Result<String, StorageError>;

    async fn remove_object(&self, bucket: &str, key: &str) -> Result<(), StorageError>;

    /// Removes many objects, returning the keys that could not be removed
    async fn remove_objects(
        &self,
        bucket: &str,
        keys: &[String],
    ) -> Result<Vec<ObjectRemovalError>, StorageError>;

    /// Removes an empty bucket
    async fn remove_bucket(&self, name: &str) -> Result<(), StorageError>;
}
