//! Object listing, transfers and removal

use std::time::Duration;

use bytes::Bytes;
use ferry_core::domain::storage::{ObjectInfo, base_name};
use ferry_core::dto::object::DownloadRequest;
use futures::StreamExt;
use futures::future::{join_all, try_join_all};
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, warn};

use crate::archive::{self, Archive};
use crate::error::{ClientError, Result, StorageError};
use crate::storage::PresignMethod;
use crate::{ConsoleClient, require};

/// Expiry of preview links
pub const PREVIEW_EXPIRY: Duration = Duration::from_secs(30_000);
/// Expiry of the link fetched for a single-file download
pub const SINGLE_DOWNLOAD_EXPIRY: Duration = Duration::from_secs(1_500);
/// Expiry of each link fetched for a multi-file download
pub const BATCH_DOWNLOAD_EXPIRY: Duration = Duration::from_secs(30_000);
/// Expiry of upload links
pub const UPLOAD_EXPIRY: Duration = Duration::from_secs(24 * 60 * 60);

/// Folder that multi-file downloads are packed under
pub const ARCHIVE_FOLDER: &str = "collection";

/// Result of listing a bucket
///
/// Listing keeps going after an error; the files seen so far are kept and
/// the first error is recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectListing {
    pub files: Vec<ObjectInfo>,
    pub error: Option<StorageError>,
}

impl ObjectListing {
    /// The files, or the recorded error if there was one
    pub fn into_result(self) -> std::result::Result<Vec<ObjectInfo>, StorageError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.files),
        }
    }
}

/// One object fetched through a presigned URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    pub key: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl DownloadedFile {
    /// File name to save the object under
    pub fn file_name(&self) -> &str {
        base_name(&self.key)
    }
}

/// What a download produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Download {
    /// A single selected object
    File(DownloadedFile),
    /// Several selected objects packed into one zip
    Archive(Archive),
}

impl Download {
    /// Suggested name for saving the result
    pub fn file_name(&self) -> &str {
        match self {
            Download::File(file) => file.file_name(),
            Download::Archive(archive) => &archive.file_name,
        }
    }

    pub fn bytes(&self) -> &Bytes {
        match self {
            Download::File(file) => &file.bytes,
            Download::Archive(archive) => &archive.bytes,
        }
    }
}

/// An object to upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub bucket_name: String,
    /// Object key, including any folder prefix
    pub file_name: String,
    pub body: Bytes,
    pub content_type: Option<String>,
}

impl UploadRequest {
    pub fn new(
        bucket_name: impl Into<String>,
        file_name: impl Into<String>,
        body: impl Into<Bytes>,
    ) -> Self {
        Self {
            bucket_name: bucket_name.into(),
            file_name: file_name.into(),
            body: body.into(),
            content_type: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Outcome of removing one object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalOutcome {
    pub key: String,
    pub result: std::result::Result<(), StorageError>,
}

/// Outcomes of a multi-object removal, one per requested key
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemovalReport {
    pub outcomes: Vec<RemovalOutcome>,
}

impl RemovalReport {
    pub fn removed(&self) -> impl Iterator<Item = &str> {
        self.outcomes
            .iter()
            .filter(|o| o.result.is_ok())
            .map(|o| o.key.as_str())
    }

    pub fn failed(&self) -> impl Iterator<Item = &RemovalOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }

    /// True when every key was removed
    pub fn is_complete(&self) -> bool {
        self.failed().next().is_none()
    }
}

impl ConsoleClient {
    // =============================================================================
    // Objects
    // =============================================================================

    /// List every object under `prefix` in a bucket
    ///
    /// An empty bucket yields no files and no error.
    pub async fn list_objects(&self, bucket: &str, prefix: &str) -> ObjectListing {
        let mut listing = ObjectListing::default();
        let mut stream = self.storage.list_objects(bucket, prefix);

        while let Some(item) = stream.next().await {
            match item {
                Ok(object) => listing.files.push(object),
                Err(err) => {
                    warn!("Listing {}/{} failed: {}", bucket, prefix, err);
                    listing.error.get_or_insert(err);
                }
            }
        }

        debug!("Listed {} objects in {}/{}", listing.files.len(), bucket, prefix);
        listing
    }

    /// Get a presigned link for viewing an object
    pub async fn preview_url(&self, bucket: &str, key: &str) -> Result<String> {
        require("bucket name", bucket)?;
        require("object key", key)?;
        let url = self
            .storage
            .presign(PresignMethod::Get, bucket, key, PREVIEW_EXPIRY)
            .await?;
        Ok(url)
    }

    /// Download the selected objects
    ///
    /// One key returns the object itself. Several keys are fetched
    /// concurrently and returned as one zip archive once every fetch has
    /// completed.
    pub async fn download(&self, req: &DownloadRequest) -> Result<Download> {
        let bucket = req.bucket_name.as_str();
        require("bucket name", bucket)?;

        match req.file_names.as_slice() {
            [] => Err(ClientError::InvalidRequest(
                "no objects selected for download".to_string(),
            )),
            [key] => {
                let url = self
                    .storage
                    .presign(PresignMethod::Get, bucket, key, SINGLE_DOWNLOAD_EXPIRY)
                    .await?;
                let file = self.fetch(&url, key).await?;
                Ok(Download::File(file))
            }
            keys => {
                let fetches = keys.iter().map(|key| async move {
                    let url = self
                        .storage
                        .presign(PresignMethod::Get, bucket, key, BATCH_DOWNLOAD_EXPIRY)
                        .await?;
                    let file = self.fetch(&url, key).await?;
                    Ok::<DownloadedFile, ClientError>(file)
                });
                let files = try_join_all(fetches).await?;

                let archive = archive::pack(ARCHIVE_FOLDER, &files)?;
                debug!("Packed {} objects from {} into {}", files.len(), bucket, archive.file_name);
                Ok(Download::Archive(archive))
            }
        }
    }

    async fn fetch(&self, url: &str, key: &str) -> Result<DownloadedFile> {
        let response = self.transfer.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(
                status.as_u16(),
                format!("download of '{}' failed: {}", key, error_text),
            ));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?;

        Ok(DownloadedFile {
            key: key.to_string(),
            content_type,
            bytes,
        })
    }

    /// Upload an object through a presigned PUT link
    pub async fn upload(&self, req: &UploadRequest) -> Result<()> {
        require("bucket name", &req.bucket_name)?;
        require("object key", &req.file_name)?;

        let url = self
            .storage
            .presign(PresignMethod::Put, &req.bucket_name, &req.file_name, UPLOAD_EXPIRY)
            .await?;

        let mut request = self.transfer.put(url).body(req.body.clone());
        if let Some(content_type) = &req.content_type {
            request = request.header(CONTENT_TYPE, content_type);
        }
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(
                status.as_u16(),
                format!("upload of '{}' failed: {}", req.file_name, error_text),
            ));
        }

        debug!("Uploaded {} bytes to {}/{}", req.body.len(), req.bucket_name, req.file_name);
        Ok(())
    }

    /// Remove objects from a bucket
    ///
    /// Removals run concurrently. The report holds exactly one outcome per
    /// key, in the order the keys were given.
    pub async fn remove_objects(&self, bucket: &str, keys: &[String]) -> Result<RemovalReport> {
        require("bucket name", bucket)?;

        let removals = keys.iter().map(|key| async move {
            let result = self.storage.remove_object(bucket, key).await;
            if let Err(err) = &result {
                warn!("Removing {}/{} failed: {}", bucket, key, err);
            }
            RemovalOutcome {
                key: key.clone(),
                result,
            }
        });
        let outcomes = join_all(removals).await;

        Ok(RemovalReport { outcomes })
    }
}
