//! Bucket operations

use ferry_core::domain::storage::Bucket;
use tracing::{debug, info};

use crate::error::{ClientError, RemovalStage, Result, StorageError};
use crate::{ConsoleClient, require};

impl ConsoleClient {
    // =============================================================================
    // Buckets
    // =============================================================================

    /// List all buckets visible to the storage credentials
    pub async fn list_buckets(&self) -> Result<Vec<Bucket>> {
        let buckets = self.storage.list_buckets().await?;
        debug!("Listed {} buckets", buckets.len());
        Ok(buckets)
    }

    /// Create a bucket
    pub async fn create_bucket(&self, name: &str) -> Result<()> {
        require("bucket name", name)?;
        self.storage.make_bucket(name).await?;
        info!("Created bucket {}", name);
        Ok(())
    }

    /// Check whether a bucket exists
    pub async fn bucket_exists(&self, name: &str) -> Result<bool> {
        require("bucket name", name)?;
        Ok(self.storage.bucket_exists(name).await?)
    }

    /// Remove a bucket together with every object in it
    ///
    /// Runs in three stages: list the objects, remove them, remove the
    /// bucket. The first failing stage aborts the removal and is named in
    /// [`ClientError::BucketRemoval`].
    pub async fn remove_bucket(&self, name: &str) -> Result<()> {
        require("bucket name", name)?;
        let failed = |stage: RemovalStage, source: StorageError| ClientError::BucketRemoval {
            bucket: name.to_string(),
            stage,
            source,
        };

        let listing = self.list_objects(name, "").await;
        if let Some(source) = listing.error {
            return Err(failed(RemovalStage::Listing, source));
        }

        let keys: Vec<String> = listing.files.into_iter().map(|o| o.name).collect();
        if !keys.is_empty() {
            let failures = self
                .storage
                .remove_objects(name, &keys)
                .await
                .map_err(|e| failed(RemovalStage::ObjectRemoval, e))?;

            if let Some(first) = failures.first() {
                return Err(failed(
                    RemovalStage::ObjectRemoval,
                    StorageError::PartialRemoval {
                        failed: failures.len(),
                        key: first.key.clone(),
                        message: first.message.clone(),
                    },
                ));
            }
            debug!("Removed {} objects from {}", keys.len(), name);
        }

        self.storage
            .remove_bucket(name)
            .await
            .map_err(|e| failed(RemovalStage::BucketDeletion, e))?;

        info!("Removed bucket {}", name);
        Ok(())
    }
}
