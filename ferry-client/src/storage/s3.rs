//! S3 backend built on aws-sdk-s3

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::types::{Delete, ObjectIdentifier};
use chrono::{DateTime, Utc};
use ferry_core::domain::storage::{Bucket, ObjectInfo};
use ferry_core::state::StorageCredentials;
use futures::StreamExt;
use futures::stream;
use tracing::debug;

use super::{ObjectRemovalError, ObjectStorage, ObjectStream, PresignMethod};
use crate::config::ClientConfig;
use crate::error::StorageError;

mod tls;

/// Largest batch a single DeleteObjects request accepts
const DELETE_BATCH_SIZE: usize = 1000;

const CREDENTIALS_PROVIDER: &str = "ferry-static";

/// Object store reached through the S3 API
#[derive(Debug, Clone)]
pub struct S3Storage {
    client: Client,
    verifies_tls: bool,
}

impl S3Storage {
    /// Creates a backend for an S3-compatible endpoint
    ///
    /// Requests use path-style addressing and the static access/secret key
    /// pair from `credentials`. When `config.insecure_skip_tls_verify` is set
    /// the SDK talks to the endpoint through a connector that accepts any
    /// server certificate.
    pub fn new(credentials: &StorageCredentials, config: &ClientConfig) -> Result<Self, StorageError> {
        let static_credentials = Credentials::new(
            credentials.access_key.clone(),
            credentials.secret_key.clone(),
            None,
            None,
            CREDENTIALS_PROVIDER,
        );

        let mut builder = aws_sdk_s3::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .endpoint_url(credentials.endpoint_url())
            .credentials_provider(static_credentials)
            .force_path_style(true);

        let insecure = config.insecure_skip_tls_verify;
        if insecure {
            builder = builder.http_client(tls::insecure_http_client()?);
        }

        Ok(Self {
            client: Client::from_conf(builder.build()),
            verifies_tls: !insecure,
        })
    }

    /// Wraps a pre-built SDK client, e.g. one with a custom TLS setup
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            verifies_tls: true,
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// False when the backend was built to accept any server certificate
    pub fn verifies_tls(&self) -> bool {
        self.verifies_tls
    }
}

fn sdk_error<E, R>(operation: &'static str, err: SdkError<E, R>) -> StorageError
where
    E: std::error::Error + 'static,
    R: std::fmt::Debug,
{
    StorageError::backend(operation, DisplayErrorContext(&err).to_string())
}

fn to_chrono(time: &aws_sdk_s3::primitives::DateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(time.secs(), time.subsec_nanos())
}

fn object_info(object: &aws_sdk_s3::types::Object) -> ObjectInfo {
    ObjectInfo {
        name: object.key().unwrap_or_default().to_string(),
        size: object.size().and_then(|s| u64::try_from(s).ok()).unwrap_or(0),
        last_modified: object.last_modified().and_then(to_chrono),
        etag: object.e_tag().map(|tag| tag.trim_matches('"').to_string()),
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    async fn list_buckets(&self) -> Result<Vec<Bucket>, StorageError> {
        let output = self
            .client
            .list_buckets()
            .send()
            .await
            .map_err(|e| sdk_error("ListBuckets", e))?;

        Ok(output
            .buckets()
            .iter()
            .map(|bucket| Bucket {
                name: bucket.name().unwrap_or_default().to_string(),
                creation_date: bucket.creation_date().and_then(to_chrono),
            })
            .collect())
    }

    async fn make_bucket(&self, name: &str) -> Result<(), StorageError> {
        self.client
            .create_bucket()
            .bucket(name)
            .send()
            .await
            .map_err(|e| sdk_error("CreateBucket", e))?;
        Ok(())
    }

    async fn bucket_exists(&self, name: &str) -> Result<bool, StorageError> {
        match self.client.head_bucket().bucket(name).send().await {
            Ok(_) => Ok(true),
            Err(err) if err.as_service_error().is_some_and(|e| e.is_not_found()) => Ok(false),
            Err(err) => Err(sdk_error("HeadBucket", err)),
        }
    }

    fn list_objects<'a>(&'a self, bucket: &'a str, prefix: &'a str) -> ObjectStream<'a> {
        // State: None once the last page was read, Some(token) otherwise
        stream::unfold(Some(None::<String>), move |state| async move {
            let token = state?;
            let mut request = self.client.list_objects_v2().bucket(bucket).prefix(prefix);
            if let Some(token) = token {
                request = request.continuation_token(token);
            }

            match request.send().await {
                Ok(page) => {
                    let next = if page.is_truncated().unwrap_or(false) {
                        page.next_continuation_token().map(|t| Some(t.to_string()))
                    } else {
                        None
                    };
                    debug!("Listed {} objects in {}/{}", page.contents().len(), bucket, prefix);
                    let items: Vec<_> = page.contents().iter().map(|o| Ok(object_info(o))).collect();
                    Some((stream::iter(items), next))
                }
                Err(err) => {
                    let items = vec![Err(sdk_error("ListObjectsV2", err))];
                    Some((stream::iter(items), None))
                }
            }
        })
        .flatten()
        .boxed()
    }

    async fn presign(
        &self,
        method: PresignMethod,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> Result<String, StorageError> {
        let config =
            PresigningConfig::expires_in(expires_in).map_err(|e| StorageError::Presign(e.to_string()))?;

        let request = match method {
            PresignMethod::Get => self
                .client
                .get_object()
                .bucket(bucket)
                .key(key)
                .presigned(config)
                .await
                .map_err(|e| sdk_error("PresignGetObject", e))?,
            PresignMethod::Put => self
                .client
                .put_object()
                .bucket(bucket)
                .key(key)
                .presigned(config)
                .await
                .map_err(|e| sdk_error("PresignPutObject", e))?,
        };

        Ok(request.uri().to_string())
    }

    async fn remove_object(&self, bucket: &str, key: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| sdk_error("DeleteObject", e))?;
        Ok(())
    }

    async fn remove_objects(
        &self,
        bucket: &str,
        keys: &[String],
    ) -> Result<Vec<ObjectRemovalError>, StorageError> {
        let mut failures = Vec::new();

        for chunk in keys.chunks(DELETE_BATCH_SIZE) {
            let objects = chunk
                .iter()
                .map(|key| ObjectIdentifier::builder().key(key).build())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| StorageError::backend("DeleteObjects", e.to_string()))?;
            let delete = Delete::builder()
                .set_objects(Some(objects))
                .quiet(true)
                .build()
                .map_err(|e| StorageError::backend("DeleteObjects", e.to_string()))?;

            let output = self
                .client
                .delete_objects()
                .bucket(bucket)
                .delete(delete)
                .send()
                .await
                .map_err(|e| sdk_error("DeleteObjects", e))?;

            failures.extend(output.errors().iter().map(|e| ObjectRemovalError {
                key: e.key().unwrap_or_default().to_string(),
                message: e.message().or(e.code()).unwrap_or("unknown error").to_string(),
            }));
        }

        Ok(failures)
    }

    async fn remove_bucket(&self, name: &str) -> Result<(), StorageError> {
        self.client
            .delete_bucket()
            .bucket(name)
            .send()
            .await
            .map_err(|e| sdk_error("DeleteBucket", e))?;
        Ok(())
    }
}
