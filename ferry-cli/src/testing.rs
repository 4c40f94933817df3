//! In-process deployment for command tests
//!
//! An axum control plane answering `/system/info` and a presigned-URL file
//! server, plus an in-memory object store wired into sessions through the
//! client factory.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, put};
use axum::{Json, Router};
use ferry_client::storage::{ObjectRemovalError, ObjectStream};
use ferry_client::{ClientConfig, ConsoleClient, ObjectStorage, PresignMethod, StorageError};
use ferry_core::domain::job::{JobInfo, JobList};
use ferry_core::domain::storage::{Bucket, ObjectInfo};
use ferry_core::domain::system::SystemInfo;
use ferry_core::events::{Event, EventName};
use ferry_core::state::{AUTHENTICATED_FLAG, MemoryStore, keys};
use futures::StreamExt;
use futures::stream;

use crate::config::Config;
use crate::session::Session;
use crate::shell::Terminal;

/// Authorization header for admin:secret
const ADMIN_AUTH: &str = "Basic YWRtaW46c2VjcmV0";

type Buckets = Arc<Mutex<BTreeMap<String, BTreeMap<String, Bytes>>>>;

#[derive(Clone, Default)]
struct StubState {
    buckets: Buckets,
    deleted_jobs: Arc<Mutex<Vec<String>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap()
}

/// A running control plane and object store
pub struct Deployment {
    pub url: String,
    pub storage: Arc<MemoryStorage>,
    deleted_jobs: Arc<Mutex<Vec<String>>>,
}

impl Deployment {
    pub async fn spawn() -> Self {
        let state = StubState::default();
        let app = Router::new()
            .route("/system/info", get(info))
            .route("/system/logs/{service}", get(list_jobs).delete(clear_jobs))
            .route("/system/logs/{service}/{job}", delete(delete_job))
            .route("/files/{bucket}/{*key}", put(put_file))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let storage = Arc::new(MemoryStorage {
            files_url: format!("{}/files", url),
            buckets: state.buckets,
        });
        Self {
            url,
            storage,
            deleted_jobs: state.deleted_jobs,
        }
    }

    /// Job deletions the control plane accepted, as `service/job` or
    /// `service?all=bool`
    pub fn deleted_jobs(&self) -> Vec<String> {
        lock(&self.deleted_jobs).clone()
    }

    /// A session whose facades talk to this deployment
    pub fn session(&self, store: MemoryStore) -> Session {
        let config = Config::new(ClientConfig::new(&self.url), Some(PathBuf::from("unused.json"))).unwrap();
        let storage = self.storage.clone();
        Session::with_store(config, Box::new(store), Terminal::default()).with_client_factory(
            move |config: &ClientConfig, credentials| {
                let storage: Arc<dyn ObjectStorage> = storage.clone();
                Ok(ConsoleClient::with_parts(
                    &config.api_url,
                    config.http_client()?,
                    &credentials.user,
                    &credentials.password,
                    storage,
                ))
            },
        )
    }

    /// A session already logged in as admin
    pub fn logged_in_session(&self) -> Session {
        let store = MemoryStore::from_iter([
            (keys::USER, "admin"),
            (keys::PASSWORD, "secret"),
            (keys::ENDPOINT, "127.0.0.1"),
            (keys::PORT, "9000"),
            (keys::USE_SSL, "false"),
            (keys::ACCESS_KEY, "minio"),
            (keys::SECRET_KEY, "minio123"),
            (keys::AUTHENTICATED, AUTHENTICATED_FLAG),
        ]);
        self.session(store)
    }
}

/// Records every event of the given names published on the session
pub fn record(session: &mut Session, names: &[EventName]) -> Arc<Mutex<Vec<Event>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    for &name in names {
        let seen = seen.clone();
        session.bus.subscribe(name, move |_: &mut Terminal, event: &Event| {
            lock(&seen).push(event.clone());
            Ok(())
        });
    }
    seen
}

async fn info(headers: HeaderMap) -> Response {
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == ADMIN_AUTH);
    if !authorized {
        return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
    }

    Json(SystemInfo {
        version: "v3.0.0".to_string(),
        arch: "amd64".to_string(),
        kube_version: "v1.30.0".to_string(),
        serverless_backend: None,
    })
    .into_response()
}

async fn list_jobs(Path(service): Path<String>) -> Json<JobList> {
    let job = JobInfo {
        status: "Succeeded".to_string(),
        creation_time: None,
        start_time: None,
        finish_time: None,
    };
    Json(JobList {
        jobs: BTreeMap::from([(format!("{}-abc12", service), job)]),
        next_page: String::new(),
        remaining: None,
    })
}

async fn clear_jobs(
    State(state): State<StubState>,
    Path(service): Path<String>,
    Query(query): Query<BTreeMap<String, String>>,
) -> StatusCode {
    let all = query.get("all").map(String::as_str).unwrap_or("false");
    lock(&state.deleted_jobs).push(format!("{}?all={}", service, all));
    StatusCode::NO_CONTENT
}

async fn delete_job(
    State(state): State<StubState>,
    Path((service, job)): Path<(String, String)>,
) -> Response {
    if job == "ghost" {
        return (StatusCode::NOT_FOUND, "job not found").into_response();
    }
    lock(&state.deleted_jobs).push(format!("{}/{}", service, job));
    StatusCode::NO_CONTENT.into_response()
}

async fn put_file(
    State(state): State<StubState>,
    Path((bucket, key)): Path<(String, String)>,
    body: Bytes,
) -> Response {
    match lock(&state.buckets).get_mut(&bucket) {
        Some(objects) => {
            objects.insert(key, body);
            StatusCode::OK.into_response()
        }
        None => (StatusCode::NOT_FOUND, "NoSuchBucket").into_response(),
    }
}

/// In-memory object store sharing its contents with the file server
pub struct MemoryStorage {
    files_url: String,
    buckets: Buckets,
}

impl MemoryStorage {
    pub fn add_bucket(&self, name: &str) {
        lock(&self.buckets).entry(name.to_string()).or_default();
    }

    pub fn put(&self, bucket: &str, key: &str, body: &'static str) {
        lock(&self.buckets)
            .entry(bucket.to_string())
            .or_default()
            .insert(key.to_string(), Bytes::from_static(body.as_bytes()));
    }

    pub fn get(&self, bucket: &str, key: &str) -> Option<Bytes> {
        lock(&self.buckets).get(bucket)?.get(key).cloned()
    }

    pub fn has_bucket(&self, name: &str) -> bool {
        lock(&self.buckets).contains_key(name)
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    async fn list_buckets(&self) -> Result<Vec<Bucket>, StorageError> {
        Ok(lock(&self.buckets)
            .keys()
            .map(|name| Bucket {
                name: name.clone(),
                creation_date: None,
            })
            .collect())
    }

    async fn make_bucket(&self, name: &str) -> Result<(), StorageError> {
        self.add_bucket(name);
        Ok(())
    }

    async fn bucket_exists(&self, name: &str) -> Result<bool, StorageError> {
        Ok(self.has_bucket(name))
    }

    fn list_objects<'a>(&'a self, bucket: &'a str, prefix: &'a str) -> ObjectStream<'a> {
        let items: Vec<Result<ObjectInfo, StorageError>> = match lock(&self.buckets).get(bucket) {
            Some(objects) => objects
                .iter()
                .filter(|(key, _)| key.starts_with(prefix))
                .map(|(key, body)| {
                    Ok(ObjectInfo {
                        name: key.clone(),
                        size: body.len() as u64,
                        last_modified: None,
                        etag: None,
                    })
                })
                .collect(),
            None => vec![Err(StorageError::NoSuchBucket(bucket.to_string()))],
        };
        stream::iter(items).boxed()
    }

    async fn presign(
        &self,
        _method: PresignMethod,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> Result<String, StorageError> {
        Ok(format!(
            "{}/{}/{}?X-Amz-Expires={}",
            self.files_url,
            bucket,
            key,
            expires_in.as_secs()
        ))
    }

    async fn remove_object(&self, bucket: &str, key: &str) -> Result<(), StorageError> {
        if let Some(objects) = lock(&self.buckets).get_mut(bucket) {
            objects.remove(key);
        }
        Ok(())
    }

    async fn remove_objects(
        &self,
        bucket: &str,
        keys: &[String],
    ) -> Result<Vec<ObjectRemovalError>, StorageError> {
        let mut buckets = lock(&self.buckets);
        let objects = buckets
            .get_mut(bucket)
            .ok_or_else(|| StorageError::NoSuchBucket(bucket.to_string()))?;
        for key in keys {
            objects.remove(key);
        }
        Ok(Vec::new())
    }

    async fn remove_bucket(&self, name: &str) -> Result<(), StorageError> {
        match lock(&self.buckets).remove(name) {
            Some(_) => Ok(()),
            None => Err(StorageError::NoSuchBucket(name.to_string())),
        }
    }
}
