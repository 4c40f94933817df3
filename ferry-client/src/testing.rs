//! In-process fakes for facade tests: an in-memory object store, a file
//! server answering its presigned URLs, and a control-plane stub.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use axum::{Json, Router};
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use ferry_core::domain::service::Service;
use ferry_core::domain::storage::{Bucket, ObjectInfo};
use futures::StreamExt;
use futures::stream;
use reqwest::Client;

use crate::ConsoleClient;
use crate::error::StorageError;
use crate::storage::{ObjectRemovalError, ObjectStorage, ObjectStream, PresignMethod};

/// Authorization header for admin:secret
const ADMIN_AUTH: &str = "Basic YWRtaW46c2VjcmV0";

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap()
}

pub fn client_with_password(base_url: &str, password: &str) -> ConsoleClient {
    ConsoleClient::with_parts(
        base_url,
        Client::new(),
        "admin",
        password,
        Arc::new(MemoryStorage::new("http://127.0.0.1:1")),
    )
}

pub fn client_for(base_url: &str) -> ConsoleClient {
    client_with_password(base_url, "secret")
}

pub fn storage_client(storage: Arc<MemoryStorage>) -> ConsoleClient {
    ConsoleClient::with_parts("http://127.0.0.1:1", Client::new(), "admin", "secret", storage)
}

// =============================================================================
// Object store
// =============================================================================

/// Bucket contents shared between the fake store and the file server
#[derive(Clone, Default)]
pub struct Files {
    buckets: Arc<Mutex<BTreeMap<String, BTreeMap<String, Bytes>>>>,
}

impl Files {
    fn buckets(&self) -> MutexGuard<'_, BTreeMap<String, BTreeMap<String, Bytes>>> {
        lock(&self.buckets)
    }
}

/// Serves GET and PUT on `/{bucket}/{key}` for presigned URLs
pub struct FileServer {
    pub url: String,
    pub files: Files,
}

impl FileServer {
    pub async fn spawn() -> Self {
        let files = Files::default();
        let app = Router::new()
            .route("/{bucket}/{*key}", get(get_file).put(put_file))
            .with_state(files.clone());
        Self {
            url: serve(app).await,
            files,
        }
    }
}

async fn get_file(State(files): State<Files>, Path((bucket, key)): Path<(String, String)>) -> Response {
    match files.buckets().get(&bucket).and_then(|objects| objects.get(&key)) {
        Some(body) => body.clone().into_response(),
        None => (StatusCode::NOT_FOUND, "NoSuchKey").into_response(),
    }
}

async fn put_file(
    State(files): State<Files>,
    Path((bucket, key)): Path<(String, String)>,
    body: Bytes,
) -> Response {
    match files.buckets().get_mut(&bucket) {
        Some(objects) => {
            objects.insert(key, body);
            StatusCode::OK.into_response()
        }
        None => (StatusCode::NOT_FOUND, "NoSuchBucket").into_response(),
    }
}

/// Serves every GET on `/{bucket}/{key}` with a body that trickles out one
/// chunk per `interval`
pub async fn spawn_slow_file_server(chunks: usize, interval: Duration) -> String {
    let app = Router::new().route(
        "/{bucket}/{*key}",
        get(move || async move {
            let body = stream::unfold(0, move |sent| async move {
                if sent == chunks {
                    return None;
                }
                tokio::time::sleep(interval).await;
                Some((Ok::<_, std::io::Error>(Bytes::from_static(SLOW_CHUNK)), sent + 1))
            });
            axum::body::Body::from_stream(body)
        }),
    );
    serve(app).await
}

pub const SLOW_CHUNK: &[u8] = b"chunk\n";

/// In-memory [`ObjectStorage`] with failure injection
#[derive(Default)]
pub struct MemoryStorage {
    base_url: String,
    files: Files,
    presigned: Mutex<Vec<(PresignMethod, String, Duration)>>,
    make_bucket_calls: Mutex<usize>,
    fail_listing_after: Mutex<Option<usize>>,
    failing_removals: Mutex<HashSet<String>>,
    fail_bucket_removal: Mutex<bool>,
}

impl MemoryStorage {
    /// Presigned URLs point at `base_url`
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Default::default()
        }
    }

    pub fn with_files(mut self, files: Files) -> Self {
        self.files = files;
        self
    }

    pub fn add_bucket(&self, bucket: &str) {
        self.files.buckets().entry(bucket.to_string()).or_default();
    }

    pub fn has_bucket(&self, bucket: &str) -> bool {
        self.files.buckets().contains_key(bucket)
    }

    pub fn put(&self, bucket: &str, key: &str, body: &[u8]) {
        self.files
            .buckets()
            .entry(bucket.to_string())
            .or_default()
            .insert(key.to_string(), Bytes::copy_from_slice(body));
    }

    pub fn get(&self, bucket: &str, key: &str) -> Option<Bytes> {
        self.files.buckets().get(bucket)?.get(key).cloned()
    }

    pub fn keys(&self, bucket: &str) -> Vec<String> {
        self.files
            .buckets()
            .get(bucket)
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn presigned(&self) -> Vec<(PresignMethod, String, Duration)> {
        lock(&self.presigned).clone()
    }

    pub fn make_bucket_calls(&self) -> usize {
        *lock(&self.make_bucket_calls)
    }

    /// Inserts a listing error after `n` objects
    pub fn fail_listing_after(&self, n: usize) {
        *lock(&self.fail_listing_after) = Some(n);
    }

    pub fn fail_removal_of(&self, key: &str) {
        lock(&self.failing_removals).insert(key.to_string());
    }

    pub fn fail_bucket_removal(&self) {
        *lock(&self.fail_bucket_removal) = true;
    }

    fn is_failing(&self, key: &str) -> bool {
        lock(&self.failing_removals).contains(key)
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    async fn list_buckets(&self) -> Result<Vec<Bucket>, StorageError> {
        Ok(self
            .files
            .buckets()
            .keys()
            .map(|name| Bucket {
                name: name.clone(),
                creation_date: None,
            })
            .collect())
    }

    async fn make_bucket(&self, name: &str) -> Result<(), StorageError> {
        *lock(&self.make_bucket_calls) += 1;
        let mut buckets = self.files.buckets();
        if buckets.contains_key(name) {
            return Err(StorageError::backend("CreateBucket", "BucketAlreadyOwnedByYou"));
        }
        buckets.insert(name.to_string(), BTreeMap::new());
        Ok(())
    }

    async fn bucket_exists(&self, name: &str) -> Result<bool, StorageError> {
        Ok(self.has_bucket(name))
    }

    fn list_objects<'a>(&'a self, bucket: &'a str, prefix: &'a str) -> ObjectStream<'a> {
        let Some(objects) = self.files.buckets().get(bucket).cloned() else {
            return stream::iter(vec![Err(StorageError::NoSuchBucket(bucket.to_string()))]).boxed();
        };

        let mut items: Vec<Result<ObjectInfo, StorageError>> = objects
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
            .collect();

        if let Some(n) = *lock(&self.fail_listing_after) {
            let at = n.min(items.len());
            items.insert(at, Err(StorageError::backend("ListObjectsV2", "connection reset")));
        }

        stream::iter(items).boxed()
    }

    async fn presign(
        &self,
        method: PresignMethod,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> Result<String, StorageError> {
        lock(&self.presigned).push((method, key.to_string(), expires_in));
        Ok(format!(
            "{}/{}/{}?X-Amz-Expires={}",
            self.base_url,
            bucket,
            key,
            expires_in.as_secs()
        ))
    }

    async fn remove_object(&self, bucket: &str, key: &str) -> Result<(), StorageError> {
        if self.is_failing(key) {
            return Err(StorageError::backend("DeleteObject", "AccessDenied"));
        }
        match self.files.buckets().get_mut(bucket) {
            Some(objects) => {
                objects.remove(key);
                Ok(())
            }
            None => Err(StorageError::NoSuchBucket(bucket.to_string())),
        }
    }

    async fn remove_objects(
        &self,
        bucket: &str,
        keys: &[String],
    ) -> Result<Vec<ObjectRemovalError>, StorageError> {
        let mut failures = Vec::new();
        for key in keys {
            if let Err(err) = self.remove_object(bucket, key).await {
                failures.push(ObjectRemovalError {
                    key: key.clone(),
                    message: err.to_string(),
                });
            }
        }
        Ok(failures)
    }

    async fn remove_bucket(&self, name: &str) -> Result<(), StorageError> {
        if *lock(&self.fail_bucket_removal) {
            return Err(StorageError::backend("DeleteBucket", "AccessDenied"));
        }
        let mut buckets = self.files.buckets();
        match buckets.get(name) {
            None => Err(StorageError::NoSuchBucket(name.to_string())),
            Some(objects) if !objects.is_empty() => {
                Err(StorageError::backend("DeleteBucket", "BucketNotEmpty"))
            }
            Some(_) => {
                buckets.remove(name);
                Ok(())
            }
        }
    }
}

// =============================================================================
// Control plane
// =============================================================================

#[derive(Clone, Default)]
pub struct ControlPlaneState {
    services: Arc<Mutex<Vec<Service>>>,
    deleted_jobs: Arc<Mutex<Vec<String>>>,
    cleared: Arc<Mutex<Vec<(String, Option<String>)>>>,
}

impl ControlPlaneState {
    pub fn deleted_jobs(&self) -> Vec<String> {
        lock(&self.deleted_jobs).clone()
    }

    pub fn cleared(&self) -> Vec<(String, Option<String>)> {
        lock(&self.cleared).clone()
    }
}

/// Stub of the `/system` API accepting only admin:secret
pub struct ControlPlane {
    pub url: String,
    pub state: ControlPlaneState,
}

impl ControlPlane {
    pub async fn spawn() -> Self {
        let state = ControlPlaneState::default();
        let app = Router::new()
            .route("/system/info", get(info))
            .route(
                "/system/services",
                get(list_services).post(create_service).put(edit_service),
            )
            .route("/system/services/{name}", get(get_service).delete(delete_service))
            .route("/system/logs/{service}", get(list_jobs).delete(clear_jobs))
            .route("/system/logs/{service}/{job}", get(job_logs).delete(delete_job))
            .with_state(state.clone());
        Self {
            url: serve(app).await,
            state,
        }
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some(ADMIN_AUTH)
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
}

async fn info(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(serde_json::json!({
        "version": "v3.0.0",
        "git_commit": "abc123",
        "arch": "amd64",
        "kubernetes_version": "v1.30.0",
        "serverless_backend": { "name": "Knative", "version": "1.13.1" }
    }))
    .into_response()
}

async fn list_services(State(state): State<ControlPlaneState>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(lock(&state.services).clone()).into_response()
}

async fn create_service(
    State(state): State<ControlPlaneState>,
    headers: HeaderMap,
    Json(service): Json<Service>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut services = lock(&state.services);
    if services.iter().any(|s| s.name == service.name) {
        return (StatusCode::BAD_REQUEST, "service already exists").into_response();
    }
    services.push(service);
    StatusCode::CREATED.into_response()
}

async fn edit_service(
    State(state): State<ControlPlaneState>,
    headers: HeaderMap,
    Json(service): Json<Service>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut services = lock(&state.services);
    match services.iter_mut().find(|s| s.name == service.name) {
        Some(existing) => {
            *existing = service;
            StatusCode::NO_CONTENT.into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn get_service(
    State(state): State<ControlPlaneState>,
    headers: HeaderMap,
    Path(name): Path<String>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    match lock(&state.services).iter().find(|s| s.name == name) {
        Some(service) => Json(service.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, "service not found").into_response(),
    }
}

async fn delete_service(
    State(state): State<ControlPlaneState>,
    headers: HeaderMap,
    Path(name): Path<String>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut services = lock(&state.services);
    let before = services.len();
    services.retain(|s| s.name != name);
    if services.len() == before {
        return (StatusCode::NOT_FOUND, "service not found").into_response();
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn list_jobs(
    headers: HeaderMap,
    Path(service): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if service != "cowsay" {
        return StatusCode::NOT_FOUND.into_response();
    }
    let page = match query.get("page").map(String::as_str) {
        None => serde_json::json!({
            "jobs": {
                "cowsay-job-1": { "status": "Succeeded", "creation_time": "2024-05-01T10:00:00Z" }
            },
            "next_page": "page-2",
            "remaining_jobs": 1
        }),
        Some("page-2") => serde_json::json!({
            "jobs": {
                "cowsay-job-2": { "status": "Running", "start_time": "2024-05-01T11:00:00Z" }
            },
            "next_page": "",
            "remaining_jobs": 0
        }),
        Some(_) => return StatusCode::BAD_REQUEST.into_response(),
    };
    Json(page).into_response()
}

async fn clear_jobs(
    State(state): State<ControlPlaneState>,
    headers: HeaderMap,
    Path(service): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    lock(&state.cleared).push((service, query.get("all").cloned()));
    StatusCode::NO_CONTENT.into_response()
}

async fn job_logs(headers: HeaderMap, Path((service, job)): Path<(String, String)>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if service != "cowsay" {
        return StatusCode::NOT_FOUND.into_response();
    }
    format!("Moo from {}\n", job).into_response()
}

async fn delete_job(
    State(state): State<ControlPlaneState>,
    headers: HeaderMap,
    Path((service, job)): Path<(String, String)>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if service != "cowsay" {
        return StatusCode::NOT_FOUND.into_response();
    }
    lock(&state.deleted_jobs).push(format!("{}/{}", service, job));
    StatusCode::NO_CONTENT.into_response()
}
