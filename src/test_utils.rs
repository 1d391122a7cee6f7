use crate::fetcher::{ByteStream, FetchError, Transport};
use crate::launcher::ProcessSpawner;
use crate::staging::{FolderCategory, HostEnvironment, StagingLocation, StagingResolver};
use async_trait::async_trait;
use axum::extract::{Path as UrlPath, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use bytes::Bytes;
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

/// Host environment whose folders all point to one directory.
pub struct FixedEnvironment {
    folder: Option<PathBuf>,
}

impl FixedEnvironment {
    pub fn new(folder: &Path) -> Self {
        Self {
            folder: Some(folder.to_path_buf()),
        }
    }

    pub fn without_folder() -> Self {
        Self { folder: None }
    }
}

impl HostEnvironment for FixedEnvironment {
    fn folder(&self, _category: FolderCategory) -> Option<PathBuf> {
        self.folder.clone()
    }

    fn directory_exists(&self, path: &Path) -> bool {
        path.is_dir()
    }
}

/// Resolves `dir` through a resolver, so the location carries a real check.
pub fn validated_location(dir: &Path) -> StagingLocation {
    let location = StagingResolver::new(Box::new(FixedEnvironment::new(dir))).resolve("temporary");
    assert!(location.exists(), "{} should exist", dir.display());
    location
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Opened(String),
    Spawned(PathBuf),
}

/// Ordered record of the side effects fakes were asked for.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<Event>>>,
}

impl EventLog {
    pub fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }

    pub fn all(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
}

/// Transport serving a fixed body for any url.
pub struct RecordingTransport {
    body: Bytes,
    events: EventLog,
}

impl RecordingTransport {
    pub fn new(body: Vec<u8>, events: EventLog) -> Self {
        Self {
            body: body.into(),
            events,
        }
    }
}

struct SingleChunk(Option<Bytes>);

#[async_trait]
impl ByteStream for SingleChunk {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, FetchError> {
        Ok(self.0.take())
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn open(&self, url: &Url) -> Result<Box<dyn ByteStream>, FetchError> {
        self.events.push(Event::Opened(url.to_string()));
        Ok(Box::new(SingleChunk(Some(self.body.clone()))))
    }
}

/// Transport whose body yields one chunk and then breaks off.
pub struct BrokenTransport {
    first_chunk: Bytes,
}

impl BrokenTransport {
    pub fn new(first_chunk: &[u8]) -> Self {
        Self {
            first_chunk: Bytes::copy_from_slice(first_chunk),
        }
    }
}

struct BrokenBody(Option<Bytes>);

#[async_trait]
impl ByteStream for BrokenBody {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, FetchError> {
        match self.0.take() {
            Some(chunk) => Ok(Some(chunk)),
            None => Err(FetchError::TransportFailure(
                "connection reset by peer".to_string(),
            )),
        }
    }
}

#[async_trait]
impl Transport for BrokenTransport {
    async fn open(&self, _url: &Url) -> Result<Box<dyn ByteStream>, FetchError> {
        Ok(Box::new(BrokenBody(Some(self.first_chunk.clone()))))
    }
}

/// Spawner that records the attempt and never starts anything.
pub struct RecordingSpawner {
    events: EventLog,
    result: Result<(), std::io::ErrorKind>,
}

impl RecordingSpawner {
    pub fn new(events: EventLog, result: Result<(), std::io::ErrorKind>) -> Self {
        Self { events, result }
    }
}

impl ProcessSpawner for RecordingSpawner {
    fn spawn(&self, path: &Path) -> std::io::Result<u32> {
        self.events.push(Event::Spawned(path.to_path_buf()));
        match self.result {
            Ok(()) => Ok(4242),
            Err(kind) => Err(kind.into()),
        }
    }
}

/// Spawner that always fails with the given error kind.
pub struct FailingSpawner(pub std::io::ErrorKind);

impl ProcessSpawner for FailingSpawner {
    fn spawn(&self, _path: &Path) -> std::io::Result<u32> {
        Err(self.0.into())
    }
}

#[cfg(unix)]
pub fn write_file(dir: &Path, name: &str, content: &[u8], mode: u32) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(mode)).unwrap();
    path
}

#[cfg(not(unix))]
pub fn write_file(dir: &Path, name: &str, content: &[u8], _mode: u32) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

/// Url on a local port nothing listens on.
pub fn unreachable_url(path: &str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}{}", port, path)
}

#[derive(Clone)]
struct ServedArtifact {
    body: Bytes,
    requests: Arc<AtomicUsize>,
}

async fn serve_file(
    State(artifact): State<ServedArtifact>,
    UrlPath(_name): UrlPath<String>,
) -> (StatusCode, Bytes) {
    artifact.requests.fetch_add(1, Ordering::SeqCst);
    (StatusCode::OK, artifact.body.clone())
}

async fn serve_slow(
    State(artifact): State<ServedArtifact>,
    UrlPath(_name): UrlPath<String>,
) -> (StatusCode, Bytes) {
    artifact.requests.fetch_add(1, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_secs(5)).await;
    (StatusCode::OK, artifact.body.clone())
}

/// Local http server handing out one artifact.
///
/// * `/files/<name>` answers 200 with the body.
/// * `/slow/<name>` answers the same after five seconds.
/// * anything else is a 404.
pub struct ArtifactServer {
    guard: tokio::task::JoinHandle<()>,
    addr: String,
    port: u16,
    requests: Arc<AtomicUsize>,
}

impl Drop for ArtifactServer {
    fn drop(&mut self) {
        self.guard.abort();
    }
}

impl ArtifactServer {
    pub fn url_for(&self, path: &str) -> String {
        format!("http://{}:{}{}", self.addr, self.port, path)
    }

    /// Number of requests answered by the artifact routes.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub async fn new(body: Vec<u8>) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().ip().to_string();
        let port = listener.local_addr().unwrap().port();
        let requests = Arc::new(AtomicUsize::new(0));

        let router = Router::new()
            .route("/files/:name", get(serve_file))
            .route("/slow/:name", get(serve_slow))
            .with_state(ServedArtifact {
                body: body.into(),
                requests: requests.clone(),
            });

        let guard = tokio::task::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        Self {
            guard,
            addr,
            port,
            requests,
        }
    }
}
