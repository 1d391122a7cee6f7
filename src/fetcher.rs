use crate::artifact::RemoteArtifact;
use async_trait::async_trait;
use bytes::Bytes;
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use url::Url;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FetchError {
    #[error("Transport failure: {0}")]
    TransportFailure(String),
    #[error("Write failure: {0}")]
    WriteFailure(String),
    #[error("Artifact rejected: {0}")]
    Rejected(String),
}

/// An opened response body, read chunk by chunk.
#[async_trait]
pub trait ByteStream: Send {
    /// Next chunk of the body, `None` once it is exhausted.
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, FetchError>;
}

/// Opens remote resources. Implementations report connection problems and
/// non-success statuses as `FetchError::TransportFailure`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn open(&self, url: &Url) -> Result<Box<dyn ByteStream>, FetchError>;
}

/// Hook consulted on the staged file before it is handed to the launcher.
pub trait ArtifactVerifier: Send + Sync {
    fn verify(&self, artifact: &RemoteArtifact, path: &Path) -> Result<(), String>;
}

/// Accepts every artifact. No checksum or signature is checked.
#[derive(Debug, Default, Clone)]
pub struct AcceptAll;

impl ArtifactVerifier for AcceptAll {
    fn verify(&self, _artifact: &RemoteArtifact, _path: &Path) -> Result<(), String> {
        Ok(())
    }
}

/// Downloads a single artifact into its destination path.
pub struct Fetcher {
    transport: Arc<dyn Transport>,
    verifier: Arc<dyn ArtifactVerifier>,
}

impl Fetcher {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            verifier: Arc::new(AcceptAll),
        }
    }

    ///
    /// Replaces the verification hook.
    ///
    /// # Arguments
    ///
    /// * `verifier` - Called with the staged file once the body is on disk.
    ///
    pub fn with_verifier(mut self, verifier: Arc<dyn ArtifactVerifier>) -> Self {
        self.verifier = verifier;
        self
    }

    /// Streams the artifact to its destination, overwriting any existing file.
    ///
    /// Nothing is written until the transport has been opened successfully.
    /// A failure after that may leave a partial file behind, it is never
    /// removed.
    pub async fn fetch(&self, artifact: &RemoteArtifact) -> Result<PathBuf, FetchError> {
        let path = artifact.destination_path();
        info!("Downloading {} to {}", artifact.url(), path.display());

        let mut body = self.transport.open(artifact.url()).await?;
        let mut file = open_destination(path)
            .await
            .map_err(|e| write_failure(path, e))?;

        let mut written: u64 = 0;
        loop {
            let chunk = match body.next_chunk().await {
                Ok(Some(chunk)) => chunk,
                Ok(None) => break,
                Err(e) => {
                    // Whatever arrived stays on disk.
                    let _ = file.flush().await;
                    return Err(e);
                }
            };
            file.write_all(&chunk)
                .await
                .map_err(|e| write_failure(path, e))?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(|e| write_failure(path, e))?;
        mark_executable(&file)
            .await
            .map_err(|e| write_failure(path, e))?;
        file.sync_all().await.map_err(|e| write_failure(path, e))?;
        drop(file);
        debug!("Wrote {} bytes to {}", written, path.display());

        self.verifier
            .verify(artifact, path)
            .map_err(FetchError::Rejected)?;

        Ok(path.to_path_buf())
    }
}

fn write_failure(path: &Path, error: std::io::Error) -> FetchError {
    FetchError::WriteFailure(format!("{}: {}", path.display(), error))
}

// A symlink planted at the destination must not redirect the write.
async fn open_destination(path: &Path) -> std::io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.custom_flags(libc::O_NOFOLLOW);
    options.open(path).await
}

#[cfg(unix)]
async fn mark_executable(file: &File) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    file.set_permissions(std::fs::Permissions::from_mode(0o755))
        .await
}

#[cfg(not(unix))]
async fn mark_executable(_file: &File) -> std::io::Result<()> {
    Ok(())
}
