use crate::staging::StagingLocation;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use url::Url;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ArtifactError {
    #[error("Invalid url ({0})")]
    InvalidUrl(String),
    #[error("Unsupported url scheme: {0}")]
    UnsupportedScheme(String),
    #[error("Cannot derive a file name from url: {0}")]
    MissingFileName(String),
    #[error("File name escapes the staging directory: {0}")]
    UnsafeFileName(String),
    #[error("Staging directory has not been validated")]
    UnvalidatedStaging,
}

/// The single remote file of a run and where it will be written.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteArtifact {
    url: Url,
    destination_path: PathBuf,
}

impl RemoteArtifact {
    /// Builds the artifact for `url`, staged inside `location`.
    ///
    /// The file name is the last path segment of the url, kept as it appears
    /// in the url (percent escapes are not decoded). It must name a plain file
    /// directly inside the staging directory.
    pub fn new(url: &str, location: &StagingLocation) -> Result<Self, ArtifactError> {
        if !location.exists() {
            return Err(ArtifactError::UnvalidatedStaging);
        }

        let url = Url::parse(url).map_err(|e| ArtifactError::InvalidUrl(e.to_string()))?;
        match url.scheme() {
            "http" | "https" => {}
            other => return Err(ArtifactError::UnsupportedScheme(other.to_string())),
        }

        let file_name = url
            .path_segments()
            .and_then(|segments| segments.last())
            .filter(|segment| !segment.is_empty())
            .ok_or_else(|| ArtifactError::MissingFileName(url.to_string()))?
            .to_string();

        let destination_path = location.path().join(checked_file_name(&file_name)?);
        if destination_path.parent() != Some(location.path()) {
            return Err(ArtifactError::UnsafeFileName(file_name));
        }

        Ok(Self {
            url,
            destination_path,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn destination_path(&self) -> &Path {
        &self.destination_path
    }

    pub fn file_name(&self) -> Option<&str> {
        self.destination_path
            .file_name()
            .and_then(|name| name.to_str())
    }
}

fn checked_file_name(name: &str) -> Result<&str, ArtifactError> {
    if name.contains(['/', '\\', ':', '\0']) {
        return Err(ArtifactError::UnsafeFileName(name.to_string()));
    }

    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(name),
        _ => Err(ArtifactError::UnsafeFileName(name.to_string())),
    }
}
