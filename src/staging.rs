use log::debug;
use std::env;
use std::path::{Path, PathBuf};

/// Folder categories a staging location can be resolved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderCategory {
    Temporary,
    Home,
}

impl FolderCategory {
    /// Parses a category name, case insensitive. Returns None for unknown names.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "temporary" | "temp" | "tmp" => Some(Self::Temporary),
            "home" => Some(Self::Home),
            _ => None,
        }
    }
}

/// Access to the host filesystem conventions, so tests can point the
/// resolver somewhere else.
pub trait HostEnvironment: Send + Sync {
    /// Conventional directory for the category, if the host has one.
    fn folder(&self, category: FolderCategory) -> Option<PathBuf>;

    /// Whether `path` currently exists as a directory.
    fn directory_exists(&self, path: &Path) -> bool;
}

/// The real host.
#[derive(Debug, Default, Clone)]
pub struct SystemEnvironment;

impl HostEnvironment for SystemEnvironment {
    fn folder(&self, category: FolderCategory) -> Option<PathBuf> {
        match category {
            FolderCategory::Temporary => Some(env::temp_dir()),
            FolderCategory::Home => env::var_os("HOME")
                .or_else(|| env::var_os("USERPROFILE"))
                .filter(|home| !home.is_empty())
                .map(PathBuf::from),
        }
    }

    fn directory_exists(&self, path: &Path) -> bool {
        path.is_dir()
    }
}

/// A candidate directory for downloaded content.
///
/// `exists` is the result of the check done when the location was resolved,
/// the directory is never created by us. Only `StagingResolver::resolve` can
/// hand out a location with `exists` set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingLocation {
    path: PathBuf,
    exists: bool,
}

impl StagingLocation {
    /// A location that has not been checked yet.
    pub fn unvalidated(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            exists: false,
        }
    }

    fn unavailable() -> Self {
        Self::unvalidated(Path::new(""))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.exists
    }
}

/// Resolves and validates staging locations. Pure queries only.
pub struct StagingResolver {
    host: Box<dyn HostEnvironment>,
}

impl Default for StagingResolver {
    fn default() -> Self {
        Self::new(Box::new(SystemEnvironment))
    }
}

impl StagingResolver {
    pub fn new(host: Box<dyn HostEnvironment>) -> Self {
        Self { host }
    }

    /// Returns the location for the named category.
    ///
    /// Unknown categories, or categories the host has no folder for, give an
    /// empty path that does not exist.
    pub fn resolve(&self, category: &str) -> StagingLocation {
        let path = match FolderCategory::parse(category) {
            Some(category) => match self.host.folder(category) {
                Some(path) => path,
                None => {
                    debug!("Host has no folder for category {:?}", category);
                    return StagingLocation::unavailable();
                }
            },
            None => {
                debug!("Unknown folder category: {}", category);
                return StagingLocation::unavailable();
            }
        };

        let mut location = StagingLocation::unvalidated(&path);
        location.exists = self.validate(&location);
        debug!("Resolved {} folder to {:?}", category, location);
        location
    }

    /// Existence check only, writability is left to the download step.
    pub fn validate(&self, location: &StagingLocation) -> bool {
        !location.path.as_os_str().is_empty() && self.host.directory_exists(&location.path)
    }
}
