use log::info;
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LaunchError {
    #[error("File cannot be executed: {0}")]
    NotExecutable(String),
    #[error("Failed to spawn process: {0}")]
    SpawnFailure(String),
}

/// Creates processes. Returns the id of the started child.
pub trait ProcessSpawner: Send + Sync {
    fn spawn(&self, path: &Path) -> io::Result<u32>;
}

/// Spawns through `std::process::Command`, without arguments and with stdin
/// detached. The child is not waited on.
#[derive(Debug, Default, Clone)]
pub struct SystemSpawner;

impl ProcessSpawner for SystemSpawner {
    fn spawn(&self, path: &Path) -> io::Result<u32> {
        let child = Command::new(path).stdin(Stdio::null()).spawn()?;
        Ok(child.id())
    }
}

/// Starts the staged installer.
pub struct Launcher {
    spawner: Box<dyn ProcessSpawner>,
}

impl Default for Launcher {
    fn default() -> Self {
        Self::new(Box::new(SystemSpawner))
    }
}

impl Launcher {
    pub fn new(spawner: Box<dyn ProcessSpawner>) -> Self {
        Self { spawner }
    }

    /// Starts the file at `path`. Success only means the process started, its
    /// exit status is never looked at.
    pub fn launch(&self, path: &Path) -> Result<(), LaunchError> {
        check_executable(path)?;

        match self.spawner.spawn(path) {
            Ok(pid) => {
                info!("Launched {} (pid {})", path.display(), pid);
                Ok(())
            }
            Err(e) => Err(classify(path, e)),
        }
    }
}

#[cfg(unix)]
fn check_executable(path: &Path) -> Result<(), LaunchError> {
    use std::os::unix::fs::PermissionsExt;

    // Missing files are left to the spawner.
    if let Ok(metadata) = std::fs::metadata(path) {
        if !metadata.is_file() {
            return Err(LaunchError::NotExecutable(format!(
                "{} is not a regular file",
                path.display()
            )));
        }
        if metadata.permissions().mode() & 0o111 == 0 {
            return Err(LaunchError::NotExecutable(format!(
                "{} has no execute permission",
                path.display()
            )));
        }
    }
    Ok(())
}

#[cfg(not(unix))]
fn check_executable(_path: &Path) -> Result<(), LaunchError> {
    Ok(())
}

#[cfg(windows)]
const ERROR_BAD_EXE_FORMAT: i32 = 193;

fn is_exec_format_error(error: &io::Error) -> bool {
    #[cfg(unix)]
    {
        error.raw_os_error() == Some(libc::ENOEXEC)
    }
    #[cfg(windows)]
    {
        error.raw_os_error() == Some(ERROR_BAD_EXE_FORMAT)
    }
    #[cfg(not(any(unix, windows)))]
    {
        let _ = error;
        false
    }
}

fn classify(path: &Path, error: io::Error) -> LaunchError {
    let detail = format!("{}: {}", path.display(), error);
    if error.kind() == io::ErrorKind::PermissionDenied || is_exec_format_error(&error) {
        LaunchError::NotExecutable(detail)
    } else {
        LaunchError::SpawnFailure(detail)
    }
}
