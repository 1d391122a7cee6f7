use crate::artifact::ArtifactError;
use crate::fetcher::FetchError;
use crate::launcher::LaunchError;
use crate::package::PackageDescriptor;
use crate::staging::StagingLocation;
use log::{debug, info, warn};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AbortReason {
    #[error("No usable staging location")]
    NoStagingLocation,
    #[error("Invalid artifact: {0}")]
    InvalidArtifact(#[from] ArtifactError),
    #[error("Download failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("Launch failed: {0}")]
    Launch(#[from] LaunchError),
    #[error("Cannot go from {from} to {to}")]
    InvalidTransition { from: Stage, to: Stage },
}

#[derive(Debug, Clone, PartialEq)]
pub enum InstallationOutcome {
    Committed,
    Aborted(AbortReason),
}

impl InstallationOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, InstallationOutcome::Committed)
    }
}

/// Pipeline states, in the only order they can be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    StagingResolved,
    DestinationBound,
    Fetched,
    Launched,
    Committed,
    Aborted,
}

impl Stage {
    fn is_terminal(self) -> bool {
        matches!(self, Stage::Committed | Stage::Aborted)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// One installation attempt.
///
/// Owns the package identity and is the only place an `InstallationOutcome`
/// is produced. Once committed or aborted the outcome never changes.
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    descriptor: PackageDescriptor,
    stage: Stage,
    destination: Option<StagingLocation>,
    staged_file: Option<PathBuf>,
    outcome: Option<InstallationOutcome>,
}

impl Session {
    pub fn begin(descriptor: PackageDescriptor) -> Self {
        let id = Uuid::new_v4();
        debug!("[{}] Session started for {}", id, descriptor);
        Self {
            id,
            descriptor,
            stage: Stage::Start,
            destination: None,
            staged_file: None,
            outcome: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn descriptor(&self) -> &PackageDescriptor {
        &self.descriptor
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// The bound staging location, once `bind_destination` succeeded.
    pub fn destination(&self) -> Option<&StagingLocation> {
        self.destination.as_ref()
    }

    pub fn staged_file(&self) -> Option<&Path> {
        self.staged_file.as_deref()
    }

    pub fn outcome(&self) -> Option<&InstallationOutcome> {
        self.outcome.as_ref()
    }

    pub fn staging_resolved(&mut self) -> Result<(), AbortReason> {
        self.advance(Stage::Start, Stage::StagingResolved)
    }

    /// Fixes the destination for the rest of the run. Fails when the location
    /// does not exist.
    pub fn bind_destination(&mut self, location: StagingLocation) -> Result<(), AbortReason> {
        self.check_transition(Stage::StagingResolved, Stage::DestinationBound)?;
        if !location.exists() {
            return Err(AbortReason::NoStagingLocation);
        }

        info!(
            "[{}] Staging into {}",
            self.id,
            location.path().display()
        );
        self.destination = Some(location);
        self.stage = Stage::DestinationBound;
        Ok(())
    }

    pub fn fetched(&mut self, path: &Path) -> Result<(), AbortReason> {
        self.advance(Stage::DestinationBound, Stage::Fetched)?;
        self.staged_file = Some(path.to_path_buf());
        Ok(())
    }

    pub fn launched(&mut self) -> Result<(), AbortReason> {
        self.advance(Stage::Fetched, Stage::Launched)
    }

    /// Ends the run successfully. Only valid once the installer was launched,
    /// otherwise the run is aborted.
    pub fn commit(&mut self) -> InstallationOutcome {
        if let Some(outcome) = &self.outcome {
            return outcome.clone();
        }

        if let Err(reason) = self.check_transition(Stage::Launched, Stage::Committed) {
            return self.abort(reason);
        }

        info!("[{}] Installation of {} committed", self.id, self.descriptor);
        self.stage = Stage::Committed;
        self.outcome = Some(InstallationOutcome::Committed);
        InstallationOutcome::Committed
    }

    /// Ends the run with `reason`. Repeated calls return the outcome recorded
    /// first.
    pub fn abort(&mut self, reason: AbortReason) -> InstallationOutcome {
        if let Some(outcome) = &self.outcome {
            return outcome.clone();
        }

        warn!(
            "[{}] Installation of {} aborted in {}: {}",
            self.id, self.descriptor, self.stage, reason
        );
        self.stage = Stage::Aborted;
        let outcome = InstallationOutcome::Aborted(reason);
        self.outcome = Some(outcome.clone());
        outcome
    }

    fn check_transition(&self, from: Stage, to: Stage) -> Result<(), AbortReason> {
        if self.stage != from || self.stage.is_terminal() {
            return Err(AbortReason::InvalidTransition {
                from: self.stage,
                to,
            });
        }
        Ok(())
    }

    fn advance(&mut self, from: Stage, to: Stage) -> Result<(), AbortReason> {
        self.check_transition(from, to)?;
        debug!("[{}] {} -> {}", self.id, self.stage, to);
        self.stage = to;
        Ok(())
    }
}
