use crate::artifact::RemoteArtifact;
use crate::config::Config;
use crate::fetcher::Fetcher;
use crate::http::HttpTransport;
use crate::launcher::Launcher;
use crate::package::PackageDescriptor;
use crate::session::{AbortReason, InstallationOutcome, Session};
use crate::staging::StagingResolver;
use log::{debug, info};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InstallerError {
    #[error("Cannot build http client: {0}")]
    HttpClientError(#[from] reqwest::Error),
}

pub struct Installer {
    descriptor: PackageDescriptor,
    source_url: String,
    staging_category: String,
    resolver: StagingResolver,
    fetcher: Fetcher,
    launcher: Launcher,
}

impl Installer {
    pub fn new(
        descriptor: PackageDescriptor,
        source_url: &str,
        resolver: StagingResolver,
        fetcher: Fetcher,
        launcher: Launcher,
    ) -> Self {
        Self {
            descriptor,
            source_url: source_url.to_string(),
            staging_category: String::from("temporary"),
            resolver,
            fetcher,
            launcher,
        }
    }

    /// Builds an installer using the real host, network and process spawner.
    pub fn from_config(config: &Config) -> Result<Self, InstallerError> {
        let transport = HttpTransport::new(
            Duration::from_secs(config.connect_timeout),
            Duration::from_secs(config.fetch_timeout),
        )?;

        let mut installer = Self::new(
            config.into(),
            &config.url,
            StagingResolver::default(),
            Fetcher::new(Arc::new(transport)),
            Launcher::default(),
        );
        installer.staging_category(&config.staging_category);
        Ok(installer)
    }

    /// Sets the folder category the artifact is staged in.
    pub fn staging_category(&mut self, category: &str) -> &mut Self {
        self.staging_category = category.to_string();
        self
    }

    pub fn descriptor(&self) -> &PackageDescriptor {
        &self.descriptor
    }

    /// Runs one installation attempt and returns its outcome.
    pub async fn run(&self) -> InstallationOutcome {
        self.run_session().await.0
    }

    /// Same as `run`, also handing back the finished session.
    pub async fn run_session(&self) -> (InstallationOutcome, Session) {
        let mut session = Session::begin(self.descriptor.clone());
        info!(
            "[{}] Installing {} from {}",
            session.id(),
            self.descriptor,
            self.source_url
        );

        let outcome = match self.steps(&mut session).await {
            Ok(()) => session.commit(),
            Err(reason) => session.abort(reason),
        };
        (outcome, session)
    }

    async fn steps(&self, session: &mut Session) -> Result<(), AbortReason> {
        let location = self.resolver.resolve(&self.staging_category);
        session.staging_resolved()?;
        session.bind_destination(location)?;

        let destination = session
            .destination()
            .ok_or(AbortReason::NoStagingLocation)?;
        let artifact = RemoteArtifact::new(&self.source_url, destination)?;

        let path = self.fetcher.fetch(&artifact).await?;
        session.fetched(&path)?;
        debug!("[{}] Staged {}", session.id(), path.display());

        self.launcher.launch(&path)?;
        session.launched()
    }
}
