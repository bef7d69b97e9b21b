//! Installation orchestration
//!
//! Drives one install run through its states:
//!
//! `Start → DirectoryEnsured → Downloaded → PermissionSet → AliasReplaced →
//! Verified (optional) → Done`
//!
//! Any step may end the run in `Failed`. Only the version probe is
//! advisory; its failure is recorded on the outcome instead of aborting.

use std::io::ErrorKind;
use std::path::PathBuf;

use log::{debug, info, warn};

use super::binaries::CommandNames;
use super::download::{ArtifactRef, PlatformSpec, Transport, download_artifact};
use super::error::InstallerError;
use super::filesystem::{EXECUTABLE_MODE, InstallFs, InstallLayout};
use super::probe::VersionProbe;
use super::progress::{InstallProgress, ProgressReporter};
use crate::config::InstallerConfig;

/// States of one install run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallState {
    Start,
    DirectoryEnsured,
    Downloaded,
    PermissionSet,
    AliasReplaced,
    Verified,
    Done,
    Failed,
}

impl InstallState {
    fn step(&self) -> &'static str {
        match self {
            InstallState::Start => "start",
            InstallState::DirectoryEnsured => "directory",
            InstallState::Downloaded => "download",
            InstallState::PermissionSet => "permissions",
            InstallState::AliasReplaced => "alias",
            InstallState::Verified => "verify",
            InstallState::Done => "done",
            InstallState::Failed => "failed",
        }
    }
}

/// Everything one run needs to know
#[derive(Debug, Clone)]
pub struct InstallPlan {
    pub artifact: ArtifactRef,
    pub layout: InstallLayout,
    pub commands: CommandNames,
    pub verify: bool,
}

impl InstallPlan {
    /// Resolve the artifact and on-disk layout for `platform`
    pub fn from_config(
        config: &InstallerConfig,
        platform: PlatformSpec,
    ) -> Result<Self, InstallerError> {
        let version = config.require_version()?;
        let artifact = ArtifactRef::new(&config.release, &config.tool_name, version, platform);
        let layout = InstallLayout::new(
            &config.resolved_bin_dir(),
            &config.tool_name,
            &config.alias_name,
        )
        .map_err(|e| InstallerError::Config(format!("cannot resolve binary directory: {e}")))?;

        Ok(Self {
            artifact,
            layout,
            commands: CommandNames {
                primary: config.tool_name.clone(),
                alias: config.alias_name.clone(),
            },
            verify: config.verify.enabled,
        })
    }
}

/// What a successful run produced
#[derive(Debug)]
pub struct InstallOutcome {
    pub binary_path: PathBuf,
    pub alias_path: PathBuf,
    pub commands: CommandNames,
    pub bytes_downloaded: u64,
    /// Self-reported version when the probe ran and succeeded
    pub installed_version: Option<String>,
    /// Advisory probe failure; the install itself still succeeded
    pub probe_error: Option<InstallerError>,
    /// States visited, in order
    pub transitions: Vec<InstallState>,
}

/// Artifact installer over pluggable transport, filesystem and probe
pub struct Installer<T, F, P> {
    transport: T,
    fs: F,
    probe: P,
    progress: ProgressReporter,
}

impl<T, F, P> Installer<T, F, P>
where
    T: Transport,
    F: InstallFs,
    P: VersionProbe,
{
    pub fn new(transport: T, fs: F, probe: P) -> Self {
        Self {
            transport,
            fs,
            probe,
            progress: ProgressReporter::silent(),
        }
    }

    /// Report progress events to `progress`
    pub fn with_progress(mut self, progress: ProgressReporter) -> Self {
        self.progress = progress;
        self
    }

    /// Run the install to completion or the first fatal error
    pub async fn install(&self, plan: &InstallPlan) -> Result<InstallOutcome, InstallerError> {
        let mut transitions = vec![InstallState::Start];

        match self.run(plan, &mut transitions).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                let from = transitions.last().copied().unwrap_or(InstallState::Start);
                debug!("install state: {:?} -> {:?}", from, InstallState::Failed);
                self.progress
                    .send(InstallProgress::error(InstallState::Failed.step(), e.to_string()));
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        plan: &InstallPlan,
        transitions: &mut Vec<InstallState>,
    ) -> Result<InstallOutcome, InstallerError> {
        let layout = &plan.layout;

        self.fs
            .create_dir_all(&layout.bin_dir)
            .map_err(|source| InstallerError::DirectoryCreateFailed {
                path: layout.bin_dir.clone(),
                source,
            })?;
        self.advance(transitions, InstallState::DirectoryEnsured, "Binary directory ready");

        let bytes_downloaded = download_artifact(
            &self.transport,
            &plan.artifact.url,
            &layout.binary_path,
            &self.progress,
        )
        .await?;
        self.advance(transitions, InstallState::Downloaded, "Binary downloaded");

        self.fs
            .set_mode(&layout.binary_path, EXECUTABLE_MODE)
            .map_err(|source| InstallerError::PermissionSetFailed {
                path: layout.binary_path.clone(),
                source,
            })?;
        self.advance(transitions, InstallState::PermissionSet, "Binary marked executable");

        self.replace_alias(layout)?;
        self.advance(transitions, InstallState::AliasReplaced, "Alias linked");

        let mut installed_version = None;
        let mut probe_error = None;
        if plan.verify {
            match self.probe.probe(&layout.binary_path).await {
                Ok(version) => {
                    info!("Installed binary reports version {}", version);
                    installed_version = Some(version);
                    self.advance(
                        transitions,
                        InstallState::Verified,
                        "Installed version confirmed",
                    );
                }
                Err(e) if !e.is_fatal() => {
                    warn!("{}", e);
                    probe_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        self.advance(transitions, InstallState::Done, "Installation complete");

        Ok(InstallOutcome {
            binary_path: layout.binary_path.clone(),
            alias_path: layout.alias_path.clone(),
            commands: plan.commands.clone(),
            bytes_downloaded,
            installed_version,
            probe_error,
            transitions: transitions.clone(),
        })
    }

    /// Point the alias at the binary, replacing whatever was there
    fn replace_alias(&self, layout: &InstallLayout) -> Result<(), InstallerError> {
        let failed = |source| InstallerError::AliasReplaceFailed {
            link: layout.alias_path.clone(),
            target: layout.binary_path.clone(),
            source,
        };

        match self.fs.remove_link(&layout.alias_path) {
            Ok(()) => debug!("Removed previous alias {}", layout.alias_path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(failed(e)),
        }

        self.fs
            .symlink(&layout.binary_path, &layout.alias_path)
            .map_err(failed)
    }

    fn advance(&self, transitions: &mut Vec<InstallState>, next: InstallState, message: &str) {
        if let Some(from) = transitions.last() {
            debug!("install state: {:?} -> {:?}", from, next);
        }
        transitions.push(next);
        self.progress.send(InstallProgress::new(next.step(), message));
    }
}
