//! Migraine post-install library
//!
//! Fetches the prebuilt `migraine` binary for the host platform, marks it
//! executable and links the short `mig` alias next to it. Designed to run as
//! a package lifecycle hook, but every step is also usable programmatically.

pub(crate) mod binaries;
mod cli;
mod detection;
pub(crate) mod download;
mod environment;
mod error;
mod filesystem;
mod orchestration;
pub(crate) mod probe;
mod progress;
mod runners;

// Public exports
pub use binaries::{ALIAS_NAME, CommandNames, TOOL_NAME};
pub use cli::Cli;
pub use detection::{InstallationState, check_installation_state};
pub use download::{
    Arch, ArtifactRef, HttpTransport, Os, PlatformSpec, ReleaseSource, Transport,
    download_artifact, partial_path, resolve_platform,
};
pub use error::{FetchError, InstallerError};
pub use filesystem::{EXECUTABLE_MODE, HostFs, InstallFs, InstallLayout};
pub use orchestration::{InstallOutcome, InstallPlan, InstallState, Installer};
pub use probe::{CommandProbe, VersionProbe};
pub use progress::{DownloadMetadata, DownloadPhase, InstallProgress, ProgressReporter};
pub use runners::report_failure;

use std::process::ExitCode;

use anyhow::Result;

use crate::config::InstallerConfig;

/// Run the installer for a parsed command line
///
/// # Returns
/// - `--check`: success only when the installation is complete
/// - `--dry-run`: success once the plan is printed
/// - otherwise: success once the binary and alias are in place (a failed
///   version probe does not change this)
pub async fn run(cli: &Cli) -> Result<ExitCode> {
    let config = InstallerConfig::load(cli)?;

    if cli.check {
        let state = runners::run_check(&config)?;
        return Ok(if state == InstallationState::FullyInstalled {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    if cli.dry_run {
        runners::run_dry_run(cli, &config)?;
    } else {
        runners::run_install(cli, &config).await?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Public API for the `migraine-install` binary
pub async fn install_interactive() -> Result<ExitCode> {
    let cli = Cli::parse_args();
    run(&cli).await
}
