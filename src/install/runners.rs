//! Installation runners for the different modes (install, dry run, check)
//!
//! These are the only functions that talk to the console; everything below
//! them reports through return values and progress events.

use std::io::Write;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use termcolor::{Color, ColorSpec, StandardStream, WriteColor};
use tokio::sync::mpsc;

use super::binaries::DISPLAY_NAME;
use super::cli::Cli;
use super::detection::{InstallationState, check_installation_state};
use super::download::{HttpTransport, PlatformSpec, resolve_platform};
use super::environment::{color_choice, is_interactive};
use super::error::InstallerError;
use super::filesystem::{HostFs, InstallLayout};
use super::orchestration::{InstallOutcome, InstallPlan, Installer};
use super::probe::CommandProbe;
use super::progress::{DownloadPhase, InstallProgress, ProgressReporter};
use crate::config::InstallerConfig;

/// Resolve the target platform from host values or CLI overrides
fn target_platform(cli: &Cli) -> Result<PlatformSpec, InstallerError> {
    if cli.overrides_platform() {
        resolve_platform(cli.host_os(), cli.host_arch())
    } else {
        PlatformSpec::detect()
    }
}

/// Run the full install
pub async fn run_install(cli: &Cli, config: &InstallerConfig) -> Result<()> {
    // Platform first: an unsupported host must fail before any side effect
    let platform = target_platform(cli)?;
    let plan = InstallPlan::from_config(config, platform)?;

    let prior = check_installation_state(&plan.layout);
    if prior != InstallationState::NotInstalled {
        info!("Existing installation is {:?}, reinstalling", prior);
    }

    let mut stdout = StandardStream::stdout(color_choice());
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true));
    let _ = writeln!(stdout, "Installing {DISPLAY_NAME}...");
    let _ = stdout.reset();
    let _ = writeln!(stdout, "Downloading from: {}", plan.artifact.url);

    let transport = HttpTransport::new(
        &config.network.user_agent,
        config.network.connect_timeout(),
        config.network.inactivity_timeout(),
    )
    .context("Failed to create HTTP client")?;
    let probe = CommandProbe::new(config.verify.flag.clone(), config.verify.timeout());

    let (tx, rx) = mpsc::channel::<InstallProgress>(100);
    let progress_task = tokio::spawn(render_progress(rx, is_interactive()));

    let installer =
        Installer::new(transport, HostFs, probe).with_progress(ProgressReporter::new(tx));
    let result = installer.install(&plan).await;

    // Dropping the installer closes the channel so the renderer can finish
    drop(installer);
    progress_task.await.ok();

    let outcome = result?;
    show_completion(&mut stdout, &outcome, config.verify.enabled);
    Ok(())
}

/// Print the resolved plan without touching the network or disk
pub fn run_dry_run(cli: &Cli, config: &InstallerConfig) -> Result<()> {
    let platform = target_platform(cli)?;
    let plan = InstallPlan::from_config(config, platform)?;

    let mut stdout = StandardStream::stdout(color_choice());
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true));
    let _ = writeln!(stdout, "{DISPLAY_NAME} install plan (dry run)");
    let _ = stdout.reset();
    let _ = writeln!(stdout, "   Platform: {}", plan.artifact.platform);
    let _ = writeln!(stdout, "   Release:  {}", plan.artifact.tag());
    let _ = writeln!(stdout, "   URL:      {}", plan.artifact.url);
    let _ = writeln!(stdout, "   Binary:   {}", plan.layout.binary_path.display());
    let _ = writeln!(
        stdout,
        "   Alias:    {} -> {}",
        plan.layout.alias_path.display(),
        plan.layout.binary_path.display()
    );
    let _ = writeln!(stdout, "\nNothing was changed.");
    Ok(())
}

/// Report the installation state of the configured layout
pub fn run_check(config: &InstallerConfig) -> Result<InstallationState> {
    let layout = InstallLayout::new(
        &config.resolved_bin_dir(),
        &config.tool_name,
        &config.alias_name,
    )
    .context("Failed to resolve binary directory")?;
    let state = check_installation_state(&layout);

    let mut stdout = StandardStream::stdout(color_choice());
    let (color, label) = match state {
        InstallationState::FullyInstalled => (Color::Green, "installed"),
        InstallationState::PartiallyInstalled => (
            Color::Yellow,
            "partially installed (re-run the installer to repair)",
        ),
        InstallationState::NotInstalled => (Color::Red, "not installed"),
    };
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(color)));
    let _ = writeln!(stdout, "{DISPLAY_NAME} is {label}");
    let _ = stdout.reset();
    let _ = writeln!(stdout, "   Binary: {}", layout.binary_path.display());
    let _ = writeln!(stdout, "   Alias:  {}", layout.alias_path.display());

    Ok(state)
}

/// Print the one-line failure diagnostic on stderr
pub fn report_failure(error: &anyhow::Error) {
    let mut stderr = StandardStream::stderr(color_choice());
    let _ = stderr.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true));
    let _ = write!(stderr, "\n❌ Error installing {DISPLAY_NAME}: ");
    let _ = stderr.reset();
    let _ = writeln!(stderr, "{error:#}");
}

fn show_completion(stdout: &mut StandardStream, outcome: &InstallOutcome, verified: bool) {
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true));
    let _ = writeln!(stdout, "\n✨ {DISPLAY_NAME} installed successfully!");
    let _ = stdout.reset();
    let _ = writeln!(
        stdout,
        "You can now use either \"{}\" or \"{}\" commands.\n",
        outcome.commands.primary, outcome.commands.alias
    );

    if !verified {
        return;
    }
    match (&outcome.installed_version, &outcome.probe_error) {
        (Some(version), _) => {
            let _ = writeln!(stdout, "Installed version: {version}");
        }
        (None, probe_error) => {
            if let Some(e) = probe_error {
                debug!("Version probe failed: {e}");
            }
            let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)));
            let _ = writeln!(
                stdout,
                "Note: Run \"{} --version\" to verify the installation.",
                outcome.commands.primary
            );
            let _ = stdout.reset();
        }
    }
}

/// Render progress events until the sender side is dropped
async fn render_progress(mut rx: mpsc::Receiver<InstallProgress>, interactive: bool) {
    let pb = if interactive {
        ProgressBar::new(0)
    } else {
        ProgressBar::hidden()
    };
    let style = ProgressStyle::default_bar()
        .template("   [{bar:40.green/blue}] {bytes}/{total_bytes}  {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓░");
    pb.set_style(style);

    while let Some(progress) = rx.recv().await {
        match &progress.download_metadata {
            Some(meta) => match meta.phase {
                DownloadPhase::Connecting | DownloadPhase::Redirected => {
                    debug!("{}", progress.message);
                    pb.set_message(progress.message.clone());
                }
                DownloadPhase::Downloading => {
                    if let Some(total) = meta.total_bytes {
                        pb.set_length(total);
                    }
                    pb.set_position(meta.bytes_downloaded);
                    pb.set_message("📥 Downloading");
                }
                DownloadPhase::Complete => {
                    pb.finish_and_clear();
                }
            },
            None if progress.is_error => {
                pb.abandon();
                debug!("[{}] {}", progress.step, progress.message);
            }
            None => debug!("[{}] {}", progress.step, progress.message),
        }
    }

    if !pb.is_finished() {
        pb.finish_and_clear();
    }
}
