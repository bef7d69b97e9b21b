//! CLI argument parsing and mode detection for migraine-install

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for migraine-install
#[derive(Parser, Clone, Debug, Default)]
#[command(name = "migraine-install")]
#[command(version, about = "Download the migraine binary for this host and link the `mig` alias")]
pub struct Cli {
    /// Release version to install (without the leading `v`)
    ///
    /// When run as a package lifecycle hook this is taken from the package's
    /// own version metadata.
    #[arg(long, env = "npm_package_version")]
    pub artifact_version: Option<String>,

    /// Package root; the binary directory is `<root>/bin` unless --bin-dir is given
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Install into this directory instead of `<root>/bin`
    #[arg(long)]
    pub bin_dir: Option<PathBuf>,

    /// Path to an installer config file (TOML)
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Override the host-reported operating system (darwin, linux)
    #[arg(long)]
    pub os: Option<String>,

    /// Override the host-reported CPU architecture (x64, arm64)
    #[arg(long)]
    pub arch: Option<String>,

    /// Skip running `migraine --version` after installing
    #[arg(long)]
    pub no_verify: bool,

    /// Show what would be done without doing it
    #[arg(long, conflicts_with = "check")]
    pub dry_run: bool,

    /// Report the installation state and exit (0 = installed, 1 = not)
    #[arg(long)]
    pub check: bool,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Host OS identifier, honouring the --os override
    pub fn host_os(&self) -> &str {
        self.os.as_deref().unwrap_or(std::env::consts::OS)
    }

    /// Host architecture identifier, honouring the --arch override
    pub fn host_arch(&self) -> &str {
        self.arch.as_deref().unwrap_or(std::env::consts::ARCH)
    }

    /// Whether the host values were overridden on the command line
    pub fn overrides_platform(&self) -> bool {
        self.os.is_some() || self.arch.is_some()
    }
}
