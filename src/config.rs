//! Installer configuration
//!
//! Values come from an optional TOML file and are overridden by command-line
//! arguments (which clap also fills from the package manager's environment).

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::install::binaries::{ALIAS_NAME, TOOL_NAME};
use crate::install::download::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_INACTIVITY_TIMEOUT, ReleaseSource};
use crate::install::probe::{DEFAULT_PROBE_FLAG, DEFAULT_PROBE_TIMEOUT};
use crate::install::{Cli, InstallerError};

/// File name looked up under the user config directory
pub const CONFIG_FILE_NAME: &str = "install.toml";

/// Top‑level installer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallerConfig {
    /// Release version to install, without the `v` prefix
    pub version: Option<String>,
    /// Package root the binary directory is resolved against
    pub install_root: PathBuf,
    /// Binary directory; relative paths are joined onto `install_root`
    pub bin_dir: PathBuf,
    pub tool_name: String,
    pub alias_name: String,
    pub release: ReleaseSource,
    pub network: NetworkConfig,
    pub verify: VerifyConfig,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            version: None,
            install_root: PathBuf::from("."),
            bin_dir: PathBuf::from("bin"),
            tool_name: TOOL_NAME.to_string(),
            alias_name: ALIAS_NAME.to_string(),
            release: ReleaseSource::default(),
            network: NetworkConfig::default(),
            verify: VerifyConfig::default(),
        }
    }
}

/// Transfer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub connect_timeout_secs: u64,
    /// Abort when no body bytes arrive for this long
    pub inactivity_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT.as_secs(),
            inactivity_timeout_secs: DEFAULT_INACTIVITY_TIMEOUT.as_secs(),
            user_agent: format!("migraine-install/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl NetworkConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn inactivity_timeout(&self) -> Duration {
        Duration::from_secs(self.inactivity_timeout_secs)
    }
}

/// Post-install version probe settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyConfig {
    pub enabled: bool,
    pub flag: String,
    pub timeout_secs: u64,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            flag: DEFAULT_PROBE_FLAG.to_string(),
            timeout_secs: DEFAULT_PROBE_TIMEOUT.as_secs(),
        }
    }
}

impl VerifyConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl InstallerConfig {
    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Default config file location (`<config_dir>/migraine/install.toml`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(TOOL_NAME).join(CONFIG_FILE_NAME))
    }

    /// Build the effective configuration for a CLI invocation
    ///
    /// An explicit `--config` must exist; the default location is only read
    /// when present.
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.is_file()) {
                Some(path) => {
                    log::debug!("Using config from {}", path.display());
                    Self::from_file(&path)?
                }
                None => Self::default(),
            },
        };
        config.apply_cli(cli);
        Ok(config)
    }

    /// Overlay command-line (and environment) values onto file values
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(version) = cli.artifact_version.as_deref().filter(|v| !v.trim().is_empty()) {
            self.version = Some(version.to_string());
        }
        if let Some(root) = &cli.root {
            self.install_root = root.clone();
        }
        if let Some(bin_dir) = &cli.bin_dir {
            self.bin_dir = bin_dir.clone();
        }
        if cli.no_verify {
            self.verify.enabled = false;
        }
    }

    /// The version to install; it must be present and non-empty
    ///
    /// A leading `v` is dropped only when a digit follows it (`v1.2.0`), so
    /// tags that merely start with the letter keep it.
    pub fn require_version(&self) -> Result<&str, InstallerError> {
        let raw = self.version.as_deref().map(str::trim).unwrap_or_default();
        let version = match raw.strip_prefix('v') {
            Some(rest) if rest.starts_with(|c: char| c.is_ascii_digit()) => rest,
            _ => raw,
        };

        // A bare `v` would produce the tag `vv`
        if version.is_empty() || version == "v" {
            return Err(InstallerError::Config(
                "no release version given; pass --artifact-version or set npm_package_version"
                    .to_string(),
            ));
        }
        Ok(version)
    }

    /// Binary directory with a relative `bin_dir` resolved against the root
    pub fn resolved_bin_dir(&self) -> PathBuf {
        self.install_root.join(&self.bin_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn defaults_match_the_published_layout() {
        let config = InstallerConfig::default();
        assert_eq!(config.tool_name, "migraine");
        assert_eq!(config.alias_name, "mig");
        assert_eq!(config.resolved_bin_dir(), PathBuf::from("./bin"));
        assert_eq!(config.release.host, "github.com");
        assert_eq!(config.network.connect_timeout(), Duration::from_secs(30));
        assert!(config.verify.enabled);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = InstallerConfig::from_toml(
            r#"
            version = "0.0.2-alpha.5"

            [release]
            owner = "acme"

            [network]
            inactivity_timeout_secs = 60
            "#,
        )
        .unwrap();

        assert_eq!(config.version.as_deref(), Some("0.0.2-alpha.5"));
        assert_eq!(config.release.owner, "acme");
        assert_eq!(config.release.repo, "migraine");
        assert_eq!(config.network.inactivity_timeout(), Duration::from_secs(60));
        assert_eq!(config.network.connect_timeout_secs, 30);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        assert!(InstallerConfig::from_toml("version = [").is_err());
    }

    #[test]
    fn cli_overrides_file_values() {
        let mut config = InstallerConfig::from_toml(r#"version = "1.0.0""#).unwrap();
        let cli = Cli::try_parse_from([
            "migraine-install",
            "--artifact-version",
            "2.0.0",
            "--root",
            "/opt/pkg",
            "--no-verify",
        ])
        .unwrap();

        config.apply_cli(&cli);

        assert_eq!(config.require_version().unwrap(), "2.0.0");
        assert_eq!(config.resolved_bin_dir(), PathBuf::from("/opt/pkg/bin"));
        assert!(!config.verify.enabled);
    }

    #[test]
    fn absolute_bin_dir_ignores_root() {
        let config = InstallerConfig {
            install_root: PathBuf::from("/opt/pkg"),
            bin_dir: PathBuf::from("/usr/local/bin"),
            ..InstallerConfig::default()
        };
        assert_eq!(config.resolved_bin_dir(), PathBuf::from("/usr/local/bin"));
    }

    #[test]
    fn empty_version_is_rejected() {
        for version in [None, Some(""), Some("   ")] {
            let config = InstallerConfig {
                version: version.map(String::from),
                ..InstallerConfig::default()
            };
            assert!(matches!(config.require_version(), Err(InstallerError::Config(_))));
        }
    }

    #[test]
    fn leading_v_is_not_doubled() {
        let config = InstallerConfig {
            version: Some("v0.0.2-alpha.5".to_string()),
            ..InstallerConfig::default()
        };
        assert_eq!(config.require_version().unwrap(), "0.0.2-alpha.5");
    }

    #[test]
    fn bare_v_is_rejected() {
        for version in ["v", " v "] {
            let config = InstallerConfig {
                version: Some(version.to_string()),
                ..InstallerConfig::default()
            };
            assert!(matches!(config.require_version(), Err(InstallerError::Config(_))));
        }
    }

    #[test]
    fn v_followed_by_a_letter_is_kept() {
        for version in ["vanilla", "vnext"] {
            let config = InstallerConfig {
                version: Some(version.to_string()),
                ..InstallerConfig::default()
            };
            assert_eq!(config.require_version().unwrap(), version);
        }
    }

    #[test]
    fn blank_cli_version_does_not_clobber_file_version() {
        let mut config = InstallerConfig::from_toml(r#"version = "1.0.0""#).unwrap();
        let cli = Cli::try_parse_from(["migraine-install", "--artifact-version", ""]).unwrap();
        config.apply_cli(&cli);
        assert_eq!(config.require_version().unwrap(), "1.0.0");
    }
}
