//! Platform detection for release artifact selection

use std::fmt;

use once_cell::sync::OnceCell;

use crate::install::error::InstallerError;

/// Operating systems with a published migraine binary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
    Darwin,
    Linux,
}

impl Os {
    /// Normalize a host-reported OS identifier
    ///
    /// Accepts both the Node-style identifiers a package lifecycle hook
    /// reports (`darwin`, `linux`) and Rust's `std::env::consts::OS` names.
    pub fn resolve(reported: &str) -> Result<Self, InstallerError> {
        match reported {
            "darwin" | "macos" => Ok(Os::Darwin),
            "linux" => Ok(Os::Linux),
            other => Err(InstallerError::UnsupportedPlatform(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Os::Darwin => "darwin",
            Os::Linux => "linux",
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CPU architectures with a published migraine binary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    Amd64,
    Arm64,
}

impl Arch {
    /// Normalize a host-reported architecture identifier
    ///
    /// The 64-bit x86 identifier (`x64`, `x86_64`) becomes `amd64`;
    /// `arm64` passes through and Rust's `aarch64` maps onto it.
    pub fn resolve(reported: &str) -> Result<Self, InstallerError> {
        match reported {
            "x64" | "x86_64" | "amd64" => Ok(Arch::Amd64),
            "arm64" | "aarch64" => Ok(Arch::Arm64),
            other => Err(InstallerError::UnsupportedArchitecture(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Arch::Amd64 => "amd64",
            Arch::Arm64 => "arm64",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized {os, arch} pair used to pick the release artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlatformSpec {
    pub os: Os,
    pub arch: Arch,
}

/// Host platform, resolved once per process
static PLATFORM_CACHE: OnceCell<PlatformSpec> = OnceCell::new();

impl PlatformSpec {
    pub const fn new(os: Os, arch: Arch) -> Self {
        Self { os, arch }
    }

    /// Resolve the host platform (cached after first call)
    pub fn detect() -> Result<Self, InstallerError> {
        PLATFORM_CACHE
            .get_or_try_init(|| resolve_platform(std::env::consts::OS, std::env::consts::ARCH))
            .copied()
    }
}

impl fmt::Display for PlatformSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os, self.arch)
    }
}

/// Validate host-reported OS and architecture identifiers
///
/// The OS is checked first, so an unsupported OS is reported even when the
/// architecture is also unsupported.
pub fn resolve_platform(os: &str, arch: &str) -> Result<PlatformSpec, InstallerError> {
    let os = Os::resolve(os)?;
    let arch = Arch::resolve(arch)?;
    Ok(PlatformSpec::new(os, arch))
}
