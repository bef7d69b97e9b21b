//! Filesystem placement of the installed binary and its alias
//!
//! `InstallFs` is the seam the orchestrator writes through; `HostFs` is the
//! real implementation and tests substitute fakes for failure injection.

use std::io;
use std::path::{Path, PathBuf};

/// Mode applied to the installed binary (rwxr-xr-x)
pub const EXECUTABLE_MODE: u32 = 0o755;

/// Filesystem operations the installer needs
pub trait InstallFs: Send + Sync {
    /// Create `path` and any missing parents; succeed if it already exists
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Set the permission bits of `path`
    fn set_mode(&self, path: &Path, mode: u32) -> io::Result<()>;

    /// Remove the link (or file) at `path` without following it
    fn remove_link(&self, path: &Path) -> io::Result<()>;

    /// Create a symbolic link at `link` pointing to `target`
    fn symlink(&self, target: &Path, link: &Path) -> io::Result<()>;
}

/// The host filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct HostFs;

impl InstallFs for HostFs {
    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn set_mode(&self, path: &Path, mode: u32) -> io::Result<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
        }

        #[cfg(not(unix))]
        {
            let _ = (path, mode);
            Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "permission bits are only supported on Unix hosts",
            ))
        }
    }

    fn remove_link(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }

    fn symlink(&self, target: &Path, link: &Path) -> io::Result<()> {
        #[cfg(unix)]
        {
            std::os::unix::fs::symlink(target, link)
        }

        #[cfg(not(unix))]
        {
            let _ = (target, link);
            Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "symbolic link aliases are only supported on Unix hosts",
            ))
        }
    }
}

/// Where the binary and its alias live on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallLayout {
    pub bin_dir: PathBuf,
    pub binary_path: PathBuf,
    pub alias_path: PathBuf,
}

impl InstallLayout {
    /// Lay out `<bin_dir>/<tool>` and `<bin_dir>/<alias>`
    ///
    /// `bin_dir` is made absolute so the alias link target does not depend on
    /// the working directory of whoever resolves it.
    pub fn new(bin_dir: &Path, tool_name: &str, alias_name: &str) -> io::Result<Self> {
        let bin_dir = std::path::absolute(bin_dir)?;
        Ok(Self {
            binary_path: bin_dir.join(tool_name),
            alias_path: bin_dir.join(alias_name),
            bin_dir,
        })
    }
}
