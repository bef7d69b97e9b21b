//! Installation state detection
//!
//! Determines whether the binary and its alias are in place by checking:
//! - the binary exists and carries an execute bit
//! - the alias is a symlink that resolves to the binary path

use std::path::Path;

use super::filesystem::InstallLayout;

/// Installation state enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallationState {
    /// Neither the binary nor the alias exists
    NotInstalled,
    /// Something is present but incomplete or stale (repair needed)
    PartiallyInstalled,
    /// Executable binary present and alias points at it
    FullyInstalled,
}

/// Check the current installation state of `layout`
pub fn check_installation_state(layout: &InstallLayout) -> InstallationState {
    let binary_present = layout.binary_path.exists();
    let binary_ok = binary_present && is_executable(&layout.binary_path);
    let alias_present = std::fs::symlink_metadata(&layout.alias_path).is_ok();
    let alias_ok = alias_points_at(&layout.alias_path, &layout.binary_path);

    match (binary_present, alias_present) {
        (false, false) => InstallationState::NotInstalled,
        _ if binary_ok && alias_ok => InstallationState::FullyInstalled,
        _ => InstallationState::PartiallyInstalled,
    }
}

fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::metadata(path)
            .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }

    #[cfg(not(unix))]
    {
        path.is_file()
    }
}

/// Whether `link` is a symlink whose target is exactly `target`
fn alias_points_at(link: &Path, target: &Path) -> bool {
    match std::fs::read_link(link) {
        Ok(dest) => dest == target,
        Err(_) => false,
    }
}
