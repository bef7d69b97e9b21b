//! Post-install version probe of the installed binary

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;

use super::error::InstallerError;

pub const DEFAULT_PROBE_FLAG: &str = "--version";
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Ask an installed binary which version it is
#[async_trait]
pub trait VersionProbe: Send + Sync {
    /// Returns the trimmed self-reported version string
    async fn probe(&self, binary: &Path) -> Result<String, InstallerError>;
}

/// Runs `<binary> <flag>` and captures stdout
#[derive(Debug, Clone)]
pub struct CommandProbe {
    flag: String,
    timeout: Duration,
}

impl CommandProbe {
    pub fn new(flag: impl Into<String>, timeout: Duration) -> Self {
        Self {
            flag: flag.into(),
            timeout,
        }
    }
}

impl Default for CommandProbe {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_FLAG, DEFAULT_PROBE_TIMEOUT)
    }
}

#[async_trait]
impl VersionProbe for CommandProbe {
    async fn probe(&self, binary: &Path) -> Result<String, InstallerError> {
        let failed = |reason: String| InstallerError::VersionProbeFailed {
            path: binary.to_path_buf(),
            reason,
        };

        let mut command = Command::new(binary);
        command.arg(&self.flag).kill_on_drop(true);

        let output = match timeout(self.timeout, command.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => return Err(failed(format!("could not execute: {e}"))),
            Err(_) => {
                return Err(failed(format!(
                    "no answer within {} seconds",
                    self.timeout.as_secs()
                )));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(failed(format!("exited with {}: {}", output.status, stderr.trim())));
        }

        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if version.is_empty() {
            return Err(failed("printed no version".to_string()));
        }
        Ok(version)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    fn script(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[tokio::test]
    async fn captures_trimmed_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let body = r#"[ "$1" = "--version" ] && echo "  migraine v0.0.2  ""#;
        let bin = script(dir.path(), "migraine", body);

        let version = CommandProbe::default().probe(&bin).await.unwrap();
        assert_eq!(version, "migraine v0.0.2");
    }

    #[tokio::test]
    async fn non_zero_exit_is_a_probe_failure() {
        let dir = tempfile::tempdir().unwrap();
        let bin = script(dir.path(), "migraine", "echo broken >&2; exit 3");

        let err = CommandProbe::default().probe(&bin).await.unwrap_err();
        assert!(matches!(err, InstallerError::VersionProbeFailed { .. }));
        assert!(!err.is_fatal());
        assert!(err.to_string().contains("broken"));
    }

    #[tokio::test]
    async fn missing_binary_is_a_probe_failure() {
        let dir = tempfile::tempdir().unwrap();
        let err = CommandProbe::default()
            .probe(&dir.path().join("absent"))
            .await
            .unwrap_err();
        assert!(matches!(err, InstallerError::VersionProbeFailed { .. }));
    }

    #[tokio::test]
    async fn slow_binary_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let bin = script(dir.path(), "migraine", "sleep 5");

        let probe = CommandProbe::new("--version", Duration::from_millis(100));
        let err = probe.probe(&bin).await.unwrap_err();
        assert!(err.to_string().contains("no answer"));
    }
}
