//! Installation progress tracking with download metadata

use std::sync::atomic::{AtomicBool, Ordering};

use log::warn;
use tokio::sync::mpsc;

/// Download phase tracking for the artifact transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadPhase {
    Connecting,  // Request issued to the release host
    Redirected,  // Following the single redirect hop
    Downloading, // Streaming body bytes to disk
    Complete,    // File flushed, closed and moved into place
}

/// Metadata for tracking the artifact download
#[derive(Debug, Clone)]
pub struct DownloadMetadata {
    /// URL currently being requested
    pub url: String,

    /// Bytes written so far
    pub bytes_downloaded: u64,

    /// Content-Length of the response, when the server sent one
    pub total_bytes: Option<u64>,

    pub phase: DownloadPhase,
}

/// Installation progress event
#[derive(Debug, Clone)]
pub struct InstallProgress {
    pub step: String,
    pub message: String,
    pub is_error: bool,

    /// Download-specific metadata (only set during the transfer)
    pub download_metadata: Option<DownloadMetadata>,
}

impl InstallProgress {
    pub fn new(step: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            message: message.into(),
            is_error: false,
            download_metadata: None,
        }
    }

    pub fn error(step: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            is_error: true,
            ..Self::new(step, message)
        }
    }

    /// Create download progress with metadata
    pub fn download(
        url: &str,
        bytes_downloaded: u64,
        total_bytes: Option<u64>,
        phase: DownloadPhase,
    ) -> Self {
        let message = match phase {
            DownloadPhase::Connecting => format!("Connecting to {url}"),
            DownloadPhase::Redirected => format!("Following redirect to {url}"),
            DownloadPhase::Downloading => {
                let mb_downloaded = bytes_downloaded as f64 / 1_048_576.0;
                match total_bytes {
                    Some(total) if total > 0 => format!(
                        "Downloading ({:.1} MB / {:.1} MB)",
                        mb_downloaded,
                        total as f64 / 1_048_576.0
                    ),
                    _ => format!("Downloading ({mb_downloaded:.1} MB)"),
                }
            }
            DownloadPhase::Complete => "Download complete".to_string(),
        };

        Self {
            step: "download".to_string(),
            message,
            is_error: false,
            download_metadata: Some(DownloadMetadata {
                url: url.to_string(),
                bytes_downloaded,
                total_bytes,
                phase,
            }),
        }
    }
}

/// Best-effort sender for progress events
///
/// A closed or full channel never fails the install; after the first
/// closed-channel error further events are dropped silently.
#[derive(Debug, Default)]
pub struct ProgressReporter {
    tx: Option<mpsc::Sender<InstallProgress>>,
    disabled: AtomicBool,
}

impl ProgressReporter {
    pub fn new(tx: mpsc::Sender<InstallProgress>) -> Self {
        Self {
            tx: Some(tx),
            disabled: AtomicBool::new(false),
        }
    }

    /// Reporter that discards every event
    pub fn silent() -> Self {
        Self::default()
    }

    pub fn send(&self, progress: InstallProgress) {
        let Some(tx) = &self.tx else {
            return;
        };
        if self.disabled.load(Ordering::Relaxed) {
            return;
        }
        if let Err(e) = tx.try_send(progress)
            && matches!(e, mpsc::error::TrySendError::Closed(_))
        {
            warn!("Progress channel closed, continuing install without updates");
            self.disabled.store(true, Ordering::Relaxed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn download_message_includes_sizes_when_known() {
        let p = InstallProgress::download(
            "https://x",
            1_048_576,
            Some(2_097_152),
            DownloadPhase::Downloading,
        );
        assert_eq!(p.message, "Downloading (1.0 MB / 2.0 MB)");
        assert_eq!(p.step, "download");

        let p = InstallProgress::download("https://x", 524_288, None, DownloadPhase::Downloading);
        assert_eq!(p.message, "Downloading (0.5 MB)");
    }

    #[tokio::test]
    async fn reporter_delivers_events() {
        let (tx, mut rx) = mpsc::channel(4);
        let reporter = ProgressReporter::new(tx);
        reporter.send(InstallProgress::new("directory", "ready"));
        drop(reporter);

        let event = rx.recv().await.unwrap();
        assert_eq!(event.step, "directory");
        assert!(rx.recv().await.is_none());
    }

    #[test]
    fn reporter_survives_closed_channel() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let reporter = ProgressReporter::new(tx);
        reporter.send(InstallProgress::new("a", "b"));
        reporter.send(InstallProgress::new("c", "d"));
        assert!(reporter.disabled.load(Ordering::Relaxed));
    }

    #[test]
    fn silent_reporter_is_a_no_op() {
        ProgressReporter::silent().send(InstallProgress::error("download", "boom"));
    }
}
