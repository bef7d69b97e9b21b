//! Artifact transfer with single-redirect handling and streamed writes

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use log::{debug, info, warn};
use reqwest::IntoUrl;
use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use tokio::io::AsyncWriteExt;
use tokio::time::timeout;
use url::Url;

use crate::install::error::{FetchError, InstallerError};
use crate::install::progress::{DownloadPhase, InstallProgress, ProgressReporter};

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30); // Initial connection
pub const DEFAULT_INACTIVITY_TIMEOUT: Duration = Duration::from_secs(300); // 5 min no data

// Emit a progress event at most every 256KB
const PROGRESS_CHUNK_THRESHOLD: u64 = 256 * 1024;

/// Capability to fetch a URL into a file
///
/// Implementations write the complete response body to `dest`, creating or
/// truncating it, and only return `Ok` once the file is flushed and closed.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Returns the number of bytes written
    async fn fetch_to(
        &self,
        url: &str,
        dest: &Path,
        progress: &ProgressReporter,
    ) -> Result<u64, FetchError>;
}

/// reqwest-backed transport used for real installs
pub struct HttpTransport {
    client: reqwest::Client,
    inactivity_timeout: Duration,
}

impl HttpTransport {
    pub fn new(
        user_agent: &str,
        connect_timeout: Duration,
        inactivity_timeout: Duration,
    ) -> Result<Self, FetchError> {
        // Redirects are followed by hand so the hop count stays at one
        let client = reqwest::Client::builder()
            .redirect(Policy::none())
            .connect_timeout(connect_timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            inactivity_timeout,
        })
    }

    /// Issue the initial request and follow at most one redirect
    async fn request(
        &self,
        url: &str,
        progress: &ProgressReporter,
    ) -> Result<reqwest::Response, FetchError> {
        progress.send(InstallProgress::download(url, 0, None, DownloadPhase::Connecting));
        let response = self.send(url).await?;

        if !response.status().is_redirection() {
            return Ok(response);
        }

        let target = redirect_target(&response)?;
        debug!("Release host redirected {} -> {}", url, target);
        progress.send(InstallProgress::download(
            target.as_str(),
            0,
            None,
            DownloadPhase::Redirected,
        ));

        let redirected = self.send(target).await?;
        if redirected.status().is_redirection() {
            let next = redirected
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("<missing>")
                .to_string();
            return Err(FetchError::TooManyRedirects(next));
        }

        Ok(redirected)
    }

    /// GET `url`, giving up when no response head arrives within the inactivity window
    async fn send(&self, url: impl IntoUrl) -> Result<reqwest::Response, FetchError> {
        match timeout(self.inactivity_timeout, self.client.get(url).send()).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(FetchError::Inactivity(self.inactivity_timeout)),
        }
    }
}

/// Resolve the `Location` of a redirect response against its request URL
fn redirect_target(response: &reqwest::Response) -> Result<Url, FetchError> {
    let status = response.status().as_u16();
    let location = response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(FetchError::MissingLocation(status))?;

    response
        .url()
        .join(location)
        .map_err(|_| FetchError::MissingLocation(status))
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch_to(
        &self,
        url: &str,
        dest: &Path,
        progress: &ProgressReporter,
    ) -> Result<u64, FetchError> {
        // Destination is opened before any network traffic
        let mut file = tokio::fs::File::create(dest).await?;

        let response = self.request(url, progress).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let final_url = response.url().to_string();
        let total_bytes = response.content_length();
        let mut stream = response.bytes_stream();
        let mut downloaded: u64 = 0;
        let mut last_progress_bytes = 0u64;

        loop {
            let chunk = match timeout(self.inactivity_timeout, stream.next()).await {
                Ok(Some(Ok(chunk))) => chunk,
                Ok(Some(Err(e))) => return Err(e.into()),
                Ok(None) => break,
                Err(_) => return Err(FetchError::Inactivity(self.inactivity_timeout)),
            };

            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;

            if downloaded - last_progress_bytes >= PROGRESS_CHUNK_THRESHOLD {
                progress.send(InstallProgress::download(
                    &final_url,
                    downloaded,
                    total_bytes,
                    DownloadPhase::Downloading,
                ));
                last_progress_bytes = downloaded;
            }
        }

        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        Ok(downloaded)
    }
}

/// Sibling scratch path the transfer writes into before the final rename
pub fn partial_path(dest: &Path) -> PathBuf {
    let name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    dest.with_file_name(format!(".{name}.download"))
}

/// Download `url` to `dest`, never leaving a truncated file behind
///
/// Bytes go to a sibling `.<name>.download` file which is renamed onto
/// `dest` only after the transport reports a complete, closed write. On
/// failure the scratch file is removed and any previous `dest` is left
/// untouched.
pub async fn download_artifact<T: Transport + ?Sized>(
    transport: &T,
    url: &str,
    dest: &Path,
    progress: &ProgressReporter,
) -> Result<u64, InstallerError> {
    let scratch = partial_path(dest);

    let result = match transport.fetch_to(url, &scratch, progress).await {
        Ok(bytes) => tokio::fs::rename(&scratch, dest)
            .await
            .map(|()| bytes)
            .map_err(FetchError::Io),
        Err(e) => Err(e),
    };

    match result {
        Ok(bytes) => {
            info!("Downloaded {} bytes to {}", bytes, dest.display());
            progress.send(InstallProgress::download(
                url,
                bytes,
                Some(bytes),
                DownloadPhase::Complete,
            ));
            Ok(bytes)
        }
        Err(source) => {
            remove_partial(&scratch).await;
            progress.send(InstallProgress::error("download", source.to_string()));
            Err(InstallerError::DownloadFailed {
                url: url.to_string(),
                source,
            })
        }
    }
}

async fn remove_partial(scratch: &Path) {
    match tokio::fs::remove_file(scratch).await {
        Ok(()) => debug!("Removed partial download {}", scratch.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove partial download {}: {}", scratch.display(), e),
    }
}
