//! Release artifact resolution and download
//!
//! ## Module Organization
//!
//! - `platform` - Host OS/architecture normalization
//! - `release` - Artifact file name and download URL construction
//! - `core` - HTTP transfer with single-redirect handling and cleanup

mod core;
mod platform;
mod release;

pub use core::{
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_INACTIVITY_TIMEOUT, HttpTransport, Transport,
    download_artifact, partial_path,
};
pub use platform::{Arch, Os, PlatformSpec, resolve_platform};
pub use release::{ArtifactRef, ReleaseSource};
