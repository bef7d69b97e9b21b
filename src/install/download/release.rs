//! Release artifact identity and download URL construction

use serde::{Deserialize, Serialize};

use super::platform::PlatformSpec;

/// Where release assets are published
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseSource {
    pub host: String,
    pub owner: String,
    pub repo: String,
}

impl Default for ReleaseSource {
    fn default() -> Self {
        Self {
            host: "github.com".to_string(),
            owner: "tesh254".to_string(),
            repo: "migraine".to_string(),
        }
    }
}

/// The remote binary to fetch for one version on one platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRef {
    pub version: String,
    pub platform: PlatformSpec,
    pub file_name: String,
    pub url: String,
}

impl ArtifactRef {
    /// Build the artifact reference
    ///
    /// `version` is inserted verbatim after a `v` prefix. It must be
    /// non-empty; `InstallerConfig::require_version` guarantees that for the
    /// CLI path.
    pub fn new(
        source: &ReleaseSource,
        tool_name: &str,
        version: &str,
        platform: PlatformSpec,
    ) -> Self {
        let file_name = format!("{}-{}-{}", tool_name, platform.os, platform.arch);
        let url = format!(
            "https://{}/{}/{}/releases/download/v{}/{}",
            source.host, source.owner, source.repo, version, file_name
        );

        Self {
            version: version.to_string(),
            platform,
            file_name,
            url,
        }
    }

    /// Release tag the artifact belongs to (e.g. `v0.0.2-alpha.5`)
    pub fn tag(&self) -> String {
        format!("v{}", self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::install::download::platform::{Arch, Os};

    #[test]
    fn darwin_arm64_prerelease_url() {
        let platform = PlatformSpec::new(Os::Darwin, Arch::Arm64);
        let artifact =
            ArtifactRef::new(&ReleaseSource::default(), "migraine", "0.0.2-alpha.5", platform);

        assert_eq!(artifact.file_name, "migraine-darwin-arm64");
        assert_eq!(
            artifact.url,
            "https://github.com/tesh254/migraine/releases/download/v0.0.2-alpha.5/migraine-darwin-arm64"
        );
        assert!(artifact.url.contains("/v0.0.2-alpha.5/"));
        assert_eq!(artifact.tag(), "v0.0.2-alpha.5");
    }

    #[test]
    fn linux_amd64_file_name_has_no_extension() {
        let platform = PlatformSpec::new(Os::Linux, Arch::Amd64);
        let artifact = ArtifactRef::new(&ReleaseSource::default(), "migraine", "1.2.3", platform);

        assert_eq!(artifact.file_name, "migraine-linux-amd64");
        assert!(artifact.url.ends_with("/v1.2.3/migraine-linux-amd64"));
    }

    #[test]
    fn custom_release_source_is_honoured() {
        let source = ReleaseSource {
            host: "mirror.example.com".to_string(),
            owner: "acme".to_string(),
            repo: "tools".to_string(),
        };
        let platform = PlatformSpec::new(Os::Linux, Arch::Arm64);
        let artifact = ArtifactRef::new(&source, "migraine", "2.0.0", platform);

        assert_eq!(
            artifact.url,
            "https://mirror.example.com/acme/tools/releases/download/v2.0.0/migraine-linux-arm64"
        );
    }

    #[test]
    fn version_is_an_opaque_token() {
        let platform = PlatformSpec::new(Os::Linux, Arch::Amd64);
        let artifact =
            ArtifactRef::new(&ReleaseSource::default(), "migraine", "nightly+build.7", platform);
        assert!(artifact.url.contains("/vnightly+build.7/"));
    }
}
