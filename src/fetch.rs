//! Release download
//!
//! The cache only needs bytes for an exact version; [`Fetcher`] is that
//! seam. [`HashicorpReleases`] is the production implementation: it pulls
//! the platform zip from releases.hashicorp.com, checks it against the
//! published SHA256SUMS and extracts the binary.

use crate::error::{TfsError, TfsResult};
use crate::ui::{DownloadProgress, UiContext};
use semver::Version;
use sha2::{Digest, Sha256};
use std::io::{Cursor, Read};
use std::time::Duration;
use tracing::debug;

/// Upper bound for a downloaded archive
const MAX_ARCHIVE_BYTES: u64 = 512 * 1024 * 1024;

/// Source of release binaries
pub trait Fetcher {
    /// Raw bytes of the binary for `version` on this platform
    fn fetch(&self, version: &Version) -> TfsResult<Vec<u8>>;
}

impl<F> Fetcher for F
where
    F: Fn(&Version) -> TfsResult<Vec<u8>>,
{
    fn fetch(&self, version: &Version) -> TfsResult<Vec<u8>> {
        self(version)
    }
}

/// HashiCorp OS and architecture names for the running platform
pub fn platform() -> (&'static str, &'static str) {
    let os = match std::env::consts::OS {
        "macos" => "darwin",
        other => other,
    };
    let arch = match std::env::consts::ARCH {
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        "x86" => "386",
        other => other,
    };
    (os, arch)
}

/// Downloads releases from a HashiCorp release mirror
#[derive(Clone)]
pub struct HashicorpReleases {
    base_url: String,
    product: String,
    os: String,
    arch: String,
    agent: ureq::Agent,
    ui: UiContext,
}

impl HashicorpReleases {
    /// Fetcher for `product` (e.g. "terraform") served under `base_url`
    pub fn new(base_url: &str, product: &str, timeout: Duration) -> Self {
        let (os, arch) = platform();
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            product: product.to_string(),
            os: os.to_string(),
            arch: arch.to_string(),
            agent,
            ui: UiContext::non_interactive(),
        }
    }

    /// Override the target platform
    pub fn with_platform(mut self, os: &str, arch: &str) -> Self {
        self.os = os.to_string();
        self.arch = arch.to_string();
        self
    }

    /// Show download progress according to `ui`
    pub fn with_ui(mut self, ui: UiContext) -> Self {
        self.ui = ui;
        self
    }

    /// File name of the release archive
    pub fn archive_name(&self, version: &Version) -> String {
        format!("{}_{}_{}_{}.zip", self.product, version, self.os, self.arch)
    }

    /// URL of the release archive
    pub fn archive_url(&self, version: &Version) -> String {
        format!(
            "{}/{}/{}/{}",
            self.base_url,
            self.product,
            version,
            self.archive_name(version)
        )
    }

    /// URL of the checksum list published with the release
    pub fn checksums_url(&self, version: &Version) -> String {
        format!(
            "{}/{}/{}/{}_{}_SHA256SUMS",
            self.base_url, self.product, version, self.product, version
        )
    }

    fn get(&self, url: &str, label: Option<&str>) -> TfsResult<Vec<u8>> {
        debug!(url, "GET");
        let mut response = self.agent.get(url).call().map_err(|e| TfsError::Download {
            url: url.to_string(),
            source: Box::new(e),
        })?;

        let total = response.body().content_length();
        let reader = response
            .body_mut()
            .with_config()
            .limit(MAX_ARCHIVE_BYTES)
            .reader();

        let mut bytes = Vec::new();
        let read = match label {
            Some(label) => {
                let progress = DownloadProgress::new(&self.ui, label, total);
                let result = progress.wrap_read(reader).read_to_end(&mut bytes);
                progress.finish();
                result
            }
            None => {
                let mut reader = reader;
                reader.read_to_end(&mut bytes)
            }
        };
        read.map_err(|e| TfsError::io(format!("reading response from {}", url), e))?;

        Ok(bytes)
    }
}

impl Fetcher for HashicorpReleases {
    fn fetch(&self, version: &Version) -> TfsResult<Vec<u8>> {
        let archive_name = self.archive_name(version);

        let sums = self.get(&self.checksums_url(version), None)?;
        let sums = String::from_utf8_lossy(&sums);
        let expected = expected_checksum(&sums, &archive_name)
            .ok_or_else(|| TfsError::ChecksumMissing(archive_name.clone()))?;

        let label = format!("{} {}", self.product, version);
        let archive = self.get(&self.archive_url(version), Some(&label))?;
        verify_checksum(&archive, expected, &archive_name)?;

        let binary = format!("{}{}", self.product, std::env::consts::EXE_SUFFIX);
        extract_binary(&archive, &binary)
    }
}

/// Look up `file` in a `sha256sum`-style listing
pub(crate) fn expected_checksum<'a>(sums: &'a str, file: &str) -> Option<&'a str> {
    sums.lines().find_map(|line| {
        let mut parts = line.split_whitespace();
        let digest = parts.next()?;
        let name = parts.next()?.trim_start_matches('*');
        (name == file).then_some(digest)
    })
}

pub(crate) fn verify_checksum(bytes: &[u8], expected: &str, file: &str) -> TfsResult<()> {
    let actual = hex::encode(Sha256::digest(bytes));
    if actual.eq_ignore_ascii_case(expected) {
        Ok(())
    } else {
        Err(TfsError::ChecksumMismatch {
            file: file.to_string(),
            expected: expected.to_string(),
            actual,
        })
    }
}

pub(crate) fn extract_binary(archive: &[u8], name: &str) -> TfsResult<Vec<u8>> {
    let mut zip = zip::ZipArchive::new(Cursor::new(archive)).map_err(|e| TfsError::Archive {
        reason: e.to_string(),
    })?;
    let mut entry = zip.by_name(name).map_err(|e| TfsError::Archive {
        reason: format!("{}: {}", name, e),
    })?;

    let mut binary = Vec::with_capacity(entry.size() as usize);
    entry
        .read_to_end(&mut binary)
        .map_err(|e| TfsError::Archive {
            reason: format!("{}: {}", name, e),
        })?;
    Ok(binary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn fetcher() -> HashicorpReleases {
        HashicorpReleases::new(
            "https://releases.hashicorp.com/",
            "terraform",
            Duration::from_secs(5),
        )
        .with_platform("linux", "amd64")
    }

    fn zip_with(name: &str, contents: &[u8]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);
        writer.start_file(name, options).unwrap();
        writer.write_all(contents).unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn release_urls() {
        let f = fetcher();
        let v = Version::new(1, 9, 8);
        assert_eq!(
            f.archive_url(&v),
            "https://releases.hashicorp.com/terraform/1.9.8/terraform_1.9.8_linux_amd64.zip"
        );
        assert_eq!(
            f.checksums_url(&v),
            "https://releases.hashicorp.com/terraform/1.9.8/terraform_1.9.8_SHA256SUMS"
        );
    }

    #[test]
    fn platform_uses_hashicorp_names() {
        let (os, arch) = platform();
        assert_ne!(os, "macos");
        assert_ne!(arch, "x86_64");
        assert_ne!(arch, "aarch64");
    }

    #[test]
    fn checksum_lookup() {
        let sums = "aaa  terraform_1.9.8_darwin_arm64.zip\nbbb  terraform_1.9.8_linux_amd64.zip\n";
        assert_eq!(
            expected_checksum(sums, "terraform_1.9.8_linux_amd64.zip"),
            Some("bbb")
        );
        assert_eq!(expected_checksum(sums, "terraform_1.9.8_windows_386.zip"), None);
    }

    #[test]
    fn checksum_verification() {
        let digest = hex::encode(Sha256::digest(b"payload"));
        assert!(verify_checksum(b"payload", &digest, "f.zip").is_ok());
        assert!(verify_checksum(b"payload", &digest.to_uppercase(), "f.zip").is_ok());
        assert!(matches!(
            verify_checksum(b"tampered", &digest, "f.zip"),
            Err(TfsError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn extract_named_entry() {
        let archive = zip_with("terraform", b"#!binary");
        assert_eq!(extract_binary(&archive, "terraform").unwrap(), b"#!binary");
        assert!(matches!(
            extract_binary(&archive, "tofu"),
            Err(TfsError::Archive { .. })
        ));
        assert!(extract_binary(b"not a zip", "terraform").is_err());
    }

    #[test]
    fn closures_are_fetchers() {
        let fetch = |v: &Version| -> TfsResult<Vec<u8>> { Ok(v.to_string().into_bytes()) };
        assert_eq!(fetch.fetch(&Version::new(1, 0, 0)).unwrap(), b"1.0.0");
    }
}
