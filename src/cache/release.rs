//! A single Terraform release in the local cache
//!
//! A `Release` is a plain value: it names the artifact file for one
//! version and knows how to install, activate, size and remove it. It is
//! rebuilt freely (every cache scan creates new values), so identity is the
//! artifact location, never the value itself.

use crate::error::{TfsError, TfsResult};
use crate::fetch::Fetcher;
use crate::fs::Filesystem;
use chrono::{DateTime, Utc};
use semver::Version;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Outcome of [`Release::activate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// The link was (re)created
    Activated,
    /// The link already pointed at this release
    AlreadyActive,
}

/// One version's artifact in a cache directory
#[derive(Debug, Clone)]
pub struct Release {
    version: Version,
    directory: PathBuf,
    file_name: String,
}

impl PartialEq for Release {
    fn eq(&self, other: &Self) -> bool {
        self.directory == other.directory && self.file_name == other.file_name
    }
}

impl Eq for Release {}

impl Release {
    /// Release for `version`, stored as `<prefix><version>` in `directory`
    pub fn new(directory: impl Into<PathBuf>, prefix: &str, version: Version) -> Self {
        let file_name = format!("{}{}", prefix, version);
        Self {
            version,
            directory: directory.into(),
            file_name,
        }
    }

    /// Release backed by an existing file, whatever its exact spelling
    pub(crate) fn from_file(directory: PathBuf, file_name: String, version: Version) -> Self {
        Self {
            version,
            directory,
            file_name,
        }
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Full path of the artifact
    pub fn path(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }

    /// Whether both values denote the same cached artifact
    pub fn same_as(&self, other: Option<&Release>) -> bool {
        other.is_some_and(|other| self == other)
    }

    /// Whether the artifact is present
    pub fn is_installed(&self, fs: &dyn Filesystem) -> bool {
        fs.exists(&self.path())
    }

    /// Whether `link` currently resolves to this artifact
    pub fn is_active(&self, fs: &dyn Filesystem, link: &Path) -> bool {
        let Ok(target) = fs.resolve(link) else {
            return false;
        };
        fs.resolve(&self.path())
            .map(|artifact| artifact == target)
            .unwrap_or(false)
    }

    /// Fetch the artifact unless it is already cached.
    ///
    /// The download is staged in a hidden file next to the target and
    /// renamed into place, so the target path never holds a partial file.
    /// Returns whether a download happened.
    pub fn install(&self, fs: &dyn Filesystem, fetcher: &dyn Fetcher) -> TfsResult<bool> {
        let target = self.path();

        if fs.exists(&target) {
            debug!(version = %self.version, path = %target.display(), "Release already cached");
            return Ok(false);
        }

        fs.create_dir_all(&self.directory).map_err(|e| {
            TfsError::io(
                format!("creating cache directory {}", self.directory.display()),
                e,
            )
        })?;

        info!(version = %self.version, "Downloading Terraform");
        let bytes = fetcher.fetch(&self.version).inspect_err(|e| {
            error!(version = %self.version, error = %e, "Download failed");
        })?;

        let staging = self
            .directory
            .join(format!(".{}.{}.tmp", self.file_name, Uuid::new_v4()));

        if let Err(e) = fs.write_executable(&staging, &bytes) {
            let _ = fs.remove_file(&staging);
            return Err(TfsError::io(
                format!("writing {}", staging.display()),
                e,
            ));
        }
        if let Err(e) = fs.rename(&staging, &target) {
            let _ = fs.remove_file(&staging);
            return Err(TfsError::io(
                format!("moving download to {}", target.display()),
                e,
            ));
        }

        debug!(version = %self.version, path = %target.display(), bytes = bytes.len(), "Release cached");
        Ok(true)
    }

    /// Point `link` at this artifact.
    ///
    /// Creates the link's directory when missing. Calling it again while
    /// the link already resolves here changes nothing.
    pub fn activate(&self, fs: &dyn Filesystem, link: &Path) -> TfsResult<Activation> {
        let target = self.path();

        if let Some(bin_dir) = link.parent() {
            if !fs.exists(bin_dir) {
                info!(path = %bin_dir.display(), "Creating local bin directory");
                fs.create_dir_all(bin_dir).map_err(|e| {
                    TfsError::io(format!("creating directory {}", bin_dir.display()), e)
                })?;
                warn!(
                    path = %bin_dir.display(),
                    "Make sure to add the local bin directory to the PATH environment variable"
                );
            }
        }

        if self.is_active(fs, link) {
            info!(version = %self.version, "Version is already active");
            return Ok(Activation::AlreadyActive);
        }

        if fs.entry_exists(link) {
            match fs.remove_file(link) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(TfsError::io(
                        format!("removing previous link {}", link.display()),
                        e,
                    ))
                }
            }
        }

        fs.symlink(&target, link).map_err(|e| {
            error!(symlink = %link.display(), target = %target.display(), error = %e, "Failed to create symlink");
            TfsError::io(format!("creating symlink {}", link.display()), e)
        })?;

        info!(version = %self.version, symlink = %link.display(), "New active version");
        Ok(Activation::Activated)
    }

    /// Delete the artifact, and `link` first when it points here
    pub fn remove(&self, fs: &dyn Filesystem, link: &Path) -> TfsResult<()> {
        let target = self.path();

        if self.is_active(fs, link) {
            debug!(symlink = %link.display(), "Removing link to deleted release");
            if let Err(e) = fs.remove_file(link) {
                warn!(symlink = %link.display(), error = %e, "Failed to remove symlink");
            }
        }

        fs.remove_file(&target).map_err(|e| {
            error!(version = %self.version, path = %target.display(), error = %e, "Failed to remove Terraform binary");
            TfsError::io(format!("removing {}", target.display()), e)
        })
    }

    /// Artifact size in bytes
    pub fn size(&self, fs: &dyn Filesystem) -> TfsResult<u64> {
        let target = self.path();
        fs.metadata(&target)
            .map(|stat| stat.len)
            .map_err(|e| TfsError::io(format!("reading metadata of {}", target.display()), e))
    }

    /// When the artifact was written, if the filesystem knows
    pub fn modified(&self, fs: &dyn Filesystem) -> TfsResult<Option<DateTime<Utc>>> {
        let target = self.path();
        fs.metadata(&target)
            .map(|stat| stat.modified.map(DateTime::<Utc>::from))
            .map_err(|e| TfsError::io(format!("reading metadata of {}", target.display()), e))
    }
}
