//! The local release cache
//!
//! `LocalCache` owns one cache directory. Its view of the directory is a
//! snapshot taken by [`LocalCache::load`]; every operation that needs a
//! consistent view reloads first or expects the caller to have done so.

use super::release::{Activation, Release};
use super::{format_bytes, Retention, Strategy};
use crate::config::Config;
use crate::error::{TfsError, TfsResult};
use crate::fetch::Fetcher;
use crate::fs::{Filesystem, OsFilesystem};
use crate::version::{self, Constraint, Version};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Where the cache lives and how it is trimmed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSettings {
    /// Directory holding the release binaries
    pub directory: PathBuf,
    /// Cached files are named `<prefix><version>`
    pub file_name_prefix: String,
    /// Stable path (symlink) of the active release
    pub link: PathBuf,
    /// Automatic cleanup policy
    pub retention: Retention,
}

impl From<&Config> for CacheSettings {
    fn from(config: &Config) -> Self {
        Self {
            directory: config.cache.directory.clone(),
            file_name_prefix: config.cache.file_name_prefix.clone(),
            link: config.install.link_path(),
            retention: Retention {
                auto_clean: config.cache.auto_clean,
                history: config.cache.history,
                minor_versions: config.cache.minor_versions,
                patch_versions: config.cache.patch_versions,
            },
        }
    }
}

/// Result of [`LocalCache::prune`] and [`LocalCache::prune_until`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneReport {
    /// Number of files removed
    pub removed: usize,
    /// Bytes freed
    pub reclaimed: u64,
    /// Cache size after removal
    pub remaining: u64,
}

/// Result of [`LocalCache::auto_clean`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvictionReport {
    /// Versions whose artifact was deleted
    pub removed: Vec<Version>,
    /// Versions that should have been deleted but could not be
    pub failed: Vec<Version>,
}

/// Cache of Terraform releases in one directory
pub struct LocalCache {
    fs: Arc<dyn Filesystem>,
    settings: CacheSettings,
    releases: BTreeMap<Version, Release>,
    last: Option<Version>,
    active: Option<Version>,
    current: Option<Release>,
}

impl LocalCache {
    /// Cache on the real filesystem
    pub fn new(settings: CacheSettings) -> Self {
        Self::with_filesystem(settings, Arc::new(OsFilesystem))
    }

    /// Cache on a custom filesystem
    pub fn with_filesystem(settings: CacheSettings, fs: Arc<dyn Filesystem>) -> Self {
        Self {
            fs,
            settings,
            releases: BTreeMap::new(),
            last: None,
            active: None,
            current: None,
        }
    }

    pub fn filesystem(&self) -> &dyn Filesystem {
        &*self.fs
    }

    /// Rescan the cache directory.
    ///
    /// Every file matching the prefix must name a version; a single bad
    /// entry fails the whole load and leaves the previous snapshot intact.
    pub fn load(&mut self) -> TfsResult<()> {
        let dir = &self.settings.directory;
        let prefix = &self.settings.file_name_prefix;

        let files = self.fs.glob(dir, prefix).map_err(|e| {
            error!(cache_directory = %dir.display(), error = %e, "Failed to load cache data");
            TfsError::io(format!("scanning cache directory {}", dir.display()), e)
        })?;

        let mut releases = BTreeMap::new();
        let mut active = None;
        for path in files {
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                let shown = path.file_name().unwrap_or(path.as_os_str()).to_string_lossy();
                error!(file_name = %shown, "File name is not valid UTF-8");
                return Err(TfsError::CacheEntry {
                    file_name: shown.into_owned(),
                    reason: "file name is not valid UTF-8".to_string(),
                });
            };
            let raw = file_name.strip_prefix(prefix.as_str()).unwrap_or(file_name);
            let version = version::parse_version(raw).map_err(|e| {
                error!(file_name, error = %e, "Invalid file name");
                TfsError::CacheEntry {
                    file_name: file_name.to_string(),
                    reason: e.to_string(),
                }
            })?;

            let release = Release::from_file(dir.clone(), file_name.to_string(), version.clone());
            if release.is_active(&*self.fs, &self.settings.link) {
                active = Some(version.clone());
            }
            if let Some(existing) = releases.insert(version.clone(), release) {
                return Err(TfsError::CacheEntry {
                    file_name: file_name.to_string(),
                    reason: format!("same version as {}", existing.file_name()),
                });
            }
        }

        self.last = releases.keys().next_back().cloned();
        self.active = active;
        self.releases = releases;

        debug!(
            cache_directory = %dir.display(),
            releases = self.releases.len(),
            "Cache loaded"
        );
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.releases.is_empty()
    }

    pub fn len(&self) -> usize {
        self.releases.len()
    }

    /// Cached releases, oldest version first
    pub fn list(&self) -> Vec<&Release> {
        self.releases.values().collect()
    }

    /// Cached versions, oldest first
    pub fn versions(&self) -> Vec<Version> {
        self.releases.keys().cloned().collect()
    }

    /// Highest cached version
    pub fn last(&self) -> Option<&Release> {
        self.last.as_ref().and_then(|v| self.releases.get(v))
    }

    /// Release the activation link points at
    pub fn active(&self) -> Option<&Release> {
        self.active.as_ref().and_then(|v| self.releases.get(v))
    }

    /// Release installed during this invocation
    pub fn current(&self) -> Option<&Release> {
        self.current.as_ref()
    }

    /// Release value for `version`, reusing the cached file when present
    pub fn new_release(&self, version: Version) -> Release {
        match self.releases.get(&version) {
            Some(release) => release.clone(),
            None => Release::new(
                self.settings.directory.clone(),
                &self.settings.file_name_prefix,
                version,
            ),
        }
    }

    /// Make sure `release` is on disk and protect it from eviction
    pub fn install(&mut self, release: &Release, fetcher: &dyn Fetcher) -> TfsResult<bool> {
        let downloaded = release.install(&*self.fs, fetcher)?;

        let version = release.version().clone();
        if self.last.as_ref().map_or(true, |last| version > *last) {
            self.last = Some(version.clone());
        }
        self.releases.insert(version, release.clone());
        self.current = Some(release.clone());

        Ok(downloaded)
    }

    /// Point the activation link at `release`
    pub fn activate(&mut self, release: &Release) -> TfsResult<Activation> {
        let outcome = release.activate(&*self.fs, &self.settings.link)?;
        self.active = Some(release.version().clone());
        Ok(outcome)
    }

    /// Delete `release` from disk and from the snapshot
    pub fn remove(&mut self, release: &Release) -> TfsResult<()> {
        release.remove(&*self.fs, &self.settings.link)?;

        let version = release.version();
        if self.releases.get(version) == Some(release) {
            self.releases.remove(version);
        }
        if self.active.as_ref() == Some(version) {
            self.active = None;
        }
        if self.last.as_ref() == Some(version) {
            self.last = self.releases.keys().next_back().cloned();
        }
        if release.same_as(self.current.as_ref()) {
            self.current = None;
        }
        Ok(())
    }

    /// Total size of the cached releases (reloads first)
    pub fn size(&mut self) -> TfsResult<u64> {
        self.load()?;

        let mut total = 0;
        for release in self.releases.values() {
            total += release.size(&*self.fs).inspect_err(|e| {
                error!(cache_directory = %self.settings.directory.display(), error = %e, "Failed to get cache size");
            })?;
        }
        Ok(total)
    }

    /// Remove every cached release
    pub fn prune(&mut self) -> TfsResult<PruneReport> {
        self.prune_where(|_| true)
    }

    /// Remove every cached release older than `version`
    pub fn prune_until(&mut self, version: &Version) -> TfsResult<PruneReport> {
        self.prune_where(|release| release.version() < version)
    }

    fn prune_where(&mut self, doomed: impl Fn(&Release) -> bool) -> TfsResult<PruneReport> {
        let candidates: Vec<Release> = self
            .releases
            .values()
            .filter(|release| doomed(release))
            .cloned()
            .collect();

        let mut report = PruneReport::default();
        for release in candidates {
            let size = release.size(&*self.fs)?;
            self.remove(&release)?;
            report.removed += 1;
            report.reclaimed += size;
        }
        report.remaining = self.size()?;

        info!(
            cache_directory = %self.settings.directory.display(),
            cache_size = %format_bytes(report.remaining),
            reclaimed_space = %format_bytes(report.reclaimed),
            removed = report.removed,
            "Removed {} file(s)",
            report.removed
        );
        Ok(report)
    }

    /// Pick the version a raw constraint asks for.
    ///
    /// - empty input: `None`
    /// - an exact version: that version, cached or not
    /// - a constraint: the highest cached match, or else the lowest version
    ///   the constraint allows (to be downloaded)
    pub fn resolve_version(&self, raw: &str) -> TfsResult<Option<Version>> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }

        if let Ok(exact) = version::parse_version(raw) {
            debug!(version = %exact, "Exact version requested");
            return Ok(Some(exact));
        }

        let constraint = Constraint::parse(raw)?;

        if let Some(best) = self.best_match(&constraint) {
            debug!(constraint = raw, version = %best, "Using cached release");
            return Ok(Some(best.clone()));
        }

        match constraint.minimum() {
            Some(minimum) => {
                info!(constraint = raw, version = %minimum, "No cached release matches, selecting lowest allowed version");
                Ok(Some(minimum))
            }
            None => Err(TfsError::Unsatisfiable {
                constraint: raw.to_string(),
            }),
        }
    }

    /// Highest cached version satisfying `constraint`
    pub fn best_match(&self, constraint: &Constraint) -> Option<&Version> {
        self.releases
            .keys()
            .rev()
            .find(|version| constraint.matches(version))
    }

    /// Trim the cache according to the retention settings.
    ///
    /// The release installed in this invocation is never removed. Failures
    /// are logged and skipped; cleanup never fails the command.
    pub fn auto_clean(&mut self) -> EvictionReport {
        let retention = self.settings.retention;
        let mut report = EvictionReport::default();

        if !retention.auto_clean || self.is_empty() {
            debug!("Cache cleanup disabled or nothing cached");
            return report;
        }

        if let Err(e) = self.load() {
            warn!(error = %e, "Skipping cache cleanup");
            return report;
        }

        let sorted = self.list();
        let candidates: Vec<Release> = match retention.strategy() {
            Strategy::Grouped { minors, patches } => {
                grouped_candidates(&sorted, minors, patches)
            }
            Strategy::Count { keep } => count_candidates(&sorted, keep),
        };

        for release in candidates {
            if release.same_as(self.current.as_ref()) {
                debug!(version = %release.version(), "Keeping release in use");
                continue;
            }
            let version = release.version().clone();
            match self.remove(&release) {
                Ok(()) => {
                    info!(version = %version, "Evicted release from cache");
                    report.removed.push(version);
                }
                Err(e) => {
                    warn!(version = %version, error = %e, "Failed to evict release");
                    report.failed.push(version);
                }
            }
        }

        report
    }
}

/// Oldest releases beyond the `keep` most recent ones
fn count_candidates(sorted: &[&Release], keep: usize) -> Vec<Release> {
    let excess = sorted.len().saturating_sub(keep);
    sorted[..excess].iter().map(|r| (*r).clone()).collect()
}

/// Releases outside the `minors` newest `major.minor` groups, plus the
/// oldest releases beyond `patches` within each surviving group
fn grouped_candidates(sorted: &[&Release], minors: usize, patches: usize) -> Vec<Release> {
    let mut groups: BTreeMap<(u64, u64), Vec<&Release>> = BTreeMap::new();
    for &release in sorted {
        let v = release.version();
        groups.entry((v.major, v.minor)).or_default().push(release);
    }

    let excess_groups = groups.len().saturating_sub(minors);
    let mut doomed = Vec::new();
    for (index, group) in groups.into_values().enumerate() {
        if index < excess_groups {
            doomed.extend(group.into_iter().cloned());
        } else {
            let excess = group.len().saturating_sub(patches);
            doomed.extend(group[..excess].iter().map(|r| (*r).clone()));
        }
    }
    doomed
}
