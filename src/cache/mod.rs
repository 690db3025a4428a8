//! Local cache of Terraform releases
//!
//! Every cached release is one executable file named `<prefix><version>`
//! in the cache directory. The active release is the one the activation
//! link (`<bin_directory>/<binary_name>`) points at.
//!
//! # Retention
//!
//! | Setting | Strategy |
//! |---------|----------|
//! | `minor_versions` and `patch_versions` both set | keep the newest N `major.minor` groups, newest M patches in each |
//! | otherwise | keep the newest `history` releases |
//!
//! The release installed by the running command is always kept.

pub mod local;
pub mod release;

pub use local::{CacheSettings, EvictionReport, LocalCache, PruneReport};
pub use release::{Activation, Release};

/// Automatic cleanup settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Retention {
    pub auto_clean: bool,
    pub history: usize,
    pub minor_versions: usize,
    pub patch_versions: usize,
}

impl Default for Retention {
    fn default() -> Self {
        Self {
            auto_clean: true,
            history: 8,
            minor_versions: 0,
            patch_versions: 0,
        }
    }
}

/// Eviction strategy derived from [`Retention`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Keep the `keep` highest versions
    Count { keep: usize },
    /// Keep `minors` groups of `patches` releases each
    Grouped { minors: usize, patches: usize },
}

impl Retention {
    pub fn strategy(&self) -> Strategy {
        if self.minor_versions > 0 && self.patch_versions > 0 {
            Strategy::Grouped {
                minors: self.minor_versions,
                patches: self.patch_versions,
            }
        } else {
            Strategy::Count { keep: self.history }
        }
    }
}

/// Format bytes as human-readable string
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_bytes_units() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(13), "13 B");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(88 * 1024 * 1024), "88.0 MB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3.0 GB");
    }

    #[test]
    fn strategy_selection() {
        assert_eq!(Retention::default().strategy(), Strategy::Count { keep: 8 });

        let only_minor = Retention {
            minor_versions: 2,
            ..Retention::default()
        };
        assert_eq!(only_minor.strategy(), Strategy::Count { keep: 8 });

        let grouped = Retention {
            minor_versions: 2,
            patch_versions: 3,
            ..Retention::default()
        };
        assert_eq!(
            grouped.strategy(),
            Strategy::Grouped {
                minors: 2,
                patches: 3
            }
        );
    }
}
