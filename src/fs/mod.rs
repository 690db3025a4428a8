//! Filesystem capability used by the cache
//!
//! The cache only touches the disk through [`Filesystem`], so its logic
//! can run against [`MemoryFilesystem`] in tests and against
//! [`OsFilesystem`] everywhere else.

pub mod memory;

pub use memory::MemoryFilesystem;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// What the cache needs to know about a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    /// Size in bytes
    pub len: u64,
    /// Last modification time, when the platform reports one
    pub modified: Option<SystemTime>,
    /// Regular file (as opposed to a directory)
    pub is_file: bool,
}

/// Narrow set of filesystem operations used by the cache
pub trait Filesystem: Send + Sync {
    /// Stat a path, following symlinks
    fn metadata(&self, path: &Path) -> io::Result<FileStat>;

    /// Whether something exists at `path`, following symlinks
    fn exists(&self, path: &Path) -> bool {
        self.metadata(path).is_ok()
    }

    /// Whether an entry exists at `path` without following symlinks
    /// (true for dangling links)
    fn entry_exists(&self, path: &Path) -> bool;

    /// Entries of `dir` whose name starts with `prefix`, sorted.
    ///
    /// A missing directory yields no entries. Hidden entries are skipped
    /// unless the prefix itself starts with a dot. Names that are not valid
    /// UTF-8 are still returned when their readable part carries the prefix.
    fn glob(&self, dir: &Path, prefix: &str) -> io::Result<Vec<PathBuf>>;

    /// Write a file and mark it executable
    fn write_executable(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    /// Rename a file, replacing the destination
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Remove a file or a symlink (never its target)
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Create `link` pointing at `target`
    fn symlink(&self, target: &Path, link: &Path) -> io::Result<()>;

    /// Follow symlinks and return the final path
    fn resolve(&self, path: &Path) -> io::Result<PathBuf>;

    /// Create a directory and all of its parents
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;
}

/// Whether a directory entry name matches a glob-style `<prefix>*`
pub(crate) fn matches_prefix(name: &str, prefix: &str) -> bool {
    if name.starts_with('.') && !prefix.starts_with('.') {
        return false;
    }
    name.starts_with(prefix)
}

/// The real filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFilesystem;

impl Filesystem for OsFilesystem {
    fn metadata(&self, path: &Path) -> io::Result<FileStat> {
        let meta = fs::metadata(path)?;
        Ok(FileStat {
            len: meta.len(),
            modified: meta.modified().ok(),
            is_file: meta.is_file(),
        })
    }

    fn entry_exists(&self, path: &Path) -> bool {
        fs::symlink_metadata(path).is_ok()
    }

    fn glob(&self, dir: &Path, prefix: &str) -> io::Result<Vec<PathBuf>> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut matches = Vec::new();
        for entry in entries {
            let entry = entry?;
            if matches_prefix(&entry.file_name().to_string_lossy(), prefix) {
                matches.push(entry.path());
            }
        }
        matches.sort();
        Ok(matches)
    }

    fn write_executable(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        fs::write(path, contents)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o755))?;
        }

        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn symlink(&self, target: &Path, link: &Path) -> io::Result<()> {
        #[cfg(unix)]
        {
            std::os::unix::fs::symlink(target, link)
        }
        #[cfg(windows)]
        {
            std::os::windows::fs::symlink_file(target, link)
        }
        #[cfg(not(any(unix, windows)))]
        {
            let _ = (target, link);
            Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "symlinks are not supported on this platform",
            ))
        }
    }

    fn resolve(&self, path: &Path) -> io::Result<PathBuf> {
        fs::canonicalize(path)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }
}
