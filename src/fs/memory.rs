//! In-memory filesystem
//!
//! Paths are treated as already normalized (no `..`, no relative
//! components). Only the last component of a path is followed when it is
//! a symlink; symlinked directories are not supported.

use super::{matches_prefix, FileStat, Filesystem};
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::SystemTime;

const MAX_LINK_HOPS: usize = 40;

#[derive(Debug, Clone)]
enum Node {
    Dir,
    File { data: Vec<u8>, modified: SystemTime },
    Symlink(PathBuf),
}

/// Filesystem kept entirely in memory
#[derive(Debug, Default)]
pub struct MemoryFilesystem {
    nodes: Mutex<BTreeMap<PathBuf, Node>>,
    failing_removals: Mutex<HashSet<PathBuf>>,
    symlinks_created: AtomicUsize,
}

impl MemoryFilesystem {
    pub fn new() -> Self {
        Self::default()
    }

    fn nodes(&self) -> MutexGuard<'_, BTreeMap<PathBuf, Node>> {
        self.nodes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create a file, along with its parent directories
    pub fn add_file(&self, path: impl AsRef<Path>, contents: &[u8]) {
        let path = path.as_ref();
        let mut nodes = self.nodes();
        if let Some(parent) = path.parent() {
            insert_dirs(&mut nodes, parent);
        }
        nodes.insert(
            path.to_path_buf(),
            Node::File {
                data: contents.to_vec(),
                modified: SystemTime::now(),
            },
        );
    }

    /// Whether an entry (file, directory or link) exists at `path`
    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.nodes().contains_key(path.as_ref())
    }

    /// File contents, if `path` is a regular file
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        match self.nodes().get(path.as_ref()) {
            Some(Node::File { data, .. }) => Some(data.clone()),
            _ => None,
        }
    }

    /// Raw target of the link at `path`
    pub fn read_link(&self, path: impl AsRef<Path>) -> Option<PathBuf> {
        match self.nodes().get(path.as_ref()) {
            Some(Node::Symlink(target)) => Some(target.clone()),
            _ => None,
        }
    }

    /// Number of symlinks created so far
    pub fn symlinks_created(&self) -> usize {
        self.symlinks_created.load(Ordering::SeqCst)
    }

    /// Make every later `remove_file(path)` fail with `PermissionDenied`
    pub fn fail_removal_of(&self, path: impl AsRef<Path>) {
        self.failing_removals
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.as_ref().to_path_buf());
    }
}

fn insert_dirs(nodes: &mut BTreeMap<PathBuf, Node>, dir: &Path) {
    for ancestor in dir.ancestors() {
        if ancestor.as_os_str().is_empty() {
            continue;
        }
        nodes.entry(ancestor.to_path_buf()).or_insert(Node::Dir);
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("{}: no such file or directory", path.display()),
    )
}

fn parent_is_dir(nodes: &BTreeMap<PathBuf, Node>, path: &Path) -> io::Result<()> {
    match path.parent() {
        None => Ok(()),
        Some(parent) if parent.as_os_str().is_empty() || parent == Path::new("/") => Ok(()),
        Some(parent) => match nodes.get(parent) {
            Some(Node::Dir) => Ok(()),
            Some(_) => Err(io::Error::other(format!(
                "{}: not a directory",
                parent.display()
            ))),
            None => Err(not_found(parent)),
        },
    }
}

fn follow(nodes: &BTreeMap<PathBuf, Node>, path: &Path) -> io::Result<PathBuf> {
    let mut current = path.to_path_buf();
    for _ in 0..MAX_LINK_HOPS {
        match nodes.get(&current) {
            Some(Node::Symlink(target)) => {
                current = match current.parent() {
                    Some(parent) if target.is_relative() => parent.join(target),
                    _ => target.clone(),
                };
            }
            Some(_) => return Ok(current),
            None => return Err(not_found(&current)),
        }
    }
    Err(io::Error::other(format!(
        "{}: too many levels of symbolic links",
        path.display()
    )))
}

impl Filesystem for MemoryFilesystem {
    fn metadata(&self, path: &Path) -> io::Result<FileStat> {
        let nodes = self.nodes();
        let resolved = follow(&nodes, path)?;
        match nodes.get(&resolved) {
            Some(Node::File { data, modified }) => Ok(FileStat {
                len: data.len() as u64,
                modified: Some(*modified),
                is_file: true,
            }),
            Some(_) => Ok(FileStat {
                len: 0,
                modified: None,
                is_file: false,
            }),
            None => Err(not_found(path)),
        }
    }

    fn entry_exists(&self, path: &Path) -> bool {
        self.contains(path)
    }

    fn glob(&self, dir: &Path, prefix: &str) -> io::Result<Vec<PathBuf>> {
        let nodes = self.nodes();
        match nodes.get(dir) {
            None => return Ok(Vec::new()),
            Some(Node::Dir) => {}
            Some(_) => {
                return Err(io::Error::other(format!(
                    "{}: not a directory",
                    dir.display()
                )))
            }
        }

        Ok(nodes
            .keys()
            .filter(|path| path.parent() == Some(dir))
            .filter(|path| {
                path.file_name()
                    .is_some_and(|name| matches_prefix(&name.to_string_lossy(), prefix))
            })
            .cloned()
            .collect())
    }

    fn write_executable(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let mut nodes = self.nodes();
        parent_is_dir(&nodes, path)?;
        if let Some(Node::Dir) = nodes.get(path) {
            return Err(io::Error::other(format!("{}: is a directory", path.display())));
        }
        nodes.insert(
            path.to_path_buf(),
            Node::File {
                data: contents.to_vec(),
                modified: SystemTime::now(),
            },
        );
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        let mut nodes = self.nodes();
        parent_is_dir(&nodes, to)?;
        let node = nodes.remove(from).ok_or_else(|| not_found(from))?;
        nodes.insert(to.to_path_buf(), node);
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        let failing = self
            .failing_removals
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(path);
        if failing {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("{}: permission denied", path.display()),
            ));
        }

        let mut nodes = self.nodes();
        match nodes.get(path) {
            None => Err(not_found(path)),
            Some(Node::Dir) => Err(io::Error::other(format!(
                "{}: is a directory",
                path.display()
            ))),
            Some(_) => {
                nodes.remove(path);
                Ok(())
            }
        }
    }

    fn symlink(&self, target: &Path, link: &Path) -> io::Result<()> {
        let mut nodes = self.nodes();
        parent_is_dir(&nodes, link)?;
        if nodes.contains_key(link) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{}: file exists", link.display()),
            ));
        }
        nodes.insert(link.to_path_buf(), Node::Symlink(target.to_path_buf()));
        self.symlinks_created.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn resolve(&self, path: &Path) -> io::Result<PathBuf> {
        follow(&self.nodes(), path)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let mut nodes = self.nodes();
        for ancestor in path.ancestors() {
            match nodes.get(ancestor) {
                Some(Node::Dir) | None => {}
                Some(_) => {
                    return Err(io::Error::other(format!(
                        "{}: not a directory",
                        ancestor.display()
                    )))
                }
            }
        }
        insert_dirs(&mut nodes, path);
        Ok(())
    }
}
