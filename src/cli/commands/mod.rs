//! CLI command implementations
//!
//! The cache and the downloader are synchronous; commands run them on the
//! blocking pool and keep prompts and config I/O on the async side.

pub mod config;
pub mod list;
pub mod prune;
pub mod use_version;

pub use config::execute as config;
pub use list::execute as list;
pub use prune::execute as prune;
pub use prune::execute_until as prune_until;
pub use use_version::execute as use_version;

use crate::cache::{CacheSettings, LocalCache};
use crate::error::{TfsError, TfsResult};

/// Run a synchronous cache task on the blocking pool
pub(crate) async fn blocking<T, F>(task: F) -> TfsResult<T>
where
    F: FnOnce() -> TfsResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| TfsError::Internal(format!("Background task failed: {}", e)))?
}

/// Cache for `settings`, already loaded
pub(crate) fn open_cache(settings: CacheSettings) -> TfsResult<LocalCache> {
    let mut cache = LocalCache::new(settings);
    cache.load()?;
    Ok(cache)
}
