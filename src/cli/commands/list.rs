//! List command - show cached releases

use super::{blocking, open_cache};
use crate::cache::{format_bytes, CacheSettings, LocalCache};
use crate::cli::args::{ListArgs, OutputFormat};
use crate::config::Config;
use crate::error::TfsResult;
use crate::ui::{self, UiContext};
use chrono::{DateTime, Utc};
use console::style;
use serde::Serialize;
use std::path::PathBuf;

/// One row of the listing
#[derive(Debug, Clone, Serialize)]
pub struct CachedRelease {
    pub version: String,
    pub path: PathBuf,
    pub size: u64,
    pub installed_at: Option<DateTime<Utc>>,
    pub active: bool,
}

/// Execute the list command
pub async fn execute(args: ListArgs, config: &Config) -> TfsResult<()> {
    let settings = CacheSettings::from(config);
    let releases = blocking(move || collect(&open_cache(settings)?)).await?;

    if releases.is_empty() {
        match args.format {
            OutputFormat::Json => println!("[]"),
            OutputFormat::Plain => {}
            OutputFormat::Table => {
                let ctx = UiContext::detect();
                ui::step_info(&ctx, "No cached Terraform releases");
            }
        }
        return Ok(());
    }

    match args.format {
        OutputFormat::Table => print_table(&releases),
        OutputFormat::Json => print_json(&releases)?,
        OutputFormat::Plain => print_plain(&releases),
    }

    Ok(())
}

fn collect(cache: &LocalCache) -> TfsResult<Vec<CachedRelease>> {
    let fs = cache.filesystem();
    let active = cache.active();

    cache
        .list()
        .into_iter()
        .map(|release| -> TfsResult<CachedRelease> {
            Ok(CachedRelease {
                version: release.version().to_string(),
                path: release.path(),
                size: release.size(fs)?,
                installed_at: release.modified(fs)?,
                active: release.same_as(active),
            })
        })
        .collect()
}

fn print_table(releases: &[CachedRelease]) {
    println!(
        "  {:<12} {:<10} {:<17}",
        style("VERSION").bold(),
        style("SIZE").bold(),
        style("INSTALLED").bold()
    );
    println!("  {}", "-".repeat(41));

    for release in releases {
        let marker = if release.active {
            style("*").green().bold()
        } else {
            style(" ")
        };
        let version = format!("{:<12}", release.version);
        let version = if release.active {
            style(version).green()
        } else {
            style(version)
        };
        let installed = release
            .installed_at
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());

        println!(
            "{} {} {:<10} {:<17}",
            marker,
            version,
            format_bytes(release.size),
            installed
        );
    }

    let total: u64 = releases.iter().map(|r| r.size).sum();
    println!();
    println!("{} release(s), {}", releases.len(), format_bytes(total));
}

fn print_json(releases: &[CachedRelease]) -> TfsResult<()> {
    let json = serde_json::to_string_pretty(releases)?;
    println!("{}", json);
    Ok(())
}

fn print_plain(releases: &[CachedRelease]) {
    for release in releases {
        println!("{}", release.version);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Retention;
    use crate::fs::{Filesystem, MemoryFilesystem};
    use std::path::Path;
    use std::sync::Arc;

    #[test]
    fn collect_marks_active_release() {
        let fs = Arc::new(MemoryFilesystem::new());
        fs.add_file("/cache/terraform_1.9.8", b"12345");
        fs.add_file("/cache/terraform_1.10.0", b"123");
        fs.create_dir_all(Path::new("/bin")).unwrap();
        fs.symlink(Path::new("/cache/terraform_1.10.0"), Path::new("/bin/terraform"))
            .unwrap();

        let settings = CacheSettings {
            directory: PathBuf::from("/cache"),
            file_name_prefix: "terraform_".to_string(),
            link: PathBuf::from("/bin/terraform"),
            retention: Retention::default(),
        };
        let mut cache = LocalCache::with_filesystem(settings, fs);
        cache.load().unwrap();

        let rows = collect(&cache).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].version, "1.9.8");
        assert_eq!(rows[0].size, 5);
        assert!(!rows[0].active);
        assert_eq!(rows[1].version, "1.10.0");
        assert!(rows[1].active);
        assert!(rows[1].installed_at.is_some());
    }

    #[test]
    fn json_rows_serialize() {
        let row = CachedRelease {
            version: "1.9.8".to_string(),
            path: PathBuf::from("/cache/terraform_1.9.8"),
            size: 42,
            installed_at: None,
            active: true,
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["version"], "1.9.8");
        assert_eq!(json["active"], true);
        assert!(json["installed_at"].is_null());
    }
}
