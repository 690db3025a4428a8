//! Default command - install and activate a Terraform release

use super::{blocking, open_cache};
use crate::cache::{Activation, CacheSettings, EvictionReport};
use crate::config::Config;
use crate::error::{TfsError, TfsResult};
use crate::fetch::{Fetcher, HashicorpReleases};
use crate::project;
use crate::ui::{self, UiContext};
use crate::version::Version;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

const PRODUCT: &str = "terraform";

/// What a switch did
#[derive(Debug)]
enum Outcome {
    /// Neither an argument nor the project named a version
    NoConstraint,
    Switched {
        version: Version,
        downloaded: bool,
        activation: Activation,
        evicted: EvictionReport,
    },
}

/// Execute the default command
pub async fn execute(constraint: Option<String>, config: &Config) -> TfsResult<()> {
    let ctx = UiContext::detect();
    let settings = CacheSettings::from(config);
    let fetcher = HashicorpReleases::new(
        &config.install.download_url,
        PRODUCT,
        Duration::from_secs(config.install.timeout_secs),
    )
    .with_ui(ctx.clone());
    let cwd =
        std::env::current_dir().map_err(|e| TfsError::io("getting current directory", e))?;

    let outcome = blocking(move || switch(settings, constraint, cwd, &fetcher)).await?;
    report(&ctx, outcome);
    Ok(())
}

fn switch(
    settings: CacheSettings,
    constraint: Option<String>,
    cwd: PathBuf,
    fetcher: &dyn Fetcher,
) -> TfsResult<Outcome> {
    let mut cache = open_cache(settings)?;

    let raw = match constraint {
        Some(raw) => raw,
        None => match project::required_version(&cwd)? {
            Some(raw) => raw,
            None => return Ok(Outcome::NoConstraint),
        },
    };
    debug!(constraint = %raw, "Resolving Terraform version");

    let Some(version) = cache.resolve_version(&raw)? else {
        return Ok(Outcome::NoConstraint);
    };

    let release = cache.new_release(version.clone());
    let downloaded = cache.install(&release, fetcher)?;
    let activation = cache.activate(&release)?;
    let evicted = cache.auto_clean();

    Ok(Outcome::Switched {
        version,
        downloaded,
        activation,
        evicted,
    })
}

fn report(ctx: &UiContext, outcome: Outcome) {
    let Outcome::Switched {
        version,
        downloaded,
        activation,
        evicted,
    } = outcome
    else {
        ui::step_warn_hint(
            ctx,
            "No Terraform version constraint found",
            "Pass a version (e.g. tfs 1.9.8) or run tfs in a directory with a required_version setting",
        );
        return;
    };

    if downloaded {
        ui::step_ok_detail(ctx, &format!("Installed Terraform {}", version), "downloaded");
    }
    match activation {
        Activation::Activated => ui::step_ok(ctx, &format!("Terraform {} is now active", version)),
        Activation::AlreadyActive => {
            ui::step_info(ctx, &format!("Terraform {} is already active", version))
        }
    }

    for removed in &evicted.removed {
        ui::remark(ctx, &format!("Evicted Terraform {} from cache", removed));
    }
    for failed in &evicted.failed {
        ui::step_warn(ctx, &format!("Could not evict Terraform {} from cache", failed));
    }
}
