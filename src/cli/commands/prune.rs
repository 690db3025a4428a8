//! Prune commands - remove cached releases

use super::{blocking, open_cache};
use crate::cache::{format_bytes, CacheSettings, PruneReport};
use crate::cli::args::{PruneArgs, PruneUntilArgs};
use crate::config::Config;
use crate::error::TfsResult;
use crate::ui::{self, TaskSpinner, UiContext};

/// Execute the prune command
pub async fn execute(args: PruneArgs, config: &Config) -> TfsResult<()> {
    let ctx = UiContext::detect().with_auto_yes(args.yes);
    let settings = CacheSettings::from(config);

    let probe = settings.clone();
    let (count, size) = blocking(move || {
        let mut cache = open_cache(probe)?;
        let size = cache.size()?;
        Ok((cache.len(), size))
    })
    .await?;

    if count == 0 {
        ui::step_info(&ctx, "No cached Terraform releases");
        return Ok(());
    }

    let question = format!(
        "Remove {} cached release(s) ({})?",
        count,
        format_bytes(size)
    );
    if !ui::confirm(&ctx, &question, false).await? {
        ui::step_info(&ctx, "Nothing removed");
        return Ok(());
    }

    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start("Removing cached releases...");
    let result = blocking(move || open_cache(settings)?.prune()).await;

    match result {
        Ok(report) => {
            spinner.stop(&format!("Removed {} release(s)", report.removed));
            print_report(&ctx, &report);
            Ok(())
        }
        Err(e) => {
            spinner.stop_error("Failed to prune cache");
            Err(e)
        }
    }
}

/// Execute the prune-until command
pub async fn execute_until(args: PruneUntilArgs, config: &Config) -> TfsResult<()> {
    let ctx = UiContext::detect();
    let settings = CacheSettings::from(config);
    let floor = args.floor.clone();

    let report = blocking(move || open_cache(settings)?.prune_until(&floor)).await?;

    if report.removed == 0 {
        ui::step_info(
            &ctx,
            &format!("No cached release older than {}", args.floor),
        );
        return Ok(());
    }

    ui::step_ok(&ctx, &format!("Removed {} release(s)", report.removed));
    print_report(&ctx, &report);
    Ok(())
}

fn print_report(ctx: &UiContext, report: &PruneReport) {
    ui::key_value(ctx, "Reclaimed", &format_bytes(report.reclaimed));
    ui::key_value(ctx, "Cache size", &format_bytes(report.remaining));
}
