//! Progress indicators with CI fallback

use super::context::UiContext;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Read;
use std::time::Duration;

/// A task spinner with CI fallback
pub struct TaskSpinner {
    spinner: Option<cliclack::ProgressBar>,
    interactive: bool,
}

impl TaskSpinner {
    pub fn new(ctx: &UiContext) -> Self {
        Self {
            spinner: None,
            interactive: ctx.use_fancy_output(),
        }
    }

    pub fn start(&mut self, message: &str) {
        if self.interactive {
            let spinner = cliclack::spinner();
            spinner.start(message);
            self.spinner = Some(spinner);
        } else {
            println!("{} {}", style("...").dim(), message);
        }
    }

    /// Stop with success message
    pub fn stop(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.stop(message);
        } else {
            println!("{} {}", style("[OK]").green(), message);
        }
    }

    /// Stop with error message
    pub fn stop_error(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.error(message);
        } else {
            println!("{} {}", style("[FAIL]").red(), message);
        }
    }
}

/// Byte progress for a release download.
///
/// Draws an indicatif bar in interactive mode (a byte counter when the
/// server sends no length) and a single line in CI.
pub struct DownloadProgress {
    bar: Option<ProgressBar>,
}

impl DownloadProgress {
    pub fn new(ctx: &UiContext, label: &str, total: Option<u64>) -> Self {
        let bar = if ctx.use_fancy_output() {
            let (bar, template) = match total {
                Some(len) => (
                    ProgressBar::new(len),
                    "  {spinner:.magenta} Downloading {prefix}  {bar:24.magenta/dim} {bytes}/{total_bytes} {bytes_per_sec:.dim}",
                ),
                None => (
                    ProgressBar::no_length(),
                    "  {spinner:.magenta} Downloading {prefix}  {bytes} {bytes_per_sec:.dim}",
                ),
            };
            let style = ProgressStyle::with_template(template)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
                .progress_chars("━╸─");
            bar.set_style(style);
            bar.set_prefix(label.to_string());
            bar.enable_steady_tick(Duration::from_millis(120));
            Some(bar)
        } else {
            println!("Downloading {}...", label);
            None
        };
        Self { bar }
    }

    /// Wrap `reader` so every read advances the bar
    pub fn wrap_read<'a, R: Read + 'a>(&self, reader: R) -> Box<dyn Read + 'a> {
        match self.bar {
            Some(ref bar) => Box::new(bar.wrap_read(reader)),
            None => Box::new(reader),
        }
    }

    /// Finish and clear the progress bar.
    pub fn finish(&self) {
        if let Some(ref bar) = self.bar {
            bar.disable_steady_tick();
            bar.finish_and_clear();
        }
    }
}
