//! Terminal output for tfs
//!
//! Uses `cliclack` for prompts and step markers in interactive terminals
//! and falls back to plain, greppable lines in CI or when output is piped.
//!
//! # Example
//!
//! ```rust,ignore
//! use tfs::ui::{self, UiContext};
//!
//! let ctx = UiContext::detect().with_auto_yes(args.yes);
//!
//! if ui::confirm(&ctx, "Remove all cached releases?", false).await? {
//!     ui::step_ok(&ctx, "Removed 3 release(s)");
//! }
//! ```

mod context;
mod output;
mod progress;
mod prompts;
mod theme;

pub use context::UiContext;
pub use output::{
    key_value, remark, step_info, step_ok, step_ok_detail, step_warn, step_warn_hint,
};
pub use progress::{DownloadProgress, TaskSpinner};
pub use prompts::confirm;
pub use theme::init_theme;
