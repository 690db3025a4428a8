//! tfs - Terraform version switcher
//!
//! Keeps a local cache of Terraform releases and points a `terraform`
//! link at the one a project asks for.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod fs;
pub mod project;
pub mod ui;
pub mod version;

pub use error::{TfsError, TfsResult};
