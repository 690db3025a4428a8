//! Config command - show or edit configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager};
use crate::error::{TfsError, TfsResult};
use crate::ui::{self, UiContext};
use std::path::PathBuf;

const KEYS: [&str; 10] = [
    "cache.directory",
    "cache.file_name_prefix",
    "cache.auto_clean",
    "cache.history",
    "cache.minor_versions",
    "cache.patch_versions",
    "install.bin_directory",
    "install.binary_name",
    "install.download_url",
    "install.timeout_secs",
];

/// Execute the config command
pub async fn execute(args: ConfigArgs, manager: &ConfigManager) -> TfsResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(&manager.load().await?)?,
        Some(ConfigAction::Path) => println!("{}", manager.path().display()),
        Some(ConfigAction::Init { force }) => init_config(manager, force).await?,
        Some(ConfigAction::Set { key, value }) => {
            let mut config = manager.load().await?;
            set_value(&mut config, &key, &value)?;
            manager.save(&config).await?;
            ui::step_ok(&UiContext::detect(), &format!("Set {} = {}", key, value));
        }
    }

    Ok(())
}

fn show_config(config: &Config) -> TfsResult<()> {
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

async fn init_config(manager: &ConfigManager, force: bool) -> TfsResult<()> {
    let ctx = UiContext::detect();
    let path = manager.path();

    if path.exists() && !force {
        ui::step_warn_hint(
            &ctx,
            &format!("Config already exists at {}", path.display()),
            "Use --force to overwrite",
        );
        return Ok(());
    }

    manager.save(&Config::default()).await?;

    ui::step_ok_detail(
        &ctx,
        "Configuration initialized",
        &path.display().to_string(),
    );

    Ok(())
}

/// Apply `key = value` to `config`, rejecting unknown keys and bad values
fn set_value(config: &mut Config, key: &str, value: &str) -> TfsResult<()> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["cache", "directory"] => config.cache.directory = PathBuf::from(value),
        ["cache", "file_name_prefix"] => config.cache.file_name_prefix = value.to_string(),
        ["cache", "auto_clean"] => config.cache.auto_clean = parse_bool(value)?,
        ["cache", "history"] => config.cache.history = parse_number(value)?,
        ["cache", "minor_versions"] => config.cache.minor_versions = parse_number(value)?,
        ["cache", "patch_versions"] => config.cache.patch_versions = parse_number(value)?,

        ["install", "bin_directory"] => config.install.bin_directory = PathBuf::from(value),
        ["install", "binary_name"] => config.install.binary_name = value.to_string(),
        ["install", "download_url"] => config.install.download_url = value.to_string(),
        ["install", "timeout_secs"] => config.install.timeout_secs = parse_number(value)?,

        _ => {
            return Err(TfsError::User(format!(
                "Unknown config key: {} (valid keys: {})",
                key,
                KEYS.join(", ")
            )))
        }
    }

    let problems = config.problems();
    if !problems.is_empty() {
        return Err(TfsError::User(problems.join("; ")));
    }
    Ok(())
}

fn parse_bool(value: &str) -> TfsResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(TfsError::User(format!(
            "Invalid boolean value: {}. Use true/false",
            value
        ))),
    }
}

fn parse_number<T: std::str::FromStr>(value: &str) -> TfsResult<T> {
    value
        .parse()
        .map_err(|_| TfsError::User(format!("Invalid number: {}", value)))
}
