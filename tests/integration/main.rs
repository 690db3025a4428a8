//! Integration tests for tfs
//!
//! Every test runs against its own temporary cache, bin directory and
//! configuration file. The download mirror points at a closed local port,
//! so nothing here touches the network.

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    struct Sandbox {
        root: TempDir,
    }

    impl Sandbox {
        fn new() -> Self {
            let root = TempDir::new().unwrap();
            let sandbox = Self { root };
            fs::create_dir_all(sandbox.cache()).unwrap();
            fs::create_dir_all(sandbox.project()).unwrap();
            fs::write(
                sandbox.config(),
                format!(
                    "[cache]\ndirectory = '{}'\n\n[install]\nbin_directory = '{}'\ndownload_url = 'http://127.0.0.1:9'\ntimeout_secs = 5\n",
                    sandbox.cache().display(),
                    sandbox.bin().display()
                ),
            )
            .unwrap();
            sandbox
        }

        fn cache(&self) -> PathBuf {
            self.root.path().join("cache")
        }

        fn bin(&self) -> PathBuf {
            self.root.path().join("bin")
        }

        fn link(&self) -> PathBuf {
            self.bin().join("terraform")
        }

        fn project(&self) -> PathBuf {
            self.root.path().join("project")
        }

        fn config(&self) -> PathBuf {
            self.root.path().join("config.toml")
        }

        fn artifact(&self, version: &str) -> PathBuf {
            self.cache().join(format!("terraform_{}", version))
        }

        fn seed(&self, versions: &[&str]) {
            for version in versions {
                fs::write(self.artifact(version), b"#!/bin/sh\necho terraform\n").unwrap();
            }
        }

        fn tfs(&self) -> Command {
            let mut cmd = cargo_bin_cmd!("tfs");
            cmd.env_remove("TFS_CONFIG")
                .current_dir(self.project())
                .arg("--config")
                .arg(self.config());
            cmd
        }
    }

    #[test]
    fn help_displays() {
        cargo_bin_cmd!("tfs")
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Terraform version switcher"))
            .stdout(predicate::str::contains("prune-until"));
    }

    #[test]
    fn version_displays() {
        cargo_bin_cmd!("tfs")
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("tfs"));
    }

    #[test]
    fn list_empty() {
        let sandbox = Sandbox::new();
        sandbox
            .tfs()
            .arg("list")
            .assert()
            .success()
            .stdout(predicate::str::contains("No cached Terraform releases"));
    }

    #[test]
    fn list_empty_json() {
        let sandbox = Sandbox::new();
        sandbox
            .tfs()
            .args(["ls", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::diff("[]\n"));
    }

    #[test]
    fn list_plain_sorts_by_version() {
        let sandbox = Sandbox::new();
        sandbox.seed(&["1.10.0", "1.9.0", "1.9.10"]);

        sandbox
            .tfs()
            .args(["list", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::diff("1.9.0\n1.9.10\n1.10.0\n"));
    }

    #[test]
    fn list_table_shows_totals() {
        let sandbox = Sandbox::new();
        sandbox.seed(&["1.9.0", "1.10.0"]);

        sandbox
            .tfs()
            .arg("list")
            .assert()
            .success()
            .stdout(predicate::str::contains("VERSION"))
            .stdout(predicate::str::contains("2 release(s)"));
    }

    #[test]
    fn unexpected_cache_file_fails() {
        let sandbox = Sandbox::new();
        sandbox.seed(&["1.9.0"]);
        fs::write(sandbox.cache().join("terraform_latest"), b"").unwrap();

        sandbox
            .tfs()
            .arg("list")
            .assert()
            .failure()
            .stderr(predicate::str::contains("terraform_latest"))
            .stderr(predicate::str::contains("Hint:"));
    }

    #[cfg(unix)]
    #[test]
    fn switch_to_cached_version() {
        let sandbox = Sandbox::new();
        sandbox.seed(&["1.9.8"]);

        sandbox
            .tfs()
            .arg("1.9.8")
            .assert()
            .success()
            .stdout(predicate::str::contains("Terraform 1.9.8 is now active"));

        assert_eq!(
            fs::read_link(sandbox.link()).unwrap(),
            sandbox.artifact("1.9.8")
        );

        sandbox
            .tfs()
            .arg("1.9.8")
            .assert()
            .success()
            .stdout(predicate::str::contains("already active"));
    }

    #[cfg(unix)]
    #[test]
    fn switch_picks_best_cached_match() {
        let sandbox = Sandbox::new();
        sandbox.seed(&["1.8.5", "1.9.2", "1.9.8", "1.10.0"]);

        sandbox
            .tfs()
            .arg("~> 1.9.0")
            .assert()
            .success()
            .stdout(predicate::str::contains("Terraform 1.9.8 is now active"));
    }

    #[cfg(unix)]
    #[test]
    fn switch_uses_project_required_version() {
        let sandbox = Sandbox::new();
        sandbox.seed(&["1.5.7", "1.6.6"]);
        fs::write(
            sandbox.project().join("versions.tf"),
            "terraform {\n  required_version = \">= 1.5.0, < 1.6.0\"\n}\n",
        )
        .unwrap();

        sandbox
            .tfs()
            .assert()
            .success()
            .stdout(predicate::str::contains("Terraform 1.5.7 is now active"));

        sandbox
            .tfs()
            .args(["list", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"active\": true"));
    }

    #[cfg(unix)]
    #[test]
    fn switch_evicts_beyond_history() {
        let sandbox = Sandbox::new();
        sandbox.seed(&["1.6.0", "1.7.0", "1.8.0"]);
        sandbox
            .tfs()
            .args(["config", "set", "cache.history", "2"])
            .assert()
            .success();

        sandbox
            .tfs()
            .arg("1.8.0")
            .assert()
            .success()
            .stdout(predicate::str::contains("Evicted Terraform 1.6.0"));

        assert!(!sandbox.artifact("1.6.0").exists());
        assert!(sandbox.artifact("1.7.0").exists());
        assert!(sandbox.artifact("1.8.0").exists());
    }

    #[test]
    fn no_constraint_is_not_an_error() {
        let sandbox = Sandbox::new();
        sandbox
            .tfs()
            .assert()
            .success()
            .stdout(predicate::str::contains("No Terraform version constraint found"));
    }

    #[test]
    fn invalid_constraint_fails() {
        let sandbox = Sandbox::new();
        sandbox
            .tfs()
            .arg("~> ~> 1.2")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid version constraint"));
    }

    #[test]
    fn unsatisfiable_constraint_fails_with_hint() {
        let sandbox = Sandbox::new();
        sandbox.seed(&["1.5.0"]);

        sandbox
            .tfs()
            .arg("< 1.0.0")
            .assert()
            .failure()
            .stderr(predicate::str::contains("< 1.0.0"))
            .stderr(predicate::str::contains("exact version"));
    }

    #[test]
    fn download_failure_leaves_cache_clean() {
        let sandbox = Sandbox::new();
        sandbox
            .tfs()
            .arg("1.9.8")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Download failed"));

        assert!(fs::read_dir(sandbox.cache()).unwrap().next().is_none());
        assert!(!sandbox.link().exists());
    }

    #[test]
    fn prune_until_keeps_newer_releases() {
        let sandbox = Sandbox::new();
        sandbox.seed(&["1.9.0", "1.10.0", "1.11.0"]);

        sandbox
            .tfs()
            .args(["prune-until", "1.10.0"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Removed 1 release(s)"));

        assert!(!sandbox.artifact("1.9.0").exists());
        assert!(sandbox.artifact("1.10.0").exists());
        assert!(sandbox.artifact("1.11.0").exists());
    }

    #[test]
    fn prune_until_rejects_invalid_version() {
        let sandbox = Sandbox::new();
        sandbox
            .tfs()
            .args(["prune-until", "latest"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("latest"));
    }

    #[test]
    fn prune_requires_confirmation() {
        let sandbox = Sandbox::new();
        sandbox.seed(&["1.9.0"]);

        sandbox
            .tfs()
            .arg("prune")
            .assert()
            .success()
            .stdout(predicate::str::contains("Nothing removed"));
        assert!(sandbox.artifact("1.9.0").exists());
    }

    #[test]
    fn prune_yes_removes_everything() {
        let sandbox = Sandbox::new();
        sandbox.seed(&["1.9.0", "1.10.0"]);

        sandbox
            .tfs()
            .args(["prune", "--yes"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Removed 2 release(s)"));

        assert!(!sandbox.artifact("1.9.0").exists());
        assert!(!sandbox.artifact("1.10.0").exists());
    }

    #[test]
    fn config_path() {
        let sandbox = Sandbox::new();
        sandbox
            .tfs()
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_set_then_show() {
        let sandbox = Sandbox::new();
        sandbox
            .tfs()
            .args(["config", "set", "cache.minor_versions", "3"])
            .assert()
            .success();

        sandbox
            .tfs()
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[cache]"))
            .stdout(predicate::str::contains("minor_versions = 3"));
    }

    #[test]
    fn config_set_unknown_key_fails() {
        let sandbox = Sandbox::new();
        sandbox
            .tfs()
            .args(["config", "set", "vm.name", "x"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown config key"));
    }

    #[test]
    fn invalid_config_file_fails() {
        let sandbox = Sandbox::new();
        fs::write(sandbox.config(), "[cache]\nhistory = \"many\"\n").unwrap();

        sandbox
            .tfs()
            .arg("list")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"));
    }
}
