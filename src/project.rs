//! Terraform project inspection
//!
//! Finds the `required_version` setting of the `terraform {}` block in
//! the `*.tf` files of a directory. This is a targeted scanner, not an HCL
//! parser: it understands comments, strings and brace nesting, which is
//! all the lookup needs.

use crate::error::{TfsError, TfsResult};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::debug;

static TERRAFORM_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*terraform[ \t]*\{").expect("terraform block pattern is valid")
});

static REQUIRED_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^[ \t]*required_version[ \t]*=[ \t]*"([^"\n]*)""#)
        .expect("required_version pattern is valid")
});

/// First `required_version` constraint declared by the `*.tf` files of
/// `dir`, visiting files in name order
pub fn required_version(dir: &Path) -> TfsResult<Option<String>> {
    for path in manifests(dir)? {
        let source = fs::read_to_string(&path)
            .map_err(|e| TfsError::io(format!("reading {}", path.display()), e))?;

        if let Some(constraint) = find_required_version(&source) {
            debug!(path = %path.display(), constraint = %constraint, "Found required_version");
            return Ok(Some(constraint));
        }
    }

    debug!(path = %dir.display(), "No required_version in Terraform configuration");
    Ok(None)
}

/// `*.tf` files of `dir`, sorted by name
fn manifests(dir: &Path) -> TfsResult<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .map_err(|e| TfsError::io(format!("reading directory {}", dir.display()), e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry =
            entry.map_err(|e| TfsError::io(format!("reading directory {}", dir.display()), e))?;
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "tf") && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn find_required_version(source: &str) -> Option<String> {
    let source = strip_comments(source);

    TERRAFORM_BLOCK.find_iter(&source).find_map(|open| {
        let body = block_body(&source, open.end())?;
        REQUIRED_VERSION
            .captures(body)
            .map(|caps| caps[1].trim().to_string())
    })
}

/// Text between the `{` ending at `start` and its matching `}`
fn block_body(source: &str, start: usize) -> Option<&str> {
    let mut depth = 1usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in source[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&source[start..start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Replace `#`, `//` and `/* */` comments with spaces, keeping strings intact
fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    let mut in_string = false;
    let mut escaped = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '#' => skip_line(&mut chars, &mut out),
            '/' if chars.peek() == Some(&'/') => skip_line(&mut chars, &mut out),
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for c in chars.by_ref() {
                    if c == '\n' {
                        out.push('\n');
                    }
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
                out.push(' ');
            }
            _ => out.push(c),
        }
    }
    out
}

fn skip_line(chars: &mut std::iter::Peekable<std::str::Chars<'_>>, out: &mut String) {
    for c in chars.by_ref() {
        if c == '\n' {
            out.push('\n');
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn project(files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (name, contents) in files {
            fs::write(dir.path().join(name), contents).unwrap();
        }
        dir
    }

    #[test]
    fn finds_required_version() {
        let dir = project(&[(
            "versions.tf",
            r#"
terraform {
  required_version = "~> 1.9.0"

  required_providers {
    aws = {
      source  = "hashicorp/aws"
      version = ">= 5.0"
    }
  }
}
"#,
        )]);
        assert_eq!(
            required_version(dir.path()).unwrap().as_deref(),
            Some("~> 1.9.0")
        );
    }

    #[test]
    fn no_manifests() {
        let dir = project(&[("README.md", "terraform { required_version = \"1.0.0\" }")]);
        assert_eq!(required_version(dir.path()).unwrap(), None);
    }

    #[test]
    fn no_required_version() {
        let dir = project(&[
            ("main.tf", "resource \"null_resource\" \"x\" {}\n"),
            ("versions.tf", "terraform {\n  backend \"s3\" {}\n}\n"),
        ]);
        assert_eq!(required_version(dir.path()).unwrap(), None);
    }

    #[test]
    fn files_are_visited_in_name_order() {
        let dir = project(&[
            ("b.tf", "terraform {\n  required_version = \">= 1.5\"\n}\n"),
            ("a.tf", "terraform {\n  required_version = \"1.3.0\"\n}\n"),
        ]);
        assert_eq!(
            required_version(dir.path()).unwrap().as_deref(),
            Some("1.3.0")
        );
    }

    #[test]
    fn ignores_settings_outside_terraform_block() {
        let source = r#"
locals {
  required_version = "0.12.0"
}

terraform {
  required_version = ">= 1.2, < 2.0"
}
"#;
        assert_eq!(
            find_required_version(source).as_deref(),
            Some(">= 1.2, < 2.0")
        );
    }

    #[test]
    fn ignores_commented_settings() {
        let source = r#"
# terraform { required_version = "0.11.0" }
terraform {
  // required_version = "0.12.0"
  /* required_version = "0.13.0" */
  required_version = "1.6.0" # pinned
}
"#;
        assert_eq!(find_required_version(source).as_deref(), Some("1.6.0"));
    }

    #[test]
    fn braces_inside_strings_do_not_close_block() {
        let source = r#"
terraform {
  backend "local" { path = "state/}{.tfstate" }
  required_version = "~> 1.8"
}
"#;
        assert_eq!(find_required_version(source).as_deref(), Some("~> 1.8"));
    }

    #[test]
    fn unterminated_block_is_ignored() {
        assert_eq!(find_required_version("terraform {\n  required_version = \"1.0.0\"\n"), None);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = required_version(&dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, TfsError::Io { .. }));
    }
}
