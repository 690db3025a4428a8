//! Version parsing and constraint evaluation
//!
//! Versions are `semver::Version` values. Input is accepted in the looser
//! form Terraform users write: an optional `v` prefix, one to three numeric
//! segments (`1`, `1.2`, `1.2.3`) and leading zeros, all normalized before
//! handing the string to `semver`.

pub mod constraint;

pub use constraint::{expand_pessimistic, Clause, Constraint, Operator};
pub use semver::Version;

use crate::error::{TfsError, TfsResult};

/// Parse a version string, normalizing partial versions.
///
/// Examples:
/// - "1" -> 1.0.0
/// - "v1.2" -> 1.2.0
/// - "1.02.3-beta" -> 1.2.3-beta
pub fn parse_version(input: &str) -> TfsResult<Version> {
    let trimmed = input.trim();
    let stripped = trimmed.strip_prefix('v').unwrap_or(trimmed);
    if stripped.is_empty() {
        return Err(TfsError::invalid_version(input, "empty version"));
    }

    let core_end = stripped.find(['-', '+']).unwrap_or(stripped.len());
    let (core, suffix) = stripped.split_at(core_end);

    let mut segments = Vec::with_capacity(3);
    for segment in core.split('.') {
        if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TfsError::invalid_version(
                input,
                format!("non-numeric segment '{}'", segment),
            ));
        }
        let value: u64 = segment
            .parse()
            .map_err(|e| TfsError::invalid_version(input, format!("segment '{}': {}", segment, e)))?;
        segments.push(value);
    }
    if segments.len() > 3 {
        return Err(TfsError::invalid_version(
            input,
            "more than three numeric segments",
        ));
    }
    segments.resize(3, 0);

    let normalized = format!("{}.{}.{}{}", segments[0], segments[1], segments[2], suffix);
    Version::parse(&normalized).map_err(|e| TfsError::invalid_version(input, e.to_string()))
}
