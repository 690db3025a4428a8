//! Version constraints
//!
//! A constraint is a comma-separated list of clauses (`>= 1.2.0, < 2.0.0`)
//! that must all hold. The pessimistic operator `~>` is not a comparator of
//! its own: it is rewritten into a `>=`/`<` pair before parsing.
//!
//! | Input | Expansion |
//! |-------|-----------|
//! | `~> 1` | `>=1.0.0, <2.0.0` |
//! | `~> 1.2` | `>=1.2.0, <1.3.0` |
//! | `~> 1.2.3` | `>=1.2.3, <1.3.0` |

use super::parse_version;
use crate::error::{TfsError, TfsResult};
use regex::Regex;
use semver::Version;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

const PESSIMISTIC: &str = "~>";

static PESSIMISTIC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"~>\s*(\d+(?:\.\d+){0,2})").expect("pessimistic operator regex is valid")
});

/// Rewrite every `~> X[.Y[.Z]]` token into its `>=`/`<` pair.
///
/// Only the numeric run is consumed; anything right after it stays in
/// place and ends up glued to the upper bound (`~>1.2alpha` becomes
/// `>=1.2.0, <1.3.0alpha`). A `~>` left over after substitution is an
/// error.
pub fn expand_pessimistic(expr: &str) -> TfsResult<String> {
    if !expr.contains(PESSIMISTIC) {
        return Ok(expr.to_string());
    }

    let mut out = String::with_capacity(expr.len() + 16);
    let mut last = 0;
    for caps in PESSIMISTIC_RE.captures_iter(expr) {
        let (Some(full), Some(token)) = (caps.get(0), caps.get(1)) else {
            continue;
        };

        let mut segments = Vec::with_capacity(3);
        for segment in token.as_str().split('.') {
            let value: u64 = segment.parse().map_err(|_| {
                TfsError::invalid_constraint(expr, format!("segment '{}' out of range", segment))
            })?;
            segments.push(value);
        }
        let (lower, upper) = match segments.as_slice() {
            [major] => (
                format!(">={}.0.0", major),
                format!("<{}.0.0", bump(expr, *major)?),
            ),
            [major, minor] => (
                format!(">={}.{}.0", major, minor),
                format!("<{}.{}.0", major, bump(expr, *minor)?),
            ),
            [major, minor, patch] => (
                format!(">={}.{}.{}", major, minor, patch),
                format!("<{}.{}.0", major, bump(expr, *minor)?),
            ),
            _ => {
                return Err(TfsError::invalid_constraint(
                    expr,
                    "pessimistic operand needs one to three segments",
                ))
            }
        };

        out.push_str(&expr[last..full.start()]);
        out.push_str(&lower);
        out.push_str(", ");
        out.push_str(&upper);
        last = full.end();
    }
    out.push_str(&expr[last..]);

    if out.contains(PESSIMISTIC) {
        return Err(TfsError::invalid_constraint(
            expr,
            "malformed pessimistic operator",
        ));
    }
    Ok(out)
}

fn bump(expr: &str, value: u64) -> TfsResult<u64> {
    value
        .checked_add(1)
        .ok_or_else(|| TfsError::invalid_constraint(expr, "segment out of range"))
}

/// Primitive comparators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl Operator {
    // Longest symbols first so ">=" is not read as ">".
    const SYMBOLS: [(&'static str, Operator); 6] = [
        (">=", Operator::GtEq),
        ("<=", Operator::LtEq),
        ("!=", Operator::NotEq),
        (">", Operator::Gt),
        ("<", Operator::Lt),
        ("=", Operator::Eq),
    ];

    /// The textual form of the comparator
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
        }
    }

    fn holds(&self, ordering: Ordering) -> bool {
        match self {
            Self::Eq => ordering == Ordering::Equal,
            Self::NotEq => ordering != Ordering::Equal,
            Self::Lt => ordering == Ordering::Less,
            Self::LtEq => ordering != Ordering::Greater,
            Self::Gt => ordering == Ordering::Greater,
            Self::GtEq => ordering != Ordering::Less,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// One `(comparator, version)` pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub op: Operator,
    pub version: Version,
}

impl Clause {
    fn parse(expr: &str, clause: &str) -> TfsResult<Self> {
        let (op, rest) = Operator::SYMBOLS
            .iter()
            .find_map(|(symbol, op)| clause.strip_prefix(symbol).map(|rest| (*op, rest)))
            .unwrap_or((Operator::Eq, clause));

        let rest = rest.trim();
        if rest.starts_with(['~', '^', '>', '<', '=', '!']) {
            return Err(TfsError::invalid_constraint(
                expr,
                format!("unknown comparator in '{}'", clause),
            ));
        }

        let version = parse_version(rest)
            .map_err(|e| TfsError::invalid_constraint(expr, e.to_string()))?;
        Ok(Self { op, version })
    }

    /// Whether `version` satisfies this clause (build metadata is ignored).
    ///
    /// A pre-release only matches a clause that names a pre-release of the
    /// same `major.minor.patch`.
    pub fn matches(&self, version: &Version) -> bool {
        if !version.pre.is_empty() && !self.admits_prerelease_of(version) {
            return false;
        }
        self.op.holds(precedence(version, &self.version))
    }

    fn admits_prerelease_of(&self, version: &Version) -> bool {
        !self.version.pre.is_empty()
            && (self.version.major, self.version.minor, self.version.patch)
                == (version.major, version.minor, version.patch)
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op, self.version)
    }
}

fn precedence(a: &Version, b: &Version) -> Ordering {
    (a.major, a.minor, a.patch, &a.pre).cmp(&(b.major, b.minor, b.patch, &b.pre))
}

/// A parsed, fully expanded version constraint
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Constraint {
    clauses: Vec<Clause>,
}

impl Constraint {
    /// Expand `~>` operators and parse the result.
    ///
    /// An empty expression yields a constraint that matches everything.
    pub fn parse(expr: &str) -> TfsResult<Self> {
        let expanded = expand_pessimistic(expr)?;
        if expanded.trim().is_empty() {
            return Ok(Self::default());
        }

        let clauses = expanded
            .split(',')
            .map(str::trim)
            .map(|clause| {
                if clause.is_empty() {
                    Err(TfsError::invalid_constraint(expr, "empty clause"))
                } else {
                    Clause::parse(expr, clause)
                }
            })
            .collect::<TfsResult<Vec<_>>>()?;

        Ok(Self { clauses })
    }

    /// The clauses, in input order
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Whether every clause holds for `version`
    pub fn matches(&self, version: &Version) -> bool {
        self.clauses.iter().all(|clause| clause.matches(version))
    }

    /// Smallest concrete version implied by the lower bounds.
    ///
    /// `>=v` and `=v` contribute `v`, `>v` contributes the next patch
    /// release (or the release itself when `v` is a pre-release). The
    /// highest contribution wins, and it must satisfy the whole constraint.
    pub fn minimum(&self) -> Option<Version> {
        let floor = self
            .clauses
            .iter()
            .filter_map(|clause| match clause.op {
                Operator::Eq | Operator::GtEq => Some(clause.version.clone()),
                Operator::Gt => Some(next_release(&clause.version)),
                _ => None,
            })
            .max()?;

        self.matches(&floor).then_some(floor)
    }
}

fn next_release(version: &Version) -> Version {
    if version.pre.is_empty() {
        Version::new(version.major, version.minor, version.patch.saturating_add(1))
    } else {
        Version::new(version.major, version.minor, version.patch)
    }
}

impl FromStr for Constraint {
    type Err = TfsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.clauses.iter().map(Clause::to_string).collect();
        write!(f, "{}", rendered.join(", "))
    }
}
