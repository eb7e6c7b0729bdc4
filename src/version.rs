//! Version rules and predicate evaluation
//!
//! Host version strings are opaque and loosely structured: dotted numeric
//! segments with an optional non-numeric qualifier suffix, e.g.
//! `"1.21.9-R0.1-SNAPSHOT"`. A patch declares the versions it supports as a
//! set of rules, each either a plain prefix (`"1.21"`) or a minimum version
//! (`"1.21.9+"`). Evaluation is a pure function of the version string and the
//! rule set, with no host access.

use std::cmp::Ordering;
use std::fmt;

/// A single version match rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionRule {
    /// Matches versions starting with the given text, with a boundary check
    /// so `"1.21"` does not match `"1.2110"` or `"1.21.10"`
    Prefix(String),

    /// Matches the given version and any numerically greater one
    AtLeast(String),
}

impl VersionRule {
    /// Parse a rule string. A trailing `+` selects minimum-version matching;
    /// anything else is a prefix rule.
    pub fn parse(rule: &str) -> Self {
        match rule.strip_suffix('+') {
            Some(min) => VersionRule::AtLeast(min.to_string()),
            None => VersionRule::Prefix(rule.to_string()),
        }
    }

    /// Evaluate this rule against a host version string.
    pub fn matches(&self, version: &str) -> bool {
        match self {
            VersionRule::Prefix(prefix) => prefix_matches(version, prefix),
            VersionRule::AtLeast(min) => compare_numeric(version, min) != Ordering::Less,
        }
    }
}

impl fmt::Display for VersionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionRule::Prefix(prefix) => write!(f, "{}", prefix),
            VersionRule::AtLeast(min) => write!(f, "{}+", min),
        }
    }
}

/// True when any rule in the set matches the version.
pub fn any_match(version: &str, rules: &[VersionRule]) -> bool {
    rules.iter().any(|rule| rule.matches(version))
}

/// Parse a list of rule strings in declaration order.
pub fn parse_rules(rules: &[&str]) -> Vec<VersionRule> {
    rules.iter().map(|rule| VersionRule::parse(rule)).collect()
}

/// Prefix match with a word-boundary check: the character after the prefix
/// must not be a digit, and must not be a dot immediately followed by a digit.
/// `"1.21"` therefore matches `"1.21"` and `"1.21-beta"` but not `"1.2110"`
/// or `"1.21.10"`.
fn prefix_matches(version: &str, prefix: &str) -> bool {
    if !version.starts_with(prefix) {
        return false;
    }
    let mut rest = version[prefix.len()..].chars();
    match rest.next() {
        None => true,
        Some(next) => {
            if next.is_ascii_digit() {
                return false;
            }
            !(next == '.' && rest.next().is_some_and(|c| c.is_ascii_digit()))
        }
    }
}

/// Compare the numeric portions of two version strings component-wise.
/// Missing and non-numeric components count as zero.
fn compare_numeric(a: &str, b: &str) -> Ordering {
    let left: Vec<u64> = numeric_lead(a).split('.').map(component_value).collect();
    let right: Vec<u64> = numeric_lead(b).split('.').map(component_value).collect();

    let width = left.len().max(right.len());
    for i in 0..width {
        let l = left.get(i).copied().unwrap_or(0);
        let r = right.get(i).copied().unwrap_or(0);
        match l.cmp(&r) {
            Ordering::Equal => {}
            other => return other,
        }
    }
    Ordering::Equal
}

/// Leading run of digits and dots, stopping at the first qualifier character.
/// `"1.21.9-R0.1-SNAPSHOT"` yields `"1.21.9"`.
fn numeric_lead(version: &str) -> &str {
    let end = version
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(version.len());
    &version[..end]
}

fn component_value(component: &str) -> u64 {
    component.parse().unwrap_or(0)
}
