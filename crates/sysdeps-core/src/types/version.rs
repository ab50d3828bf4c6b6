//! Version ordering for locally installed artifacts.
//!
//! Versions are split on `.` and `-` and compared segment by segment. Missing
//! trailing segments count as `"0"`. Two numeric segments compare by value, a
//! numeric segment outranks a non-numeric one, and two non-numeric segments
//! compare lexically. An absent version ranks below every present one.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Compare two optional version strings
pub fn compare_versions(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => compare_present(a, b),
    }
}

fn compare_present(a: &str, b: &str) -> Ordering {
    let left = segments(a);
    let right = segments(b);
    let len = left.len().max(right.len());

    for i in 0..len {
        let l = left.get(i).copied().unwrap_or("0");
        let r = right.get(i).copied().unwrap_or("0");
        match compare_segment(l, r) {
            Ordering::Equal => continue,
            other => return other,
        }
    }

    Ordering::Equal
}

fn segments(version: &str) -> Vec<&str> {
    let mut parts: Vec<&str> = version.split(['.', '-']).collect();
    while parts.last().is_some_and(|p| p.is_empty()) {
        parts.pop();
    }
    parts
        .into_iter()
        .map(|p| if p.is_empty() { "0" } else { p })
        .collect()
}

fn is_numeric(segment: &str) -> bool {
    segment.bytes().all(|b| b.is_ascii_digit())
}

fn compare_segment(a: &str, b: &str) -> Ordering {
    match (is_numeric(a), is_numeric(b)) {
        (true, true) => compare_numeric(a, b),
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.cmp(b),
    }
}

// Arbitrary length digit strings: strip leading zeros, then longer is larger.
fn compare_numeric(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Version string ordered by [`compare_versions`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComparableVersion(pub String);

impl ComparableVersion {
    pub fn new(version: impl Into<String>) -> Self {
        Self(version.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for ComparableVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ComparableVersion {}

impl PartialOrd for ComparableVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ComparableVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_present(&self.0, &other.0)
    }
}

impl fmt::Display for ComparableVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmp(a: &str, b: &str) -> Ordering {
        compare_versions(Some(a), Some(b))
    }

    #[test]
    fn test_numeric_segments() {
        assert_eq!(cmp("1.2.0", "1.1.9"), Ordering::Greater);
        assert_eq!(cmp("2.0", "1.9.9"), Ordering::Greater);
        assert_eq!(cmp("1.10", "1.9"), Ordering::Greater);
        assert_eq!(cmp("1.0.0", "1.0"), Ordering::Equal);
        assert_eq!(cmp("01.2", "1.2"), Ordering::Equal);
    }

    #[test]
    fn test_qualifiers() {
        assert_eq!(cmp("1.0-rc1", "1.0-alpha"), Ordering::Greater);
        assert_eq!(cmp("1.0", "1.0-SNAPSHOT"), Ordering::Greater);
        assert_eq!(cmp("1.0-beta", "1.0-alpha"), Ordering::Greater);
        assert_eq!(cmp("1.0.1", "1.0-final"), Ordering::Greater);
    }

    #[test]
    fn test_dot_and_dash_are_equivalent() {
        assert_eq!(cmp("1-2", "1.2"), Ordering::Equal);
        assert_eq!(cmp("1.0-", "1.0"), Ordering::Equal);
        assert_eq!(cmp("1..2", "1.0.2"), Ordering::Equal);
    }

    #[test]
    fn test_none_is_lowest() {
        assert_eq!(compare_versions(None, Some("0")), Ordering::Less);
        assert_eq!(compare_versions(Some(""), None), Ordering::Greater);
        assert_eq!(compare_versions(None, None), Ordering::Equal);
    }

    #[test]
    fn test_huge_numbers_do_not_overflow() {
        assert_eq!(
            cmp("1.99999999999999999999999", "1.99999999999999999999998"),
            Ordering::Greater
        );
    }

    #[test]
    fn test_comparable_version_sorting() {
        let mut versions: Vec<ComparableVersion> = ["1.10", "1.2", "1.2-beta", "0.9"]
            .into_iter()
            .map(ComparableVersion::new)
            .collect();
        versions.sort();
        let sorted: Vec<&str> = versions.iter().map(ComparableVersion::as_str).collect();
        assert_eq!(sorted, vec!["0.9", "1.2-beta", "1.2", "1.10"]);
    }
}
