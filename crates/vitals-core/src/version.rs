//! Version string decomposition and ordering.
//!
//! Version strings in an environment inventory are not guaranteed to be
//! semver: core builds look like `5.4-RC4-47505-src`, plugins ship dates.
//! [`parse`] pulls out the leading `(major, minor, patch)` triple where one
//! exists and [`compare`] orders arbitrary strings the way release tooling
//! conventionally does (`1.0-dev < 1.0-alpha < 1.0-beta < 1.0-RC1 < 1.0 < 1.0-pl1`).

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Leading numeric components of a version string.
///
/// Either the whole triple is known or the version is not decomposable;
/// there is no partially populated form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VersionTriple {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl VersionTriple {
    #[must_use]
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl fmt::Display for VersionTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Split `version` on `.`/`-` and read the first three groups as numbers.
///
/// Major and minor must both be numeric; a missing or non-numeric patch
/// group reads as `0`. Anything after the third group is ignored.
#[must_use]
pub fn parse(version: &str) -> Option<VersionTriple> {
    let mut groups = version.trim().split(['.', '-']);
    let major = numeric_group(groups.next()?)?;
    let minor = numeric_group(groups.next()?)?;
    let patch = groups.next().and_then(numeric_group).unwrap_or(0);
    Some(VersionTriple::new(major, minor, patch))
}

fn numeric_group(group: &str) -> Option<u64> {
    if group.is_empty() || !group.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    group.parse().ok()
}

/// Order two version strings.
///
/// Both strings are canonicalized (`_`, `-`, `+` become `.`, and a `.` is
/// inserted at every digit/letter boundary) and compared part by part.
/// Numeric parts compare numerically; word parts rank
/// `dev < alpha = a < beta = b < RC = rc < <number> < pl = p`, and unknown
/// words sort below `dev`. When one side runs out, the first extra part of
/// the longer side decides: a number makes it greater, a word is ranked
/// against `<number>`.
#[must_use]
pub fn compare(left: &str, right: &str) -> Ordering {
    let left = canonical_parts(left);
    let right = canonical_parts(right);

    for (l, r) in left.iter().zip(right.iter()) {
        let ordering = compare_parts(l, r);
        if ordering != Ordering::Equal {
            return ordering;
        }
    }

    match left.len().cmp(&right.len()) {
        Ordering::Equal => Ordering::Equal,
        Ordering::Greater => trailing_part_ordering(&left[right.len()]),
        Ordering::Less => trailing_part_ordering(&right[left.len()]).reverse(),
    }
}

fn trailing_part_ordering(part: &str) -> Ordering {
    if is_number(part) {
        Ordering::Greater
    } else {
        word_rank(part).cmp(&NUMBER_RANK)
    }
}

fn canonical_parts(version: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut last_digit: Option<bool> = None;

    for ch in version.trim().chars() {
        if matches!(ch, '.' | '_' | '-' | '+') {
            flush(&mut parts, &mut current);
            last_digit = None;
            continue;
        }

        let digit = ch.is_ascii_digit();
        if last_digit.is_some_and(|was_digit| was_digit != digit) {
            flush(&mut parts, &mut current);
        }
        current.push(ch);
        last_digit = Some(digit);
    }
    flush(&mut parts, &mut current);

    parts
}

fn flush(parts: &mut Vec<String>, current: &mut String) {
    if !current.is_empty() {
        parts.push(std::mem::take(current));
    }
}

fn compare_parts(left: &str, right: &str) -> Ordering {
    match (is_number(left), is_number(right)) {
        (true, true) => compare_numbers(left, right),
        (true, false) => NUMBER_RANK.cmp(&word_rank(right)),
        (false, true) => word_rank(left).cmp(&NUMBER_RANK),
        (false, false) => word_rank(left).cmp(&word_rank(right)),
    }
}

fn is_number(part: &str) -> bool {
    !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit())
}

/// Compares digit strings of any length without overflowing.
fn compare_numbers(left: &str, right: &str) -> Ordering {
    let left = left.trim_start_matches('0');
    let right = right.trim_start_matches('0');
    left.len().cmp(&right.len()).then_with(|| left.cmp(right))
}

const NUMBER_RANK: i8 = 4;

/// Ranks pre/post-release words. Matching is by prefix, first entry wins.
fn word_rank(part: &str) -> i8 {
    const FORMS: [(&str, i8); 9] = [
        ("dev", 0),
        ("alpha", 1),
        ("a", 1),
        ("beta", 2),
        ("b", 2),
        ("RC", 3),
        ("rc", 3),
        ("pl", 5),
        ("p", 5),
    ];

    FORMS
        .iter()
        .find(|(form, _)| part.starts_with(form))
        .map_or(-1, |(_, rank)| *rank)
}
