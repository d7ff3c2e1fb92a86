//! Toolchain version parsing, ordering, and constraint expressions.
//!
//! Versions are split into segments on `.` and `-`, and again wherever
//! letters and digits meet (`rc10` is `rc`, `10`):
//! - numeric segments compare as numbers of any length, and trailing zeros
//!   are insignificant (`11 == 11.0`)
//! - known qualifiers order `alpha < beta < milestone < rc < snapshot < sp`
//! - unknown text qualifiers sort after known ones but before numbers
//! - a qualifier-free release sorts above every qualified version of it
//!   (`1.0-rc < 1.0-sp < 1.0`)

use std::cmp::Ordering;
use std::fmt;

/// A parsed version with comparable segments.
#[derive(Debug, Clone)]
pub struct Version {
    pub original: String,
    segments: Vec<Segment>,
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

#[derive(Debug, Clone, Eq, PartialEq)]
enum Segment {
    /// Digits without leading zeros; zero is the empty string.
    Numeric(String),
    Qualifier(QualifierKind),
    Text(String),
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd)]
enum QualifierKind {
    Alpha,
    Beta,
    Milestone,
    Rc,
    Snapshot,
    Sp,
}

impl Version {
    pub fn parse(version: &str) -> Self {
        Self {
            original: version.trim().to_string(),
            segments: parse_segments(version.trim()),
        }
    }

    /// Whether the version carries any qualifier.
    pub fn is_qualified(&self) -> bool {
        self.segments
            .iter()
            .any(|s| !matches!(s, Segment::Numeric(_)))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let max_len = self.segments.len().max(other.segments.len());
        (0..max_len)
            .map(|i| compare_segments(self.segments.get(i), other.segments.get(i)))
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A missing segment behaves like zero.
fn compare_segments(a: Option<&Segment>, b: Option<&Segment>) -> Ordering {
    let zero = Segment::Numeric(String::new());
    compare_two_segments(a.unwrap_or(&zero), b.unwrap_or(&zero))
}

fn rank(seg: &Segment) -> u8 {
    match seg {
        Segment::Qualifier(_) => 0,
        Segment::Text(_) => 1,
        Segment::Numeric(_) => 2,
    }
}

fn compare_two_segments(a: &Segment, b: &Segment) -> Ordering {
    match (a, b) {
        (Segment::Numeric(a), Segment::Numeric(b)) => {
            a.len().cmp(&b.len()).then_with(|| a.cmp(b))
        }
        (Segment::Qualifier(a), Segment::Qualifier(b)) => a.cmp(b),
        (Segment::Text(a), Segment::Text(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
        _ => rank(a).cmp(&rank(b)),
    }
}

fn parse_segments(version: &str) -> Vec<Segment> {
    version
        .split(['.', '-'])
        .filter(|token| !token.is_empty())
        .flat_map(split_digits)
        .filter_map(classify)
        .collect()
}

/// Split a token into runs of ASCII digits and runs of everything else.
fn split_digits(token: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut prev_digit = None;
    for (i, c) in token.char_indices() {
        let digit = c.is_ascii_digit();
        if prev_digit.is_some_and(|p| p != digit) {
            parts.push(&token[start..i]);
            start = i;
        }
        prev_digit = Some(digit);
    }
    parts.push(&token[start..]);
    parts
}

/// `None` for release markers (`ga`, `final`, `release`), which carry no
/// ordering information of their own.
fn classify(token: &str) -> Option<Segment> {
    if token.bytes().all(|b| b.is_ascii_digit()) {
        return Some(Segment::Numeric(token.trim_start_matches('0').to_string()));
    }
    let seg = match token.to_lowercase().as_str() {
        "alpha" | "a" => Segment::Qualifier(QualifierKind::Alpha),
        "beta" | "b" => Segment::Qualifier(QualifierKind::Beta),
        "milestone" | "m" => Segment::Qualifier(QualifierKind::Milestone),
        "rc" | "cr" => Segment::Qualifier(QualifierKind::Rc),
        "snapshot" => Segment::Qualifier(QualifierKind::Snapshot),
        "sp" => Segment::Qualifier(QualifierKind::Sp),
        "ga" | "final" | "release" => return None,
        _ => Segment::Text(token.to_string()),
    };
    Some(seg)
}

/// A parsed version expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionExpr {
    /// Use the toolchain default (`"default"`, `"inherit"`, or empty).
    Default,
    /// Any version inside the range.
    Range(VersionRange),
}

impl VersionExpr {
    /// Parse `"11"`, `">=21"`, `">21"`, `"<=35"`, `"<35"`, `"11+"`, a Maven
    /// range such as `"[21,35)"`, or one of the default markers.
    pub fn parse(expr: &str) -> Result<Self, String> {
        let s = expr.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("default") || s.eq_ignore_ascii_case("inherit") {
            return Ok(Self::Default);
        }
        if s.starts_with('[') || s.starts_with('(') {
            return VersionRange::parse(s)
                .map(Self::Range)
                .ok_or_else(|| format!("malformed version range '{s}'"));
        }

        let bound = |rest: &str, inclusive: bool| -> Result<Bound, String> {
            let rest = rest.trim();
            if rest.is_empty() {
                return Err(format!("missing version in '{s}'"));
            }
            Ok(Bound {
                version: Version::parse(rest),
                inclusive,
            })
        };

        let range = if let Some(rest) = s.strip_prefix(">=") {
            VersionRange::at_least(bound(rest, true)?)
        } else if let Some(rest) = s.strip_prefix('>') {
            VersionRange::at_least(bound(rest, false)?)
        } else if let Some(rest) = s.strip_prefix("<=") {
            VersionRange::at_most(bound(rest, true)?)
        } else if let Some(rest) = s.strip_prefix('<') {
            VersionRange::at_most(bound(rest, false)?)
        } else if let Some(rest) = s.strip_suffix('+') {
            VersionRange::at_least(bound(rest, true)?)
        } else {
            VersionRange::exact(Version::parse(s.strip_prefix('=').unwrap_or(s)))
        };
        Ok(Self::Range(range))
    }
}

/// A version interval. Missing bounds are unbounded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    pub lower: Option<Bound>,
    pub upper: Option<Bound>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bound {
    pub version: Version,
    pub inclusive: bool,
}

impl VersionRange {
    pub fn exact(version: Version) -> Self {
        Self {
            lower: Some(Bound {
                version: version.clone(),
                inclusive: true,
            }),
            upper: Some(Bound {
                version,
                inclusive: true,
            }),
        }
    }

    fn at_least(bound: Bound) -> Self {
        Self {
            lower: Some(bound),
            upper: None,
        }
    }

    fn at_most(bound: Bound) -> Self {
        Self {
            lower: None,
            upper: Some(bound),
        }
    }

    /// Parse a Maven range: `[1.0,2.0)`, `[1.0,]`, `(,2.0)`, `[1.0]`.
    ///
    /// Returns `None` for anything that is not a well-formed range.
    pub fn parse(spec: &str) -> Option<Self> {
        let s = spec.trim();
        if s.len() < 2 || !(s.starts_with('[') || s.starts_with('(')) {
            return None;
        }
        if !(s.ends_with(']') || s.ends_with(')')) {
            return None;
        }
        let open_inclusive = s.starts_with('[');
        let close_inclusive = s.ends_with(']');
        let inner = &s[1..s.len() - 1];

        let make = |text: &str, inclusive: bool| {
            let text = text.trim();
            (!text.is_empty()).then(|| Bound {
                version: Version::parse(text),
                inclusive,
            })
        };

        match inner.split_once(',') {
            Some((lower, upper)) => Some(Self {
                lower: make(lower, open_inclusive),
                upper: make(upper, close_inclusive),
            }),
            None if open_inclusive && close_inclusive && !inner.trim().is_empty() => {
                Some(Self::exact(Version::parse(inner)))
            }
            None => None,
        }
    }

    /// The single version this range admits, if it is an exact pin.
    pub fn as_exact(&self) -> Option<&Version> {
        match (&self.lower, &self.upper) {
            (Some(l), Some(u)) if l.inclusive && u.inclusive && l.version == u.version => {
                Some(&l.version)
            }
            _ => None,
        }
    }

    /// Check if a version satisfies this range.
    pub fn contains(&self, version: &Version) -> bool {
        let above_lower = self.lower.as_ref().map_or(true, |b| match version.cmp(&b.version) {
            Ordering::Greater => true,
            Ordering::Equal => b.inclusive,
            Ordering::Less => false,
        });
        let below_upper = self.upper.as_ref().map_or(true, |b| match version.cmp(&b.version) {
            Ordering::Less => true,
            Ordering::Equal => b.inclusive,
            Ordering::Greater => false,
        });
        above_lower && below_upper
    }

    /// Whether no version at all can satisfy the range.
    pub fn is_empty(&self) -> bool {
        match (&self.lower, &self.upper) {
            (Some(l), Some(u)) => match l.version.cmp(&u.version) {
                Ordering::Greater => true,
                Ordering::Equal => !(l.inclusive && u.inclusive),
                Ordering::Less => false,
            },
            _ => false,
        }
    }

    /// The overlap of two ranges, or `None` when they are disjoint.
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let lower = tighter(self.lower.as_ref(), other.lower.as_ref(), Ordering::Greater);
        let upper = tighter(self.upper.as_ref(), other.upper.as_ref(), Ordering::Less);
        let range = Self { lower, upper };
        (!range.is_empty()).then_some(range)
    }
}

/// Pick the more restrictive of two bounds. `prefer` is the ordering that
/// makes a bound tighter (greater for lower bounds, less for upper bounds).
fn tighter(a: Option<&Bound>, b: Option<&Bound>, prefer: Ordering) -> Option<Bound> {
    match (a, b) {
        (None, None) => None,
        (Some(x), None) | (None, Some(x)) => Some(x.clone()),
        (Some(x), Some(y)) => match x.version.cmp(&y.version) {
            Ordering::Equal => Some(Bound {
                version: x.version.clone(),
                inclusive: x.inclusive && y.inclusive,
            }),
            ord if ord == prefer => Some(x.clone()),
            _ => Some(y.clone()),
        },
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(v) = self.as_exact() {
            return write!(f, "{v}");
        }
        let open = match &self.lower {
            Some(b) if b.inclusive => '[',
            _ => '(',
        };
        let close = match &self.upper {
            Some(b) if b.inclusive => ']',
            _ => ')',
        };
        let lower = self.lower.as_ref().map(|b| b.version.to_string()).unwrap_or_default();
        let upper = self.upper.as_ref().map(|b| b.version.to_string()).unwrap_or_default();
        write!(f, "{open}{lower},{upper}{close}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s)
    }

    fn range(s: &str) -> VersionRange {
        match VersionExpr::parse(s).unwrap() {
            VersionExpr::Range(r) => r,
            VersionExpr::Default => panic!("expected a range for {s}"),
        }
    }

    #[test]
    fn basic_ordering() {
        assert!(v("8") < v("11"));
        assert!(v("11") < v("17"));
        assert!(v("1.8") < v("11"));
    }

    #[test]
    fn three_part_ordering() {
        assert!(v("1.0.0") < v("1.0.1"));
        assert!(v("1.0.1") < v("1.1.0"));
    }

    #[test]
    fn qualifier_free_sorts_above_qualified() {
        let alpha = v("1.0-alpha");
        let beta = v("1.0-beta");
        let rc = v("1.0-rc");
        let snapshot = v("1.0-SNAPSHOT");
        let sp = v("1.0-sp");
        let release = v("1.0");

        assert!(alpha < beta);
        assert!(beta < rc);
        assert!(rc < snapshot);
        assert!(snapshot < sp);
        assert!(sp < release);
        assert!(v("1.0.0-jre") < v("1.0.0"));
    }

    #[test]
    fn trailing_zeros_equal() {
        assert_eq!(v("11"), v("11.0"));
        assert_eq!(v("1.0"), v("1.0.0"));
        assert_eq!(v("2.0-final"), v("2.0"));
    }

    #[test]
    fn ndk_style_versions() {
        assert!(v("26.3.11579264") < v("27.0.12077973"));
    }

    #[test]
    fn long_numeric_segments_stay_numeric() {
        assert!(v("99999999999999999999") > v("1"));
        assert!(v("1.99999999999999999999") < v("2"));
        assert!(v("100000000000000000000") > v("99999999999999999999"));
        assert_eq!(v("007"), v("7"));
    }

    #[test]
    fn qualifier_numbers_compare_numerically() {
        assert!(v("1.0-rc2") < v("1.0-rc10"));
        assert!(v("1.0-rc") < v("1.0-rc1"));
        assert!(v("1.0-rc10") < v("1.0"));
        assert!(v("1.0-alpha3") < v("1.0-beta1"));
        assert_eq!(v("1.0-rc1"), v("1.0-rc-1"));
    }

    #[test]
    fn is_qualified() {
        assert!(v("1.0-rc1").is_qualified());
        assert!(!v("34").is_qualified());
    }

    #[test]
    fn expression_markers_are_default() {
        assert_eq!(VersionExpr::parse("default").unwrap(), VersionExpr::Default);
        assert_eq!(VersionExpr::parse("INHERIT").unwrap(), VersionExpr::Default);
        assert_eq!(VersionExpr::parse("  ").unwrap(), VersionExpr::Default);
    }

    #[test]
    fn exact_expression() {
        let r = range("11");
        assert_eq!(r.as_exact(), Some(&v("11")));
        assert!(r.contains(&v("11.0")));
        assert!(!r.contains(&v("17")));
    }

    #[test]
    fn minimum_expressions() {
        for expr in [">=21", "21+"] {
            let r = range(expr);
            assert!(!r.contains(&v("19")), "{expr}");
            assert!(r.contains(&v("21")), "{expr}");
            assert!(r.contains(&v("35")), "{expr}");
        }
        assert!(!range(">21").contains(&v("21")));
    }

    #[test]
    fn maximum_expressions() {
        assert!(range("<=34").contains(&v("34")));
        assert!(!range("<34").contains(&v("34")));
        assert!(range("<34").contains(&v("33")));
    }

    #[test]
    fn malformed_expressions_rejected() {
        assert!(VersionExpr::parse(">=").is_err());
        assert!(VersionExpr::parse("[").is_err());
        assert!(VersionExpr::parse("[1.0").is_err());
        assert!(VersionExpr::parse("(1.0)").is_err());
    }

    #[test]
    fn maven_range_inclusive() {
        let r = VersionRange::parse("[1.0,2.0]").unwrap();
        assert!(r.contains(&v("1.0")));
        assert!(r.contains(&v("1.5")));
        assert!(r.contains(&v("2.0")));
        assert!(!r.contains(&v("0.9")));
        assert!(!r.contains(&v("2.1")));
    }

    #[test]
    fn maven_range_exclusive_upper() {
        let r = VersionRange::parse("[1.0,2.0)").unwrap();
        assert!(r.contains(&v("1.9.9")));
        assert!(!r.contains(&v("2.0")));
    }

    #[test]
    fn maven_range_open_lower() {
        let r = VersionRange::parse("(,2.0)").unwrap();
        assert!(r.contains(&v("1.0")));
        assert!(!r.contains(&v("2.0")));
    }

    #[test]
    fn maven_range_exact() {
        let r = VersionRange::parse("[1.5]").unwrap();
        assert!(r.contains(&v("1.5")));
        assert!(!r.contains(&v("1.4")));
    }

    #[test]
    fn bare_version_not_a_range() {
        assert!(VersionRange::parse("1.0").is_none());
    }

    #[test]
    fn intersection_of_pin_and_floor() {
        let both = range("11").intersect(&range(">=8")).unwrap();
        assert_eq!(both.as_exact(), Some(&v("11")));
    }

    #[test]
    fn disjoint_pins_do_not_intersect() {
        assert!(range("11").intersect(&range("17")).is_none());
        assert!(range(">=11").intersect(&range("<=8")).is_none());
        assert!(range(">11").intersect(&range("<=11")).is_none());
    }

    #[test]
    fn touching_inclusive_bounds_intersect() {
        let r = range(">=11").intersect(&range("<=11")).unwrap();
        assert_eq!(r.as_exact(), Some(&v("11")));
    }

    #[test]
    fn display() {
        assert_eq!(range("11").to_string(), "11");
        assert_eq!(range(">=21").to_string(), "[21,)");
        assert_eq!(range("<35").to_string(), "(,35)");
    }
}
