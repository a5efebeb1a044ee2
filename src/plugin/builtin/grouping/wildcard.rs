//! Wildcard patterns with constrained captures.
//!
//! A pattern is literal text plus `*` wildcards. Each wildcard captures a
//! substring which may be validated against a constraint, either written
//! inline as a `{...}` span in the pattern or supplied positionally in a
//! comma-separated constraint list.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// A single capture constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// No restriction on the capture.
    Free,
    /// The capture must be the empty string.
    Empty,
    /// The capture must be all digits parsing to an integer in the
    /// inclusive range.
    Range(u64, u64),
    /// The capture must equal one of the listed values.
    OneOf(Vec<String>),
    /// The capture must equal the literal string.
    Literal(String),
}

/// The constraint list does not line up with the wildcards in the pattern.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("pattern has {stars} wildcard(s) but the constraint list has {entries} entries")]
pub struct ConstraintCountError {
    pub stars: usize,
    pub entries: usize,
}

/// A compiled wildcard pattern: literal runs separated by constrained
/// wildcards. `literals.len()` is always `constraints.len() + 1`.
#[derive(Debug, Clone)]
pub struct Pattern {
    literals: Vec<Vec<char>>,
    constraints: Vec<Constraint>,
}

impl Pattern {
    /// Compile a pattern with an optional constraint list.
    ///
    /// When a constraint list is given, it must have exactly one entry per
    /// wildcard; an empty entry leaves that capture unconstrained. An inline
    /// `{...}` span in the pattern is itself a wildcard and keeps its inline
    /// constraint.
    pub fn new(pattern: &str, constraints: Option<&str>) -> Result<Self, ConstraintCountError> {
        let mut literals = vec![Vec::new()];
        let mut inline: Vec<Option<Constraint>> = Vec::new();

        let mut rest = pattern;
        while let Some(c) = rest.chars().next() {
            match c {
                '*' => {
                    inline.push(None);
                    literals.push(Vec::new());
                    rest = &rest[1..];
                }
                '{' => match rest.find('}') {
                    Some(close) => {
                        inline.push(Some(parse_braced(&rest[1..close])));
                        literals.push(Vec::new());
                        rest = &rest[close + 1..];
                    }
                    None => {
                        literals.last_mut().unwrap().push('{');
                        rest = &rest[1..];
                    }
                },
                c => {
                    literals.last_mut().unwrap().push(c);
                    rest = &rest[c.len_utf8()..];
                }
            }
        }

        let stars = inline.len();
        let mut constraints = match constraints {
            Some(list) => {
                let entries = split_entries(list);
                if entries.len() != stars {
                    return Err(ConstraintCountError {
                        stars,
                        entries: entries.len(),
                    });
                }
                entries.iter().map(|entry| parse_entry(entry)).collect()
            }
            None => vec![Constraint::Free; stars],
        };
        for (constraint, inline) in constraints.iter_mut().zip(inline) {
            if let Some(inline) = inline {
                *constraint = inline;
            }
        }

        Ok(Self {
            literals,
            constraints,
        })
    }

    /// Match a filename against this pattern, returning the captures of the
    /// first assignment that consumes the whole name, or `None`.
    pub fn matches(&self, name: &str) -> Option<Vec<String>> {
        let chars: Vec<char> = name.chars().collect();
        let prefix = &self.literals[0];
        let suffix = self.literals.last().unwrap();

        if self.constraints.is_empty() {
            return if chars == *prefix { Some(Vec::new()) } else { None };
        }
        if chars.len() < prefix.len() + suffix.len() {
            return None;
        }
        if !chars.starts_with(prefix) || !chars.ends_with(suffix) {
            return None;
        }

        let mid = &chars[prefix.len()..chars.len() - suffix.len()];
        let lits = &self.literals[1..self.constraints.len()];
        let mut captures = Vec::with_capacity(self.constraints.len());
        if backtrack(mid, lits, &self.constraints, 0, 0, &mut captures) {
            Some(captures)
        } else {
            None
        }
    }
}

/// Backtracking match over the middle of the name. Worst case O(|mid|^k) for
/// k wildcards; constraint pruning keeps real patterns fast.
fn backtrack(
    mid: &[char],
    lits: &[Vec<char>],
    constraints: &[Constraint],
    star: usize,
    pos: usize,
    captures: &mut Vec<String>,
) -> bool {
    // The last wildcard must consume everything that is left.
    if star + 1 == constraints.len() {
        let capture: String = mid[pos..].iter().collect();
        if constraints[star].allows(&capture) {
            captures.push(capture);
            return true;
        }
        return false;
    }

    let lit = &lits[star];
    let rest_min: usize = lits[star..].iter().map(Vec::len).sum();
    let available = match (mid.len() - pos).checked_sub(rest_min) {
        Some(n) => n,
        None => return false,
    };

    for take in 0..=available {
        let capture: String = mid[pos..pos + take].iter().collect();
        if !constraints[star].allows(&capture) {
            continue;
        }
        let next = pos + take;
        if mid[next..].starts_with(lit.as_slice()) {
            captures.push(capture);
            if backtrack(mid, lits, constraints, star + 1, next + lit.len(), captures) {
                return true;
            }
            captures.pop();
        }
    }
    false
}

impl Constraint {
    /// Whether the candidate capture satisfies this constraint.
    pub fn allows(&self, capture: &str) -> bool {
        match self {
            Self::Free => true,
            Self::Empty => capture.is_empty(),
            Self::Range(lo, hi) => {
                is_digits(capture)
                    && capture
                        .parse::<u64>()
                        .map_or(false, |n| (*lo..=*hi).contains(&n))
            }
            Self::OneOf(values) => values.iter().any(|v| v == capture),
            Self::Literal(value) => capture == value,
        }
    }
}

static BRACED: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{[^{}]*\}").unwrap());

/// Split a constraint list on commas. Because `,` also separates values
/// inside `{v1,v2}` entries, every braced span is masked with an indexed
/// placeholder first, then the list is split, then the spans are restored.
fn split_entries(list: &str) -> Vec<String> {
    let mut spans = Vec::new();
    let masked = BRACED.replace_all(list, |caps: &regex::Captures<'_>| {
        spans.push(caps[0].to_string());
        format!("\u{1}{}\u{2}", spans.len() - 1)
    });

    masked
        .split(',')
        .map(|entry| {
            let mut entry = entry.to_string();
            while let Some(start) = entry.find('\u{1}') {
                let end = entry.find('\u{2}').expect("placeholder is well formed");
                let index: usize = entry[start + 1..end].parse().expect("placeholder index");
                entry.replace_range(start..=end, &spans[index]);
            }
            entry
        })
        .collect()
}

/// Parse one constraint list entry.
fn parse_entry(entry: &str) -> Constraint {
    let entry = entry.trim();
    if entry.is_empty() {
        return Constraint::Free;
    }
    if let Some(inner) = entry.strip_prefix('{').and_then(|e| e.strip_suffix('}')) {
        return parse_braced(inner);
    }
    Constraint::Literal(entry.to_string())
}

/// Parse the contents of a braced constraint.
fn parse_braced(inner: &str) -> Constraint {
    if inner.is_empty() {
        return Constraint::Empty;
    }
    if inner.contains(',') {
        return Constraint::OneOf(inner.split(',').map(|v| v.trim().to_string()).collect());
    }
    if let Some((lo, hi)) = inner.split_once('-') {
        if is_digits(lo) && is_digits(hi) {
            if let (Ok(lo), Ok(hi)) = (lo.parse(), hi.parse()) {
                return Constraint::Range(lo, hi);
            }
        }
    }
    if is_digits(inner) {
        if let Ok(n) = inner.parse() {
            return Constraint::Range(n, n);
        }
    }
    Constraint::Literal(inner.to_string())
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

////////////////////////////////////////////////////////////////////////////////
// Unit tests
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn split_entries_plain() {
        assert_eq!(split_entries("a,b,c"), ["a", "b", "c"]);
    }

    #[test]
    fn split_entries_braced_commas() {
        assert_eq!(
            split_entries("{100-111},{ME,YOU}"),
            ["{100-111}", "{ME,YOU}"]
        );
    }

    #[test]
    fn split_entries_empty_positions() {
        assert_eq!(split_entries(",{ME}"), ["", "{ME}"]);
        assert_eq!(split_entries("{ME},"), ["{ME}", ""]);
        assert_eq!(split_entries(",,"), ["", "", ""]);
    }

    #[test]
    fn parse_entry_kinds() {
        assert_eq!(parse_entry(""), Constraint::Free);
        assert_eq!(parse_entry("{}"), Constraint::Empty);
        assert_eq!(parse_entry("{100-999}"), Constraint::Range(100, 999));
        assert_eq!(parse_entry("{7}"), Constraint::Range(7, 7));
        assert_eq!(
            parse_entry("{jpg,png}"),
            Constraint::OneOf(vec!["jpg".into(), "png".into()])
        );
        assert_eq!(parse_entry("{raw}"), Constraint::Literal("raw".into()));
        assert_eq!(parse_entry("raw"), Constraint::Literal("raw".into()));
        // A dash between non-digits is not a range.
        assert_eq!(parse_entry("{a-b}"), Constraint::Literal("a-b".into()));
    }

    #[test]
    fn constraint_allows() {
        assert!(Constraint::Free.allows("anything"));
        assert!(Constraint::Empty.allows(""));
        assert!(!Constraint::Empty.allows("x"));
        assert!(Constraint::Range(100, 111).allows("103"));
        assert!(Constraint::Range(100, 111).allows("0103"));
        assert!(!Constraint::Range(100, 111).allows("99"));
        assert!(!Constraint::Range(100, 111).allows("abc"));
        assert!(Constraint::Range(7, 7).allows("007"));
        assert!(!Constraint::Range(100, 111).allows(""));
    }

    #[test]
    fn pattern_count_mismatch_is_rejected() {
        let err = Pattern::new("DSC*", Some("{1},{2}")).unwrap_err();
        assert_eq!(err, ConstraintCountError { stars: 1, entries: 2 });
        assert!(Pattern::new("*_*", Some("{1}")).is_err());
    }

    #[test]
    fn pattern_empty_position_is_free() {
        let pattern = Pattern::new("DSC*_*", Some(",{ME}")).unwrap();
        assert_eq!(
            pattern.matches("DSCabc_ME"),
            Some(vec!["abc".into(), "ME".into()])
        );
        assert_eq!(pattern.matches("DSCabc_YOU"), None);
    }

    #[test]
    fn pattern_range_and_set() {
        let pattern = Pattern::new("DSC*_*", Some("{100-111},{ME,YOU}")).unwrap();
        assert_eq!(
            pattern.matches("DSC103_ME"),
            Some(vec!["103".into(), "ME".into()])
        );
        assert_eq!(pattern.matches("DSC099_ME"), None);
        assert_eq!(pattern.matches("DSC103_US"), None);
    }

    #[test]
    fn pattern_no_wildcards_is_exact() {
        let pattern = Pattern::new("exact.txt", None).unwrap();
        assert_eq!(pattern.matches("exact.txt"), Some(vec![]));
        assert_eq!(pattern.matches("exact.txt2"), None);
    }

    #[test]
    fn pattern_consecutive_stars() {
        let pattern = Pattern::new("**_*", None).unwrap();
        // Each star gets its own capture, possibly empty; the first
        // assignment found wins.
        assert_eq!(
            pattern.matches("ab_c"),
            Some(vec!["".into(), "ab".into(), "c".into()])
        );
        assert_eq!(pattern.matches("abc"), None);
    }

    #[test]
    fn pattern_dot_separator() {
        let pattern = Pattern::new("*.*", None).unwrap();
        assert_eq!(
            pattern.matches("archive.tar.gz"),
            Some(vec!["archive".into(), "tar.gz".into()])
        );
        assert_eq!(pattern.matches("nodots"), None);
    }

    #[test]
    fn pattern_inline_constraints() {
        let pattern = Pattern::new("IMG_{100-200}.{jpg,png}", None).unwrap();
        assert_eq!(
            pattern.matches("IMG_150.jpg"),
            Some(vec!["150".into(), "jpg".into()])
        );
        assert_eq!(pattern.matches("IMG_99.jpg"), None);
        assert_eq!(pattern.matches("IMG_150.gif"), None);
    }

    #[test]
    fn pattern_inline_between_stars() {
        let pattern = Pattern::new("*{100-999}*.jpg", None).unwrap();
        assert_eq!(
            pattern.matches("DSC500A.jpg"),
            Some(vec!["DSC".into(), "500".into(), "A".into()])
        );
        assert_eq!(pattern.matches("DSC99.jpg"), None);
        assert_eq!(pattern.matches("DSC500A.png"), None);
    }

    #[test]
    fn pattern_inline_kept_over_list_entry() {
        let pattern = Pattern::new("IMG_*.{jpg,png}", Some("{1000-9999},{jpg,png}")).unwrap();
        assert_eq!(
            pattern.matches("IMG_1234.png"),
            Some(vec!["1234".into(), "png".into()])
        );
        assert_eq!(pattern.matches("IMG_123.png"), None);
    }

    #[test]
    fn pattern_empty_string_constraint() {
        let pattern = Pattern::new("a*b", Some("{}")).unwrap();
        assert_eq!(pattern.matches("ab"), Some(vec!["".into()]));
        assert_eq!(pattern.matches("axb"), None);
    }

    #[test]
    fn pattern_backtracks_over_repeated_separators() {
        let pattern = Pattern::new("*_*", Some("{1-9},")).unwrap();
        // The first underscore split fails the range, the second succeeds.
        assert_eq!(
            pattern.matches("x_1_y"),
            None,
        );
        assert_eq!(
            pattern.matches("1_x_y"),
            Some(vec!["1".into(), "x_y".into()])
        );
    }

    #[test]
    fn pattern_unclosed_brace_is_literal() {
        let pattern = Pattern::new("a{b*", None).unwrap();
        assert_eq!(pattern.matches("a{bXY"), Some(vec!["XY".into()]));
    }
}
