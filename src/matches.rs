use std::fmt;

use crate::inline_string::*;

pub use OperandMatch::*;

/// Half-open interval `[lower, upper)` of positions within one target sequence.
///
/// Ranges from different targets are never compared directly.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Range {
    pub lower: usize,
    pub upper: usize,
}

impl Range {
    pub fn new(lower: usize, upper: usize) -> Self {
        assert!(lower <= upper, "Invalid range [{}, {})", lower, upper);
        Self { lower, upper }
    }

    pub fn len(&self) -> usize {
        self.upper - self.lower
    }

    pub fn is_empty(&self) -> bool {
        self.lower == self.upper
    }

    /// Length of the overlap between two ranges, 0 if they are disjoint.
    pub fn intersection_length(self, other: Range) -> usize {
        let lower = self.lower.max(other.lower);
        let upper = self.upper.min(other.upper);
        upper.saturating_sub(lower)
    }

    /// Whether either range wholly contains the other.
    pub fn fully_contains(self, other: Range) -> bool {
        (self.lower <= other.lower && other.upper <= self.upper)
            || (other.lower <= self.lower && self.upper <= other.upper)
    }

    /// Smallest range covering both inputs.
    pub fn union(self, other: Range) -> Range {
        Range {
            lower: self.lower.min(other.lower),
            upper: self.upper.max(other.upper),
        }
    }

    /// Smallest range covering all inputs, `None` for an empty iterator.
    pub fn union_all(ranges: impl IntoIterator<Item = Range>) -> Option<Range> {
        ranges.into_iter().reduce(Range::union)
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}, {})", self.lower, self.upper)
    }
}

/// Identifies one target sequence within a search (e.g. read 1 vs. read 2).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TargetId(pub u16);

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// The part of one target sequence that a match covers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MatchedRange {
    pub target: TargetId,
    pub range: Range,
}

/// A named capture-group boundary: the start or end of a reported sub-region
/// (barcode, UMI, adapter) at a position within one target.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GroupEdge {
    pub name: InlineString,
    pub start: bool,
    pub target: TargetId,
    pub position: usize,
}

impl GroupEdge {
    pub fn new(name: &str, start: bool, target: TargetId, position: usize) -> Self {
        Self {
            name: InlineString::new(name),
            start,
            target,
            position,
        }
    }
}

impl fmt::Display for GroupEdge {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.start {
            write!(f, "{}>@{}:{}", self.name, self.target, self.position)
        } else {
            write!(f, "<{}@{}:{}", self.name, self.target, self.position)
        }
    }
}

/// A scored, positioned candidate annotation of part of a target sequence.
///
/// Higher scores are better. A match covers one range per target; composite
/// matches built by a multi-target combiner cover several targets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Match {
    pub score: i64,
    pub ranges: Vec<MatchedRange>,
    pub edges: Vec<GroupEdge>,
}

impl Match {
    pub fn new(score: i64, target: TargetId, range: Range) -> Self {
        Self {
            score,
            ranges: vec![MatchedRange { target, range }],
            edges: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_edge(mut self, edge: GroupEdge) -> Self {
        self.edges.push(edge);
        self
    }

    /// Starting coordinate of the leftmost covered range.
    pub fn start(&self) -> Option<usize> {
        self.ranges.iter().map(|r| r.range.lower).min()
    }
}

impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "score {}:", self.score)?;
        for r in &self.ranges {
            write!(f, " {}{}", r.target, r.range)?;
        }
        for e in &self.edges {
            write!(f, " {}", e)?;
        }
        Ok(())
    }
}

/// One operand's contribution to a combination.
///
/// `Absent` stands in for a logically-absent optional operand (e.g. the
/// non-matching side of an OR): it contributes zero score and no range, and
/// is only legal when the combiner settings allow it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OperandMatch {
    Present(Match),
    Absent,
}

impl OperandMatch {
    pub fn score(&self) -> i64 {
        match self {
            Present(m) => m.score,
            Absent => 0,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Absent)
    }

    pub fn as_match(&self) -> Option<&Match> {
        match self {
            Present(m) => Some(m),
            Absent => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersection_length() {
        let a = Range::new(0, 5);
        assert_eq!(a.intersection_length(Range::new(3, 8)), 2);
        assert_eq!(a.intersection_length(Range::new(5, 8)), 0);
        assert_eq!(a.intersection_length(Range::new(7, 9)), 0);
        assert_eq!(a.intersection_length(Range::new(1, 3)), 2);
        assert_eq!(a.intersection_length(a), 5);
    }

    #[test]
    fn fully_contains() {
        let a = Range::new(2, 8);
        assert!(a.fully_contains(Range::new(3, 5)));
        assert!(Range::new(3, 5).fully_contains(a));
        assert!(a.fully_contains(a));
        assert!(!a.fully_contains(Range::new(0, 5)));
        assert!(!a.fully_contains(Range::new(9, 12)));
    }

    #[test]
    fn union_all() {
        let union = Range::union_all([Range::new(4, 6), Range::new(0, 2), Range::new(5, 9)]);
        assert_eq!(union, Some(Range::new(0, 9)));
        assert_eq!(Range::union_all([]), None);
    }

    #[test]
    #[should_panic(expected = "Invalid range")]
    fn inverted_range() {
        Range::new(4, 2);
    }

    #[test]
    fn absent_scores_zero() {
        assert_eq!(Absent.score(), 0);
        assert_eq!(Present(Match::new(7, TargetId(0), Range::new(0, 3))).score(), 7);
    }
}
