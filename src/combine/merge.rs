use crate::combine::*;
use crate::matches::*;

/// Merges the selected sub-matches into one composite match.
///
/// Under independent targets, per-target ranges and group edges are
/// concatenated and re-indexed by combination position; an absent operand
/// keeps its placeholder slot but contributes no range. Under a single
/// target, the composite range is the union of the selected ranges and the
/// group edges are merged. Scores combine per the policy, with absent
/// operands contributing zero.
pub fn combine_matches(
    selected: &[&OperandMatch],
    score: ScorePolicy,
    targets: TargetMode,
) -> Match {
    let score = match score {
        Sum => selected.iter().map(|m| m.score()).sum(),
        Max => selected
            .iter()
            .filter_map(|m| m.as_match().map(|m| m.score))
            .max()
            .unwrap_or(0),
    };

    match targets {
        TargetMode::IndependentTargets => {
            let mut ranges = Vec::new();
            let mut edges = Vec::new();
            let mut slot = 0u16;

            for m in selected {
                match m {
                    Present(m) => {
                        for mr in &m.ranges {
                            let target = TargetId(slot + position_of(m, mr.target));
                            ranges.push(MatchedRange {
                                target,
                                range: mr.range,
                            });
                        }
                        for e in &m.edges {
                            edges.push(GroupEdge {
                                target: TargetId(slot + position_of(m, e.target)),
                                ..*e
                            });
                        }
                        slot += m.ranges.len().max(1) as u16;
                    }
                    // placeholder slot with no range
                    Absent => slot += 1,
                }
            }

            Match {
                score,
                ranges,
                edges,
            }
        }
        TargetMode::SingleTarget { .. } => {
            let mut target = TargetId(0);
            let mut ranges = Vec::new();
            let mut edges = Vec::new();

            for m in selected {
                if let Present(m) = m {
                    // single-range contract enforced at intake
                    let mr = m.ranges[0];
                    target = mr.target;
                    ranges.push(mr.range);
                    edges.extend(m.edges.iter().copied());
                }
            }

            Match {
                score,
                ranges: Range::union_all(ranges)
                    .map(|range| MatchedRange { target, range })
                    .into_iter()
                    .collect(),
                edges,
            }
        }
    }
}

fn position_of(m: &Match, target: TargetId) -> u16 {
    m.ranges
        .iter()
        .position(|mr| mr.target == target)
        .unwrap_or(0) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    fn present(score: i64, lower: usize, upper: usize) -> OperandMatch {
        Present(Match::new(score, TargetId(0), Range::new(lower, upper)))
    }

    const SINGLE: TargetMode = TargetMode::SingleTarget {
        bounds: Range {
            lower: 0,
            upper: 100,
        },
    };

    #[test]
    fn sum_adds_scores_and_unions_ranges() {
        let a = present(10, 0, 3);
        let b = present(5, 5, 8);
        let m = combine_matches(&[&a, &b], Sum, SINGLE);

        assert_eq!(m.score, 15);
        assert_eq!(
            m.ranges,
            vec![MatchedRange {
                target: TargetId(0),
                range: Range::new(0, 8),
            }]
        );
    }

    #[test]
    fn union_spans_all_selected_ranges() {
        let a = present(1, 4, 6);
        let b = present(1, 0, 2);
        let c = present(1, 7, 9);
        let m = combine_matches(&[&a, &b, &c], Sum, SINGLE);

        assert_eq!(m.ranges.len(), 1);
        assert_eq!(m.ranges[0].range, Range::new(0, 9));
    }

    #[test]
    fn max_takes_best_score() {
        let a = present(3, 0, 3);
        let b = present(8, 5, 8);
        let m = combine_matches(&[&a, &b], Max, SINGLE);
        assert_eq!(m.score, 8);
    }

    #[test]
    fn absent_contributes_zero_and_no_range() {
        let a = present(-4, 2, 6);
        let m = combine_matches(&[&a, &Absent], Sum, SINGLE);
        assert_eq!(m.score, -4);
        assert_eq!(m.ranges.len(), 1);

        let m = combine_matches(&[&a, &Absent], Max, SINGLE);
        assert_eq!(m.score, -4);

        let m = combine_matches(&[&Absent, &Absent], Max, SINGLE);
        assert_eq!(m.score, 0);
        assert!(m.ranges.is_empty());
    }

    #[test]
    fn group_edges_merge() {
        let a = present(2, 0, 4);
        let b = Present(
            Match::new(3, TargetId(0), Range::new(6, 9))
                .with_edge(GroupEdge::new("umi", true, TargetId(0), 6))
                .with_edge(GroupEdge::new("umi", false, TargetId(0), 9)),
        );
        let m = combine_matches(&[&a, &b], Sum, SINGLE);

        assert_eq!(m.edges.len(), 2);
        assert_eq!(m.edges[0].name.as_str(), "umi");
        assert_eq!(m.ranges[0].range, Range::new(0, 9));
    }

    #[test]
    fn independent_targets_reindex_by_position() {
        let a = Present(
            Match::new(4, TargetId(0), Range::new(1, 5))
                .with_edge(GroupEdge::new("bc", true, TargetId(0), 1)),
        );
        let b = Present(Match::new(6, TargetId(0), Range::new(0, 7)));
        let m = combine_matches(&[&a, &Absent, &b], Sum, TargetMode::IndependentTargets);

        assert_eq!(m.score, 10);
        assert_eq!(m.ranges.len(), 2);
        assert_eq!(m.ranges[0].target, TargetId(0));
        // the absent middle operand keeps its slot
        assert_eq!(m.ranges[1].target, TargetId(2));
        assert_eq!(m.edges[0].target, TargetId(0));
    }
}
