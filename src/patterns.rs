use serde::Deserialize;

use crate::combine::*;
use crate::errors::*;
use crate::matches::*;
use crate::stream::*;

/// Operator tree for compound patterns.
///
/// Leaves name matcher streams supplied by the caller; interior nodes become
/// match combiners with the operator's validation and scoring semantics:
///
/// | operator   | rule         | score | enumeration   |
/// |------------|--------------|-------|---------------|
/// | `and`      | Intersection | Sum   | by score      |
/// | `plus`     | Order        | Sum   | by score      |
/// | `sequence` | Order        | Sum   | by coordinate |
/// | `or`       | Always       | Max   | by score      |
///
/// Trees are typically loaded from YAML:
/// ```text
/// and:
///   - leaf: barcode
///   - sequence:
///       - leaf: adapter
///       - leaf: umi
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternExpr {
    Leaf(String),
    And(Vec<PatternExpr>),
    Plus(Vec<PatternExpr>),
    Sequence(Vec<PatternExpr>),
    Or(Vec<PatternExpr>),
}

impl PatternExpr {
    pub fn from_yaml(yaml: &[u8]) -> Result<Self> {
        serde_yaml::from_slice(yaml).map_err(|e| Error::ParsePatterns {
            patterns: String::from_utf8_lossy(yaml).into_owned(),
            source: Box::new(e),
        })
    }

    /// Builds the combiner tree over one target, resolving each leaf name to
    /// its matcher stream with `leaf_fn`.
    ///
    /// `order` is the enumeration order the caller needs from the top of
    /// the tree; `sequence` nodes always enumerate by coordinate and
    /// therefore cannot sit under a by-score parent.
    pub fn build(
        &self,
        order: StreamOrder,
        fairness: Fairness,
        bounds: Range,
        leaf_fn: &mut dyn FnMut(&str) -> Option<Box<dyn MatchStream>>,
    ) -> Result<Box<dyn MatchStream>> {
        match self {
            PatternExpr::Leaf(name) => {
                let stream = leaf_fn(name).ok_or_else(|| Error::UnknownLeaf(name.clone()))?;
                if stream.order() != order {
                    return Err(Error::Config {
                        reason: "leaf matcher ordering does not match its position in the pattern",
                    });
                }
                Ok(stream)
            }
            PatternExpr::And(ops) => {
                let settings = CombinerSettings {
                    order,
                    ..CombinerSettings::and(bounds, fairness)
                };
                build_combiner(ops, settings, fairness, bounds, leaf_fn)
            }
            PatternExpr::Plus(ops) => {
                let settings = CombinerSettings {
                    order,
                    ..CombinerSettings::plus(bounds, fairness)
                };
                build_combiner(ops, settings, fairness, bounds, leaf_fn)
            }
            PatternExpr::Sequence(ops) => {
                if order != ByCoordinate {
                    return Err(Error::Config {
                        reason: "a sequence pattern enumerates by coordinate and cannot feed a by-score operator",
                    });
                }
                let settings = CombinerSettings::sequence(bounds, fairness);
                build_combiner(ops, settings, fairness, bounds, leaf_fn)
            }
            PatternExpr::Or(ops) => {
                let settings = CombinerSettings {
                    order,
                    ..CombinerSettings::or(bounds, fairness)
                };
                build_combiner(ops, settings, fairness, bounds, leaf_fn)
            }
        }
    }
}

fn build_combiner(
    ops: &[PatternExpr],
    settings: CombinerSettings,
    fairness: Fairness,
    bounds: Range,
    leaf_fn: &mut dyn FnMut(&str) -> Option<Box<dyn MatchStream>>,
) -> Result<Box<dyn MatchStream>> {
    let operands = ops
        .iter()
        .map(|op| op.build(settings.order, fairness, bounds, leaf_fn))
        .collect::<Result<Vec<_>>>()?;

    Ok(MatchCombiner::new(operands, settings)?.boxed())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_operator_tree() {
        let yaml = b"and:\n- leaf: barcode\n- or:\n  - leaf: adapter\n  - leaf: umi\n";
        let expr = PatternExpr::from_yaml(yaml).unwrap();

        assert_eq!(
            expr,
            PatternExpr::And(vec![
                PatternExpr::Leaf("barcode".to_owned()),
                PatternExpr::Or(vec![
                    PatternExpr::Leaf("adapter".to_owned()),
                    PatternExpr::Leaf("umi".to_owned()),
                ]),
            ])
        );
    }

    #[test]
    fn parse_error_reports_the_patterns() {
        let res = PatternExpr::from_yaml(b"nand:\n- leaf: x\n");
        assert!(matches!(res, Err(Error::ParsePatterns { .. })));
    }

    #[test]
    fn build_resolves_leaves() {
        let expr = PatternExpr::from_yaml(b"and:\n- leaf: barcode\n- leaf: adapter\n").unwrap();

        let mut leaf_fn = |name: &str| {
            let matches = match name {
                "barcode" => vec![Match::new(10, TargetId(0), Range::new(0, 4))],
                "adapter" => vec![Match::new(6, TargetId(0), Range::new(8, 12))],
                _ => return None,
            };
            Some(VecStream::from_matches(ByScore, matches).boxed())
        };

        let mut stream = expr
            .build(ByScore, Fair, Range::new(0, 50), &mut leaf_fn)
            .unwrap();

        let m = stream.pull().unwrap().unwrap();
        assert_eq!(m.as_match().unwrap().score, 16);
        assert_eq!(stream.pull().unwrap(), None);
    }

    #[test]
    fn unknown_leaf_is_an_error() {
        let expr = PatternExpr::from_yaml(b"and:\n- leaf: barcode\n- leaf: adapter\n").unwrap();
        let res = expr.build(ByScore, Fair, Range::new(0, 50), &mut |_| None);
        assert!(matches!(res, Err(Error::UnknownLeaf(_))));
    }

    #[test]
    fn sequence_under_by_score_parent_is_rejected() {
        let expr = PatternExpr::from_yaml(
            b"and:\n- leaf: barcode\n- sequence:\n  - leaf: adapter\n  - leaf: umi\n",
        )
        .unwrap();
        let res = expr.build(ByScore, Fair, Range::new(0, 50), &mut |_| {
            Some(VecStream::from_matches(ByScore, Vec::new()).boxed())
        });
        assert!(matches!(res, Err(Error::Config { .. })));
    }
}
