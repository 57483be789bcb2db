use crate::errors::*;
use crate::matches::*;
use crate::stream::*;

pub mod state;
use state::*;

pub mod validate;
use validate::*;

pub mod merge;
use merge::*;

pub mod coord;
use coord::*;

pub mod score;
use score::*;

pub use Fairness::*;
pub use ScorePolicy::*;
pub use ValidationRule::*;

/// Positional compatibility rule a combination of sub-matches must satisfy.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ValidationRule {
    /// No positional constraint; used when operands are semantically
    /// independent (e.g. they cover different target sequences).
    Always,
    /// No two selected ranges may overlap at all.
    Intersection,
    /// Selected ranges must appear left to right, non-overlapping, in
    /// operand declaration order.
    Order,
}

/// How the scores of the selected sub-matches combine into one score.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ScorePolicy {
    Sum,
    Max,
}

/// Exact-and-complete vs. approximate-and-bounded enumeration.
///
/// `Fair` enumerates every valid combination up front and serves them in
/// exact descending score order; it only terminates if every operand stream
/// is bounded. `Unfair` streams results lazily in approximate order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Fairness {
    Fair,
    Unfair,
}

/// Whether operands cover the same target sequence or one target each.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TargetMode {
    /// All operands match within one target; composite ranges are unions.
    /// The bounds are only used to validate incoming matches, never to
    /// search.
    SingleTarget { bounds: Range },
    /// Each operand covers its own target; composite matches concatenate
    /// the per-target ranges, re-indexed by combination position.
    IndependentTargets,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CombinerSettings {
    pub rule: ValidationRule,
    pub score: ScorePolicy,
    pub order: StreamOrder,
    pub fairness: Fairness,
    pub targets: TargetMode,
    pub allow_absent: bool,
}

impl CombinerSettings {
    /// AND semantics: operands anywhere in the target, non-overlapping,
    /// scores summed, enumerated by score.
    pub fn and(bounds: Range, fairness: Fairness) -> Self {
        Self {
            rule: Intersection,
            score: Sum,
            order: ByScore,
            fairness,
            targets: TargetMode::SingleTarget { bounds },
            allow_absent: false,
        }
    }

    /// PLUS semantics: operands left to right with gaps allowed, scores
    /// summed, enumerated by score.
    pub fn plus(bounds: Range, fairness: Fairness) -> Self {
        Self {
            rule: Order,
            ..Self::and(bounds, fairness)
        }
    }

    /// SEQUENCE semantics: operands left to right, enumerated by starting
    /// coordinate.
    pub fn sequence(bounds: Range, fairness: Fairness) -> Self {
        Self {
            rule: Order,
            order: ByCoordinate,
            ..Self::and(bounds, fairness)
        }
    }

    /// OR semantics: the best-scoring present operand wins; operands that
    /// did not match contribute an absent placeholder.
    pub fn or(bounds: Range, fairness: Fairness) -> Self {
        Self {
            rule: Always,
            score: Max,
            allow_absent: true,
            ..Self::and(bounds, fairness)
        }
    }

    /// Combines matches across independent targets (e.g. read 1 + read 2).
    pub fn multi_target(fairness: Fairness) -> Self {
        Self {
            rule: Always,
            score: Sum,
            order: ByScore,
            fairness,
            targets: TargetMode::IndependentTargets,
            allow_absent: true,
        }
    }
}

/// Lazily combines matches from N operand streams into validated, scored
/// composite matches.
///
/// Construction checks the configuration eagerly; enumeration never raises
/// configuration errors. The combiner implements [`MatchStream`] itself, so
/// compound patterns nest: a composite with zero covered targets (every
/// operand absent) is handed upward as [`OperandMatch::Absent`].
pub struct MatchCombiner {
    inner: Traversal,
}

enum Traversal {
    Coord(CoordTraversal),
    Score(ScoreTraversal),
}

impl MatchCombiner {
    pub fn new(operands: Vec<Box<dyn MatchStream>>, settings: CombinerSettings) -> Result<Self> {
        if operands.is_empty() {
            return Err(Error::NoOperands);
        }
        if settings.targets == TargetMode::IndependentTargets && settings.rule != Always {
            return Err(Error::Config {
                reason: "positional validation cannot compare ranges across independent targets",
            });
        }
        if operands.iter().any(|op| op.order() != settings.order) {
            return Err(Error::Config {
                reason: "operand stream ordering does not match the combiner ordering",
            });
        }

        let state = CombinerState::new(operands, &settings);
        let inner = match settings.order {
            ByCoordinate => Traversal::Coord(CoordTraversal::new(state, settings)),
            ByScore => Traversal::Score(ScoreTraversal::new(state, settings)),
        };

        Ok(Self { inner })
    }

    /// Takes the next combined match, or `None` once every combination has
    /// been tried.
    pub fn take(&mut self) -> Result<Option<Match>> {
        match &mut self.inner {
            Traversal::Coord(t) => t.take(),
            Traversal::Score(t) => t.take(),
        }
    }

    /// How many combinations have been returned or rejected so far.
    pub fn returned_count(&self) -> u64 {
        self.state().returned_count()
    }

    /// Product of all operand cardinalities, `None` until every operand
    /// stream has been exhausted.
    pub fn total_combinations(&self) -> Option<u64> {
        self.state().total_combinations()
    }

    pub(crate) fn state(&self) -> &CombinerState {
        match &self.inner {
            Traversal::Coord(t) => t.state(),
            Traversal::Score(t) => t.state(),
        }
    }
}

impl MatchStream for MatchCombiner {
    fn pull(&mut self) -> Result<Option<OperandMatch>> {
        Ok(self.take()?.map(|m| {
            if m.ranges.is_empty() {
                Absent
            } else {
                Present(m)
            }
        }))
    }

    fn order(&self) -> StreamOrder {
        match &self.inner {
            Traversal::Coord(_) => ByCoordinate,
            Traversal::Score(_) => ByScore,
        }
    }
}

pub(crate) enum Candidate {
    Accepted(Match),
    Rejected,
    Seen,
}

/// Validate, memoize, and merge one candidate combination.
///
/// Every index in `idx` must already be buffered. Each distinct combination
/// index passes through here at most once with a fresh validation; later
/// visits short-circuit on the returned set or the incompatible-pair cache.
pub(crate) fn try_candidate(
    state: &mut CombinerState,
    settings: &CombinerSettings,
    idx: &[u32],
) -> Result<Candidate> {
    if state.is_returned(idx) {
        return Ok(Candidate::Seen);
    }
    if !state.check_compatible(idx) {
        return Ok(Candidate::Rejected);
    }

    let selected: Vec<&OperandMatch> = idx
        .iter()
        .enumerate()
        .map(|(port, &i)| state.get(port, i))
        .collect();

    match validate(settings.rule, idx, &selected) {
        Some(pair) => {
            state.record_incompatible(pair);
            state.mark_returned(idx.to_vec());
            Ok(Candidate::Rejected)
        }
        None => {
            let combined = combine_matches(&selected, settings.score, settings.targets);
            state.mark_returned(idx.to_vec());
            Ok(Candidate::Accepted(combined))
        }
    }
}
