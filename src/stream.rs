use crate::errors::*;
use crate::matches::*;

pub use StreamOrder::*;

/// Ordering guarantee a match stream declares for its output.
///
/// `ByScore` streams yield non-increasing scores and `ByCoordinate` streams
/// yield non-decreasing starting positions, but only approximately when the
/// producer itself used a heuristic (unfair) sub-search.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StreamOrder {
    ByScore,
    ByCoordinate,
}

/// A lazily-produced sequence of candidate matches from one operand.
///
/// `pull` yields `None` once the stream is exhausted and keeps yielding
/// `None` on every further call. Errors from the underlying matcher
/// propagate unchanged and abort the search that pulled them.
pub trait MatchStream {
    fn pull(&mut self) -> Result<Option<OperandMatch>>;

    fn order(&self) -> StreamOrder;

    /// Cap how many matches this stream hands out before reporting
    /// end-of-stream, bounding unfair-mode searches over patterns with
    /// unbounded match counts (e.g. repeats).
    #[must_use]
    fn capped(self, limit: usize) -> Capped<Self>
    where
        Self: Sized,
    {
        Capped::new(self, limit)
    }

    #[must_use]
    fn boxed(self) -> Box<dyn MatchStream>
    where
        Self: Sized + 'static,
    {
        Box::new(self)
    }
}

impl<S: MatchStream + ?Sized> MatchStream for Box<S> {
    fn pull(&mut self) -> Result<Option<OperandMatch>> {
        (**self).pull()
    }

    fn order(&self) -> StreamOrder {
        (**self).order()
    }
}

/// Stream over an already-materialized buffer of matches, in the order given.
///
/// Used by leaf matchers that compute all candidates up front, and by tests.
pub struct VecStream {
    matches: std::vec::IntoIter<OperandMatch>,
    order: StreamOrder,
}

impl VecStream {
    pub fn new(order: StreamOrder, matches: Vec<OperandMatch>) -> Self {
        Self {
            matches: matches.into_iter(),
            order,
        }
    }

    pub fn from_matches(order: StreamOrder, matches: Vec<Match>) -> Self {
        Self::new(order, matches.into_iter().map(Present).collect())
    }

    /// A stream whose only "match" is the absent placeholder, used to wrap
    /// optional operands that did not match.
    pub fn absent(order: StreamOrder) -> Self {
        Self::new(order, vec![Absent])
    }
}

impl MatchStream for VecStream {
    fn pull(&mut self) -> Result<Option<OperandMatch>> {
        Ok(self.matches.next())
    }

    fn order(&self) -> StreamOrder {
        self.order
    }
}

/// The unfair sorter limit: treats the inner stream as exhausted after
/// `limit` matches regardless of further availability.
pub struct Capped<S: MatchStream> {
    stream: S,
    remaining: usize,
}

impl<S: MatchStream> Capped<S> {
    pub fn new(stream: S, limit: usize) -> Self {
        Self {
            stream,
            remaining: limit,
        }
    }
}

impl<S: MatchStream> MatchStream for Capped<S> {
    fn pull(&mut self) -> Result<Option<OperandMatch>> {
        if self.remaining == 0 {
            return Ok(None);
        }

        let res = self.stream.pull()?;
        if res.is_some() {
            self.remaining -= 1;
        }
        Ok(res)
    }

    fn order(&self) -> StreamOrder {
        self.stream.order()
    }
}
