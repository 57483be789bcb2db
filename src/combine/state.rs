use rustc_hash::FxHashSet;

use crate::combine::*;
use crate::errors::*;
use crate::matches::*;
use crate::stream::*;

/// Identifies one selection of already-buffered matches, one intake index
/// per operand. Two different tuples never denote the same composite match.
pub type CombinationIndex = Vec<u32>;

/// A pair of sub-matches known to be positionally incompatible regardless of
/// what the other operands select; cached to prune future search.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct IncompatiblePair {
    pub port_a: usize,
    pub index_a: u32,
    pub port_b: usize,
    pub index_b: u32,
}

struct PortState {
    stream: Box<dyn MatchStream>,
    buf: Vec<OperandMatch>,
    exhausted: bool,
}

/// Per-search memo owned by one traversal strategy.
///
/// Tracks, per operand, the intake buffer and exhaustion; the set of
/// combinations already returned or rejected; and the incompatible-pair
/// cache. Never shared across searches.
pub struct CombinerState {
    ports: Vec<PortState>,
    returned: FxHashSet<CombinationIndex>,
    incompatible: FxHashSet<IncompatiblePair>,
    allow_absent: bool,
    targets: TargetMode,
}

impl CombinerState {
    pub fn new(operands: Vec<Box<dyn MatchStream>>, settings: &CombinerSettings) -> Self {
        Self {
            ports: operands
                .into_iter()
                .map(|stream| PortState {
                    stream,
                    buf: Vec::new(),
                    exhausted: false,
                })
                .collect(),
            returned: FxHashSet::default(),
            incompatible: FxHashSet::default(),
            allow_absent: settings.allow_absent,
            targets: settings.targets,
        }
    }

    pub fn num_ports(&self) -> usize {
        self.ports.len()
    }

    /// Buffers matches from `port` until index `idx` is available or the
    /// underlying stream ends; returns whether the index is available.
    /// Already-buffered indices are served from the buffer and never
    /// re-pull the stream.
    pub fn available(&mut self, port: usize, idx: u32) -> Result<bool> {
        let idx = idx as usize;

        while !self.ports[port].exhausted && self.ports[port].buf.len() <= idx {
            match self.ports[port].stream.pull()? {
                Some(m) => {
                    self.check_contract(port, &m)?;
                    self.ports[port].buf.push(m);
                }
                None => self.ports[port].exhausted = true,
            }
        }

        Ok(idx < self.ports[port].buf.len())
    }

    fn check_contract(&self, port: usize, m: &OperandMatch) -> Result<()> {
        match m {
            Absent => {
                if !self.allow_absent {
                    return Err(Error::AbsentNotAllowed { port });
                }
            }
            Present(m) => {
                if let TargetMode::SingleTarget { bounds } = self.targets {
                    if m.ranges.len() != 1 {
                        return Err(Error::MultipleTargets {
                            port,
                            targets: m.ranges.len(),
                        });
                    }

                    let range = m.ranges[0].range;
                    if range.lower < bounds.lower || range.upper > bounds.upper {
                        return Err(Error::RangeOutOfBounds {
                            port,
                            range,
                            bounds,
                        });
                    }
                }
            }
        }

        Ok(())
    }

    /// Panics if the index was never buffered; traversals must check
    /// [`available`](Self::available) first.
    pub fn get(&self, port: usize, idx: u32) -> &OperandMatch {
        &self.ports[port].buf[idx as usize]
    }

    pub fn is_exhausted(&self, port: usize) -> bool {
        self.ports[port].exhausted
    }

    /// Final number of matches from `port`, known once the stream ends.
    pub fn cardinality(&self, port: usize) -> Option<usize> {
        self.ports[port].exhausted.then(|| self.ports[port].buf.len())
    }

    pub fn buffered(&self, port: usize) -> usize {
        self.ports[port].buf.len()
    }

    /// Product of all operand cardinalities, `None` until every stream has
    /// been exhausted. Serves as the termination test: the search is done
    /// once `returned_count` reaches this.
    pub fn total_combinations(&self) -> Option<u64> {
        self.ports
            .iter()
            .try_fold(1u64, |acc, p| p.exhausted.then(|| acc * p.buf.len() as u64))
    }

    pub fn is_returned(&self, idx: &[u32]) -> bool {
        self.returned.contains(idx)
    }

    /// Panics on an already-marked index: the traversal strategies must
    /// never revisit a combination with a fresh validation.
    pub fn mark_returned(&mut self, idx: CombinationIndex) {
        let fresh = self.returned.insert(idx);
        assert!(fresh, "Combination index marked as returned twice");
    }

    pub fn returned_count(&self) -> u64 {
        self.returned.len() as u64
    }

    pub fn record_incompatible(&mut self, pair: IncompatiblePair) {
        self.incompatible.insert(pair);
    }

    /// Checks the candidate against the incompatible-pair cache. A cache hit
    /// also marks the index as returned-but-invalid, so the same violation
    /// is not rediscovered through a different traversal path.
    pub fn check_compatible(&mut self, idx: &[u32]) -> bool {
        for a in 0..idx.len() {
            for b in a + 1..idx.len() {
                let pair = IncompatiblePair {
                    port_a: a,
                    index_a: idx[a],
                    port_b: b,
                    index_b: idx[b],
                };

                if self.incompatible.contains(&pair) {
                    if !self.is_returned(idx) {
                        self.mark_returned(idx.to_vec());
                    }
                    return false;
                }
            }
        }

        true
    }

    /// Whether every combination has been returned or rejected.
    pub fn done(&self) -> bool {
        self.total_combinations()
            .is_some_and(|total| self.returned_count() == total)
    }
}
