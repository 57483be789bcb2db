use crate::combine::*;
use crate::errors::*;
use crate::matches::*;

/// Mixed-radix enumeration over combination indices, least significant
/// last: the last port's index advances first, and a port that runs out
/// resets to zero and carries into the previous port.
///
/// The radices are discovered lazily: a port's cardinality is only known
/// once its stream is exhausted, so the odometer pulls matches on demand
/// through the combiner state.
pub struct Odometer {
    cur: CombinationIndex,
    started: bool,
    done: bool,
}

impl Odometer {
    pub fn new(ports: usize) -> Self {
        Self {
            cur: vec![0; ports],
            started: false,
            done: false,
        }
    }

    /// Next combination index, or `None` once the first port overflows.
    pub fn next(&mut self, state: &mut CombinerState) -> Result<Option<CombinationIndex>> {
        if self.done {
            return Ok(None);
        }

        if !self.started {
            self.started = true;

            for port in 0..self.cur.len() {
                if !state.available(port, 0)? {
                    // some operand has no matches at all
                    self.done = true;
                    return Ok(None);
                }
            }

            return Ok(Some(self.cur.clone()));
        }

        let mut port = self.cur.len() - 1;
        loop {
            self.cur[port] += 1;

            if state.available(port, self.cur[port])? {
                return Ok(Some(self.cur.clone()));
            }

            self.cur[port] = 0;
            if port == 0 {
                self.done = true;
                return Ok(None);
            }
            port -= 1;
        }
    }
}

/// Exhaustive traversal in coordinate order, used when downstream needs
/// composites ordered by starting position (sequence-in-order semantics).
///
/// The enumeration is lexicographic over operand indices: composites are
/// grouped by the first operand's match in coordinate order, and later
/// operands cycle in coordinate order within each group. Leftmost positions
/// are only non-decreasing within a group, since a later operand can start
/// before the first one. No probing or climbing phases are needed.
pub struct CoordTraversal {
    state: CombinerState,
    settings: CombinerSettings,
    odo: Odometer,
    done: bool,
}

impl CoordTraversal {
    pub(crate) fn new(state: CombinerState, settings: CombinerSettings) -> Self {
        let odo = Odometer::new(state.num_ports());
        Self {
            state,
            settings,
            odo,
            done: false,
        }
    }

    pub fn take(&mut self) -> Result<Option<Match>> {
        if self.done {
            return Ok(None);
        }

        loop {
            let Some(idx) = self.odo.next(&mut self.state)? else {
                self.done = true;
                return Ok(None);
            };

            match try_candidate(&mut self.state, &self.settings, &idx)? {
                Candidate::Accepted(m) => return Ok(Some(m)),
                Candidate::Rejected | Candidate::Seen => (),
            }
        }
    }

    pub(crate) fn state(&self) -> &CombinerState {
        &self.state
    }
}
