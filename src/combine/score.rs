use crate::combine::coord::Odometer;
use crate::combine::*;
use crate::errors::*;
use crate::matches::*;

/// Traversal in approximately descending combined-score order, for operand
/// streams that are themselves only approximately score-sorted.
///
/// Enumeration runs as an explicit state machine:
/// * `Base`: the all-zeros combination (every operand's best match).
/// * `Probing`: for each port in turn, the combination with exactly that
///   port at index 1, sampling each operand's second-best option cheaply.
///   Ports whose first match is the absent placeholder are skipped.
/// * `Climbing`: greedily advance the single port whose next match costs
///   the least score (`Sum`) or the port currently holding the best score
///   (`Max`). The climb is a heuristic, so every candidate still passes
///   validation.
/// * `Sweeping`: once climbing finds nothing new, fall back to the
///   exhaustive mixed-radix sweep to guarantee totality.
///
/// Transitions are strictly forward; `Exhausted` is terminal. In fair mode
/// all stages run to completion up front and the valid combinations are
/// served from a score-sorted buffer (stable on discovery order for ties).
pub struct ScoreTraversal {
    state: CombinerState,
    settings: CombinerSettings,
    stage: Stage,
    cur: CombinationIndex,
    sorted: Option<std::vec::IntoIter<Match>>,
}

enum Stage {
    Base,
    Probing { port: usize },
    Climbing,
    Sweeping(Odometer),
    Exhausted,
}

impl ScoreTraversal {
    pub(crate) fn new(state: CombinerState, settings: CombinerSettings) -> Self {
        let ports = state.num_ports();
        Self {
            state,
            settings,
            stage: Stage::Base,
            cur: vec![0; ports],
            sorted: None,
        }
    }

    pub fn take(&mut self) -> Result<Option<Match>> {
        match self.settings.fairness {
            Unfair => self.advance(),
            Fair => {
                if self.sorted.is_none() {
                    let mut all = Vec::new();
                    while let Some(m) = self.advance()? {
                        all.push(m);
                    }

                    // stable sort keeps discovery order for equal scores
                    all.sort_by(|a, b| b.score.cmp(&a.score));
                    self.sorted = Some(all.into_iter());
                }

                Ok(self.sorted.as_mut().unwrap().next())
            }
        }
    }

    /// Next valid combination in stage order, regardless of fairness.
    fn advance(&mut self) -> Result<Option<Match>> {
        loop {
            if self.state.done() {
                self.stage = Stage::Exhausted;
            }

            match &mut self.stage {
                Stage::Base => {
                    let n = self.state.num_ports();
                    for port in 0..n {
                        if !self.state.available(port, 0)? {
                            self.stage = Stage::Exhausted;
                            return Ok(None);
                        }
                    }

                    let idx = vec![0u32; n];
                    self.stage = Stage::Probing { port: 0 };

                    if let Candidate::Accepted(m) =
                        try_candidate(&mut self.state, &self.settings, &idx)?
                    {
                        return Ok(Some(m));
                    }
                }
                Stage::Probing { port } => {
                    let mut port = *port;
                    let n = self.state.num_ports();
                    let mut found = None;

                    while port < n {
                        let probe = port;
                        port += 1;

                        // the second-best match of an absent operand is
                        // meaningless, record the skip and move on
                        if self.state.get(probe, 0).is_absent() {
                            continue;
                        }
                        if !self.state.available(probe, 1)? {
                            continue;
                        }

                        let mut idx = vec![0u32; n];
                        idx[probe] = 1;

                        if let Candidate::Accepted(m) =
                            try_candidate(&mut self.state, &self.settings, &idx)?
                        {
                            found = Some(m);
                            break;
                        }
                    }

                    self.stage = if port < n {
                        Stage::Probing { port }
                    } else {
                        Stage::Climbing
                    };

                    if let Some(m) = found {
                        return Ok(Some(m));
                    }
                }
                Stage::Climbing => {
                    let Some(port) = self.best_climb_port()? else {
                        self.stage = Stage::Sweeping(Odometer::new(self.state.num_ports()));
                        continue;
                    };

                    self.cur[port] += 1;
                    let idx = self.cur.clone();

                    if let Candidate::Accepted(m) =
                        try_candidate(&mut self.state, &self.settings, &idx)?
                    {
                        return Ok(Some(m));
                    }
                }
                Stage::Sweeping(odo) => {
                    let Some(idx) = odo.next(&mut self.state)? else {
                        self.stage = Stage::Exhausted;
                        return Ok(None);
                    };

                    if let Candidate::Accepted(m) =
                        try_candidate(&mut self.state, &self.settings, &idx)?
                    {
                        return Ok(Some(m));
                    }
                }
                Stage::Exhausted => return Ok(None),
            }
        }
    }

    /// The port whose index should advance next, or `None` if every port is
    /// exhausted at its current depth.
    fn best_climb_port(&mut self) -> Result<Option<usize>> {
        let mut best: Option<(usize, i64)> = None;

        for port in 0..self.state.num_ports() {
            let next = self.cur[port] + 1;
            if !self.state.available(port, next)? {
                continue;
            }

            let key = match self.settings.score {
                Sum => {
                    self.state.get(port, next).score()
                        - self.state.get(port, self.cur[port]).score()
                }
                Max => self.state.get(port, self.cur[port]).score(),
            };

            if best.map_or(true, |(_, k)| key > k) {
                best = Some((port, key));
            }
        }

        Ok(best.map(|(port, _)| port))
    }

    pub(crate) fn state(&self) -> &CombinerState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::*;

    fn score_stream(matches: Vec<(i64, usize, usize)>) -> Box<dyn MatchStream> {
        VecStream::from_matches(
            ByScore,
            matches
                .into_iter()
                .map(|(s, lo, hi)| Match::new(s, TargetId(0), Range::new(lo, hi)))
                .collect(),
        )
        .boxed()
    }

    fn traversal(bufs: Vec<Vec<(i64, usize, usize)>>, settings: CombinerSettings) -> ScoreTraversal {
        let operands: Vec<_> = bufs.into_iter().map(score_stream).collect();
        ScoreTraversal::new(CombinerState::new(operands, &settings), settings)
    }

    fn drain(t: &mut ScoreTraversal) -> Vec<i64> {
        let mut res = Vec::new();
        while let Some(m) = t.take().unwrap() {
            res.push(m.score);
        }
        res
    }

    fn always(fairness: Fairness) -> CombinerSettings {
        CombinerSettings {
            rule: Always,
            ..CombinerSettings::and(Range::new(0, 100), fairness)
        }
    }

    #[test]
    fn unfair_emits_in_stage_order() {
        // base 15, probe port 0 -> 8, probe port 1 -> 14, climb -> 7
        let mut t = traversal(
            vec![vec![(10, 0, 2), (3, 4, 6)], vec![(5, 10, 12), (4, 13, 15)]],
            always(Unfair),
        );

        assert_eq!(drain(&mut t), vec![15, 8, 14, 7]);
        assert_eq!(t.state().returned_count(), 4);
    }

    #[test]
    fn fair_sorts_by_descending_score() {
        let mut t = traversal(
            vec![vec![(10, 0, 2), (3, 4, 6)], vec![(5, 10, 12), (4, 13, 15)]],
            always(Fair),
        );

        assert_eq!(drain(&mut t), vec![15, 14, 8, 7]);
    }

    #[test]
    fn fair_spec_scenario() {
        let mut t = traversal(
            vec![vec![(10, 0, 3), (7, 1, 4)], vec![(5, 5, 8), (2, 6, 9)]],
            always(Fair),
        );

        assert_eq!(drain(&mut t), vec![15, 12, 12, 9]);
        assert_eq!(t.state().total_combinations(), Some(4));
    }

    #[test]
    fn max_policy_climbs_the_best_port() {
        let mut t = traversal(
            vec![vec![(10, 0, 2), (3, 4, 6)], vec![(5, 10, 12), (4, 13, 15)]],
            CombinerSettings {
                rule: Always,
                score: Max,
                ..CombinerSettings::and(Range::new(0, 100), Fair)
            },
        );

        assert_eq!(drain(&mut t), vec![10, 10, 5, 4]);
    }

    #[test]
    fn single_overlapping_combination_rejects_immediately() {
        let mut t = traversal(
            vec![vec![(10, 0, 5)], vec![(5, 3, 8)]],
            CombinerSettings::and(Range::new(0, 100), Fair),
        );

        assert_eq!(t.take().unwrap(), None);
        assert_eq!(t.state().returned_count(), 1);
        assert_eq!(t.state().total_combinations(), Some(1));
    }

    #[test]
    fn order_rule_accepts_touching_ranges() {
        let reject = traversal(
            vec![vec![(10, 0, 3)], vec![(5, 1, 4)]],
            CombinerSettings::plus(Range::new(0, 100), Fair),
        )
        .take()
        .unwrap();
        assert_eq!(reject, None);

        let accept = traversal(
            vec![vec![(10, 0, 3)], vec![(5, 3, 6)]],
            CombinerSettings::plus(Range::new(0, 100), Fair),
        )
        .take()
        .unwrap();
        assert_eq!(accept.unwrap().score, 15);
    }

    #[test]
    fn sweep_recovers_combinations_the_climb_misses() {
        // three ports force the sweep to cover off-diagonal indices
        let mut t = traversal(
            vec![
                vec![(9, 0, 1), (8, 2, 3)],
                vec![(7, 10, 11), (2, 12, 13)],
                vec![(6, 20, 21), (5, 22, 23), (1, 24, 25)],
            ],
            always(Fair),
        );

        let scores = drain(&mut t);
        assert_eq!(scores.len(), 12);
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(t.state().returned_count(), 12);
    }

    #[test]
    fn absent_first_match_skips_the_probe() {
        let operands = vec![score_stream(vec![(8, 0, 3)]), VecStream::absent(ByScore).boxed()];
        let settings = CombinerSettings::or(Range::new(0, 100), Unfair);
        let mut t = ScoreTraversal::new(CombinerState::new(operands, &settings), settings);

        assert_eq!(drain(&mut t), vec![8]);
    }
}
