use crate::combine::*;
use crate::matches::*;

/// Checks the positional compatibility of one candidate combination.
///
/// Returns the first incompatible pair found, or `None` if the combination
/// is valid. `Intersection` scans all pairs; `Order` scans only adjacent
/// present operands in port order, accepting ranges that touch at a
/// boundary. Ranges on different targets are never compared. Each distinct
/// combination index is validated at most once; later visits hit the
/// incompatible-pair cache instead.
pub fn validate(
    rule: ValidationRule,
    idx: &[u32],
    selected: &[&OperandMatch],
) -> Option<IncompatiblePair> {
    match rule {
        Always => None,
        Intersection => {
            let present = present_ranges(idx, selected);

            for a in 0..present.len() {
                for b in a + 1..present.len() {
                    if present[a].target == present[b].target
                        && present[a].range.intersection_length(present[b].range) > 0
                    {
                        return Some(pair_of(&present[a], &present[b]));
                    }
                }
            }

            None
        }
        Order => {
            let present = present_ranges(idx, selected);

            for w in present.windows(2) {
                if w[0].target == w[1].target && w[0].range.upper > w[1].range.lower {
                    return Some(pair_of(&w[0], &w[1]));
                }
            }

            None
        }
    }
}

struct SelectedRange {
    port: usize,
    index: u32,
    target: TargetId,
    range: Range,
}

fn present_ranges(idx: &[u32], selected: &[&OperandMatch]) -> Vec<SelectedRange> {
    selected
        .iter()
        .zip(idx)
        .enumerate()
        .flat_map(|(port, (m, &index))| {
            m.as_match()
                .map(|m| m.ranges.as_slice())
                .unwrap_or(&[])
                .iter()
                .map(move |mr| SelectedRange {
                    port,
                    index,
                    target: mr.target,
                    range: mr.range,
                })
        })
        .collect()
}

fn pair_of(a: &SelectedRange, b: &SelectedRange) -> IncompatiblePair {
    IncompatiblePair {
        port_a: a.port,
        index_a: a.index,
        port_b: b.port,
        index_b: b.index,
    }
}
