use crate::mods::ModId;
use std::{
    cmp::Reverse,
    collections::{BinaryHeap, HashMap},
};

/// Stable topological sort: among mods without pending predecessors the one
/// earliest in `sequence` is emitted first. Conflicts naming ids outside
/// `sequence` are ignored. In a cycle the earliest remaining mod is emitted
/// regardless of its pending predecessors.
pub fn resolve_load_order<'a, F>(
    sequence: &[ModId],
    conflicts_of: F,
    trust_current_order: bool,
) -> Vec<ModId>
where
    F: Fn(ModId) -> &'a [ModId],
{
    if trust_current_order {
        return sequence.to_vec();
    }

    let position: HashMap<ModId, usize> = sequence
        .iter()
        .enumerate()
        .map(|(index, id)| (*id, index))
        .collect();

    let mut successors: Vec<Vec<usize>> = vec![Vec::new(); sequence.len()];
    let mut pending: Vec<usize> = vec![0; sequence.len()];
    for (index, id) in sequence.iter().enumerate() {
        for overrider in conflicts_of(*id) {
            let Some(&target) = position.get(overrider) else {
                continue;
            };
            if target == index || successors[index].contains(&target) {
                continue;
            }
            successors[index].push(target);
            pending[target] += 1;
        }
    }

    let mut emitted = vec![false; sequence.len()];
    let mut ready: BinaryHeap<Reverse<usize>> = pending
        .iter()
        .enumerate()
        .filter(|(_, count)| **count == 0)
        .map(|(index, _)| Reverse(index))
        .collect();
    let mut result = Vec::with_capacity(sequence.len());

    while result.len() < sequence.len() {
        let next = match ready.pop() {
            Some(Reverse(index)) if emitted[index] => continue,
            Some(Reverse(index)) => index,
            // Cycle: fall back to the earliest remaining original position.
            None => match emitted.iter().position(|done| !done) {
                Some(index) => index,
                None => break,
            },
        };
        emitted[next] = true;
        result.push(sequence[next]);
        for successor in &successors[next] {
            if emitted[*successor] {
                continue;
            }
            pending[*successor] = pending[*successor].saturating_sub(1);
            if pending[*successor] == 0 {
                ready.push(Reverse(*successor));
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn ids(raw: &[usize]) -> Vec<ModId> {
        raw.iter().map(|value| ModId(*value)).collect()
    }

    fn sort(sequence: &[usize], edges: &[(usize, usize)], trust: bool) -> Vec<usize> {
        let mut conflicts: HashMap<ModId, Vec<ModId>> = HashMap::new();
        for (from, to) in edges {
            conflicts.entry(ModId(*from)).or_default().push(ModId(*to));
        }
        resolve_load_order(
            &ids(sequence),
            |id| conflicts.get(&id).map(Vec::as_slice).unwrap_or(&[]),
            trust,
        )
        .into_iter()
        .map(|id| id.0)
        .collect()
    }

    #[test]
    fn trusted_order_is_identity() {
        assert_eq!(sort(&[2, 0, 1], &[(1, 2)], true), vec![2, 0, 1]);
    }

    #[test]
    fn overridden_mod_moves_before_overrider() {
        assert_eq!(sort(&[2, 0, 1], &[(1, 2)], false), vec![0, 1, 2]);
    }

    #[test]
    fn unrelated_mods_keep_relative_order() {
        assert_eq!(sort(&[5, 3, 9, 1], &[], false), vec![5, 3, 9, 1]);
    }

    #[test]
    fn sorting_is_idempotent() {
        let edges = [(4, 1), (3, 1), (2, 0)];
        let once = sort(&[0, 1, 2, 3, 4], &edges, false);
        let twice = sort(&once, &edges, false);
        assert_eq!(once, twice);
        assert_eq!(once, vec![2, 0, 3, 4, 1]);
    }

    #[test]
    fn dangling_conflicts_are_ignored() {
        assert_eq!(sort(&[0, 1], &[(0, 7), (1, 8)], false), vec![0, 1]);
    }

    #[test]
    fn cycles_fall_back_to_original_position() {
        // 2 is free and goes first, then the cycle breaks at its earliest member.
        assert_eq!(sort(&[0, 1, 2], &[(0, 1), (1, 0)], false), vec![2, 0, 1]);
        assert_eq!(sort(&[0, 1, 2], &[(1, 2), (2, 1), (0, 2)], false), vec![0, 1, 2]);
    }
}
