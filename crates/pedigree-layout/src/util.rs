use crate::Relation;
use std::collections::BTreeSet;

/// All proper ancestors of `person`
///
/// Walks both parent chains with an explicit worklist. The visited set keeps
/// the walk finite even if the parent graph has a cycle.
pub(crate) fn ancestors(
    person: usize,
    father: &[Option<usize>],
    mother: &[Option<usize>],
) -> BTreeSet<usize> {
    let mut found = BTreeSet::new();
    let mut pending = vec![person];

    while let Some(current) = pending.pop() {
        for parent in [father[current], mother[current]].into_iter().flatten() {
            if found.insert(parent) {
                pending.push(parent);
            }
        }
    }

    found.remove(&person);
    found
}

/// Default ordering ranks: the index of each individual, with twins sharing
/// the rank of the left twin so they sort next to each other
pub(crate) fn default_ranks(n: usize, relations: &[Relation]) -> Vec<usize> {
    let mut ranks: Vec<usize> = (0..n).collect();
    for relation in relations.iter().filter(|r| r.code.twin_kind().is_some()) {
        let shared = ranks[relation.left].min(ranks[relation.right]);
        ranks[relation.left] = shared;
        ranks[relation.right] = shared;
    }
    ranks
}

/// Sort individuals by rank, ties keep their current relative order
pub(crate) fn sort_by_rank(mut people: Vec<usize>, ranks: &[usize]) -> Vec<usize> {
    people.sort_by_key(|&p| ranks[p]);
    people
}

/// First `(row, column)` of a row-major grid matching the predicate
pub(crate) fn locate<T, F>(rows: &[Vec<T>], mut predicate: F) -> Option<(usize, usize)>
where
    F: FnMut(&T) -> bool,
{
    rows.iter().enumerate().find_map(|(row, cells)| {
        cells
            .iter()
            .position(&mut predicate)
            .map(|column| (row, column))
    })
}

/// Distinct family pointers of a row, in column order
pub(crate) fn distinct_families(fam: &[Option<usize>]) -> Vec<usize> {
    let mut found: Vec<usize> = Vec::new();
    for &f in fam.iter().flatten() {
        if !found.contains(&f) {
            found.push(f);
        }
    }
    found
}

pub(crate) fn mean(values: impl IntoIterator<Item = f32>) -> Option<f32> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f32)
}
