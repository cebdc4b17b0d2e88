use crate::PedigreeError;
use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use petgraph::Direction;
use tracing::{trace, warn};

/// Parent to child graph of a pedigree, with individuals in topological order
#[derive(Debug, Clone)]
pub(crate) struct Ancestry {
    graph: DiGraphMap<usize, ()>,
    order: Vec<usize>,
}

impl Ancestry {
    /// # Errors
    /// Returns an error if the parent arrays differ in length, a parent index
    /// is out of range or an individual is their own ancestor
    pub(crate) fn new(
        father: &[Option<usize>],
        mother: &[Option<usize>],
    ) -> Result<Self, PedigreeError> {
        let n = father.len();
        if mother.len() != n {
            return Err(PedigreeError::LengthMismatch {
                field: "mother",
                expected: n,
                found: mother.len(),
            });
        }

        let mut graph = DiGraphMap::new();
        for person in 0..n {
            graph.add_node(person);
        }
        for person in 0..n {
            for parent in [father[person], mother[person]].into_iter().flatten() {
                if parent >= n {
                    return Err(PedigreeError::ParentOutOfRange { person, parent });
                }
                graph.add_edge(parent, person, ());
            }
        }

        let order = toposort(&graph, None).map_err(|cycle| PedigreeError::CyclicAncestry {
            person: cycle.node_id(),
        })?;

        Ok(Self { graph, order })
    }

    /// Each individual one row below their deepest parent, founders keep `depth`
    fn derive(&self, depth: &mut [usize]) {
        for &person in &self.order {
            if let Some(d) = self
                .graph
                .neighbors_directed(person, Direction::Incoming)
                .map(|parent| depth[parent] + 1)
                .max()
            {
                depth[person] = d;
            }
        }
    }

    fn is_founder(&self, person: usize) -> bool {
        self.graph
            .neighbors_directed(person, Direction::Incoming)
            .next()
            .is_none()
    }

    pub(crate) fn depths(&self) -> Vec<usize> {
        let mut depth = vec![0; self.order.len()];
        self.derive(&mut depth);
        depth
    }

    /// Depths where partners share a row
    ///
    /// A founder partnered with someone deeper moves down to the partner's
    /// row and descendants are re-derived, until nothing moves. If that
    /// doesn't settle the plain depths are kept.
    pub(crate) fn aligned_depths(&self, couples: &[(usize, usize)]) -> Vec<usize> {
        let raw = self.depths();
        let mut depth = raw.clone();

        for round in 0..=depth.len() {
            let mut changed = false;
            for &(a, b) in couples {
                let (shallow, deep) = if depth[a] < depth[b] { (a, b) } else { (b, a) };
                if depth[shallow] < depth[deep] && self.is_founder(shallow) {
                    trace!("Moving founder {shallow} down to the row of partner {deep}");
                    depth[shallow] = depth[deep];
                    changed = true;
                }
            }

            if !changed {
                trace!("Couple depths settled after {round} rounds");
                return depth;
            }
            self.derive(&mut depth);
        }

        warn!("Couple depths did not settle, keeping generation depths");
        raw
    }
}

/// Generation level of every individual
///
/// Founders sit at level 0 and everyone else one level below the deeper of
/// their two parents.
///
/// # Errors
/// Returns an error if a parent index is out of range or if the parent graph
/// contains a cycle
pub fn generation_depths(
    father: &[Option<usize>],
    mother: &[Option<usize>],
) -> Result<Vec<usize>, PedigreeError> {
    Ok(Ancestry::new(father, mother)?.depths())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn three_generations() {
        // 0 + 1 -> 2, 3 + 4 -> 5, 2 + 5 -> 6
        let father = [None, None, Some(0), None, None, Some(3), Some(2)];
        let mother = [None, None, Some(1), None, None, Some(4), Some(5)];
        let depths = generation_depths(&father, &mother).unwrap();
        assert_eq!(depths, vec![0, 0, 1, 0, 0, 1, 2]);
    }

    #[test]
    fn depth_follows_the_deeper_parent() {
        // 0 + 1 -> 2, 2 + 3 -> 4 where 3 is a founder
        let father = [None, None, Some(0), None, Some(2)];
        let mother = [None, None, Some(1), None, Some(3)];
        let depths = generation_depths(&father, &mother).unwrap();
        assert_eq!(depths, vec![0, 0, 1, 0, 2]);
    }

    #[test]
    fn own_ancestor_is_rejected() {
        let father = [Some(1), None, Some(0)];
        let mother = [Some(2), None, Some(1)];
        let err = generation_depths(&father, &mother).unwrap_err();
        assert!(matches!(err, PedigreeError::CyclicAncestry { .. }));
    }

    #[test]
    fn own_parent_is_rejected() {
        let father = [Some(0), None];
        let mother = [Some(1), None];
        assert!(matches!(
            generation_depths(&father, &mother),
            Err(PedigreeError::CyclicAncestry { person: 0 })
        ));
    }

    #[test]
    fn marry_in_founder_moves_down() {
        // 0 + 1 -> 2, 2 + 3 -> 4 where 3 is a founder
        let father = [None, None, Some(0), None, Some(2)];
        let mother = [None, None, Some(1), None, Some(3)];
        let ancestry = Ancestry::new(&father, &mother).unwrap();
        let depths = ancestry.aligned_depths(&[(0, 1), (2, 3)]);
        assert_eq!(depths, vec![0, 0, 1, 1, 2]);
    }

    #[test]
    fn founder_married_into_own_line_keeps_plain_depths() {
        // 0 + 1 -> 2, and 0 is also partnered with their child 2
        let father = [None, None, Some(0)];
        let mother = [None, None, Some(1)];
        let ancestry = Ancestry::new(&father, &mother).unwrap();
        let depths = ancestry.aligned_depths(&[(0, 1), (2, 0)]);
        assert_eq!(depths, vec![0, 0, 1]);
    }
}
