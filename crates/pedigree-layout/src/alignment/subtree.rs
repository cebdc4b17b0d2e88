use super::spouses::{Partner, Side};
use super::{merge, Alignment, Column, Slot, SpouseList};
use crate::util::{mean, sort_by_rank};
use crate::PedigreeInput;
use std::collections::BTreeMap;
use tracing::trace;

/// Builds subtree alignments for one pedigree
pub(crate) struct Builder<'a> {
    level: &'a [usize],
    ranks: &'a [usize],
    packed: bool,
    levels: usize,
    /// Children of each (father, mother) pair, in index order
    children: BTreeMap<(usize, usize), Vec<usize>>,
}

impl<'a> Builder<'a> {
    pub(crate) fn new(
        input: &PedigreeInput,
        level: &'a [usize],
        ranks: &'a [usize],
        packed: bool,
    ) -> Self {
        let mut children: BTreeMap<_, Vec<_>> = BTreeMap::new();
        for child in 0..input.len() {
            if let Some(parents) = input.parents(child) {
                children.entry(parents).or_default().push(child);
            }
        }

        Self {
            level,
            ranks,
            packed,
            levels: level.iter().max().map_or(0, |&max| max + 1),
            children,
        }
    }

    pub(crate) fn levels(&self) -> usize {
        self.levels
    }

    pub(crate) fn level(&self, person: usize) -> usize {
        self.level[person]
    }

    pub(crate) fn merge(&self, left: &Alignment, right: &Alignment) -> Alignment {
        merge(left, right, self.packed)
    }

    fn children_of(&self, a: usize, b: usize) -> Vec<usize> {
        let mut children: Vec<usize> = [(a, b), (b, a)]
            .iter()
            .filter_map(|pair| self.children.get(pair))
            .flatten()
            .copied()
            .collect();
        children.sort_unstable();
        children
    }

    /// Alignment of `person`, their partners and everything below them
    ///
    /// Every couple sits in two neighbouring columns of the person's row, see
    /// [`couple_row`]. The children of every partnership are folded together
    /// left to right and point back at the couple's left column.
    pub(crate) fn subtree(&self, person: usize, spouses: SpouseList) -> (Alignment, SpouseList) {
        let lev = self.level[person];
        let (partners, as_wife, mut spouses) = spouses.claim(person, |p| self.level[p] <= lev);
        if partners.is_empty() {
            return (Alignment::leaf(person, lev, self.levels), spouses);
        }

        let (left, right) = arrange(partners, as_wife);
        trace!("Subtree of {person}: partners {left:?} on the left, {right:?} on the right");

        let (slots, couples) = couple_row(person, &left, &right);
        let mut row: Vec<Column> = slots
            .into_iter()
            .enumerate()
            .map(|(column, slot)| Column {
                slot,
                pos: column as f32,
                fam: None,
            })
            .collect();

        let mut below: Option<Alignment> = None;
        for (partner, i) in couples {
            let children = self.children_of(person, partner);
            if children.is_empty() {
                continue;
            }

            let (mut family, rest) = self.siblings(children.clone(), spouses);
            spouses = rest;

            for column in family.rows[lev + 1]
                .iter_mut()
                .filter(|c| !c.slot.repeat && children.contains(&c.person()))
            {
                column.fam = Some(i);
            }

            if !self.packed {
                // Line the children up under their parents
                let kids = mean(
                    family.rows[lev + 1]
                        .iter()
                        .filter(|c| c.fam == Some(i))
                        .map(|c| c.pos),
                );
                let parents = (row[i].pos + row[i + 1].pos) / 2.0;
                if let Some(kids) = kids {
                    if kids > parents {
                        for column in &mut row[i..] {
                            column.pos += kids - parents;
                        }
                    } else {
                        family.shift_from(lev + 1, parents - kids);
                    }
                }
            }

            below = Some(match below {
                Some(acc) => self.merge(&acc, &family),
                None => family,
            });
        }

        let mut alignment = below.unwrap_or_else(|| Alignment::empty(self.levels));
        debug_assert!(alignment.rows[lev].is_empty());
        alignment.rows[lev] = row;
        (alignment, spouses)
    }

    /// Fold the subtrees of a set of siblings, ordered by rank
    pub(crate) fn siblings(&self, siblings: Vec<usize>, spouses: SpouseList) -> (Alignment, SpouseList) {
        let siblings = sort_by_rank(siblings, self.ranks);
        let Some((&first, rest)) = siblings.split_first() else {
            return (Alignment::empty(self.levels), spouses);
        };

        let row = self.level[first];
        let (mut alignment, mut spouses) = self.subtree(first, spouses);
        for &sibling in rest {
            let (next, remaining) = self.subtree(sibling, spouses);
            spouses = remaining;

            // A sibling already drawn as the partner of an earlier sibling
            // only needs adding again if it brought partners of its own
            if next.rows[row].len() > 1 || !alignment.row_contains(row, sibling) {
                alignment = self.merge(&alignment, &next);
            }
        }

        (alignment, spouses)
    }
}

/// Columns of a person's row and the left column of each couple, in
/// partner order
///
/// Left partners each sit just left of a column of `person`, right partners
/// just right of one. `person` is repeated whenever a side holds more than
/// one partner, so the row for partners `[a, b]` on the left and `[c, d]` on
/// the right is `[a, p', b, p, c, p', d]`. Only the column between the two
/// sides is the person's own entry.
fn couple_row(person: usize, left: &[usize], right: &[usize]) -> (Vec<Slot>, Vec<(usize, usize)>) {
    let slot = |person, spouse_right, repeat| Slot {
        person,
        spouse_right,
        repeat,
    };
    let mut row = Vec::with_capacity(2 * (left.len() + right.len()));
    let mut couples = Vec::with_capacity(left.len() + right.len());

    for (k, &partner) in left.iter().enumerate() {
        couples.push((partner, row.len()));
        row.push(slot(partner, true, false));
        row.push(slot(person, false, k + 1 < left.len()));
    }
    if left.is_empty() {
        row.push(slot(person, false, false));
    }

    for (k, &partner) in right.iter().enumerate() {
        if k > 0 {
            row.push(slot(person, false, true));
        }
        let column = row.len() - 1;
        row[column].spouse_right = true;
        couples.push((partner, column));
        row.push(slot(partner, false, false));
    }

    (row, couples)
}

/// Split partners to the left and right of the subject
///
/// Hinted sides are kept. Undecided partners fill the left until about half
/// of them are there, a wife gets the odd one on her left.
fn arrange(partners: Vec<Partner>, as_wife: bool) -> (Vec<usize>, Vec<usize>) {
    let on = |side: Option<Side>| -> Vec<usize> {
        partners
            .iter()
            .filter(|p| p.side == side)
            .map(|p| p.person)
            .collect()
    };
    let mut left = on(Some(Side::Left));
    let mut right = on(Some(Side::Right));
    let undecided = on(None);

    if !undecided.is_empty() {
        let wanted = (undecided.len() + usize::from(as_wife)) / 2;
        let split = wanted.saturating_sub(left.len()).min(undecided.len());
        left.extend_from_slice(&undecided[..split]);
        right = undecided[split..].iter().chain(right.iter()).copied().collect();
    }

    (left, right)
}
