use super::{Alignment, Column, SPACE};
use tracing::trace;

/// Place `right` to the right of `left`, row by row
///
/// When the last column of a `left` row and the first column of the same
/// `right` row hold the same person, the two columns are shared instead of
/// duplicated. Family pointers of `right` are renumbered to follow the
/// columns they point at.
///
/// In packed mode each row of `right` starts one unit after the end of the
/// matching `left` row. Otherwise a single slide, the smallest one that keeps
/// every row apart, is applied to the whole of `right`.
pub(crate) fn merge(left: &Alignment, right: &Alignment, packed: bool) -> Alignment {
    let levels = left.rows.len();
    debug_assert_eq!(levels, right.rows.len());

    let global_slide = if packed { 0.0 } else { slide(left, right) };

    let mut right_fam: Vec<Vec<Option<usize>>> = right
        .rows
        .iter()
        .map(|row| row.iter().map(|c| c.fam).collect())
        .collect();

    let mut rows = Vec::with_capacity(levels);
    for i in 0..levels {
        let mut row = left.rows[i].clone();
        let other = &right.rows[i];
        if other.is_empty() {
            rows.push(row);
            continue;
        }

        let n1 = row.len();
        let mut overlap = 0;
        if let Some(last) = row.last_mut() {
            let first = &other[0];
            if last.person() == first.person() {
                let first_fam = right_fam[i][0];
                if !packed && first_fam.is_some() {
                    last.pos = if last.fam.is_some() {
                        (first.pos + last.pos + global_slide) / 2.0
                    } else {
                        first.pos + global_slide
                    };
                }
                last.fam = last.fam.max(first_fam);
                last.slot.spouse_right |= first.slot.spouse_right;
                last.slot.repeat &= first.slot.repeat;
                overlap = 1;
            }
        }

        let slide = match (packed, row.last()) {
            (false, _) => global_slide,
            (true, None) => 0.0,
            (true, Some(last)) => last.pos + SPACE - overlap as f32,
        };

        row.extend(
            other
                .iter()
                .zip(&right_fam[i])
                .skip(overlap)
                .map(|(column, &fam)| Column {
                    slot: column.slot,
                    pos: column.pos + slide,
                    fam,
                }),
        );

        // Children in the next row follow their parents' new columns
        if let Some(next) = right_fam.get_mut(i + 1) {
            for fam in next.iter_mut().flatten() {
                *fam = *fam + n1 - overlap;
            }
        }

        rows.push(row);
    }

    trace!(
        "Merged widths {:?} and {:?} into {:?}",
        left.widths(),
        right.widths(),
        rows.iter().map(Vec::len).collect::<Vec<_>>()
    );

    Alignment { rows }
}

/// Smallest shift of `right` that keeps it clear of `left` in every row
fn slide(left: &Alignment, right: &Alignment) -> f32 {
    left.rows
        .iter()
        .zip(&right.rows)
        .filter_map(|(l, r)| Some((l.last()?, r.first()?)))
        .map(|(last, first)| {
            if last.person() == first.person() {
                last.pos - first.pos
            } else {
                SPACE + last.pos - first.pos
            }
        })
        .fold(0.0, f32::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::Slot;
    use test_log::test;

    fn column(person: usize, pos: f32, fam: Option<usize>) -> Column {
        Column {
            slot: Slot {
                person,
                spouse_right: false,
                repeat: false,
            },
            pos,
            fam,
        }
    }

    fn persons(alignment: &Alignment, row: usize) -> Vec<usize> {
        alignment.rows[row].iter().map(Column::person).collect()
    }

    fn positions(alignment: &Alignment, row: usize) -> Vec<f32> {
        alignment.rows[row].iter().map(|c| c.pos).collect()
    }

    /// Couple (a, b) with children `kids`
    fn family(a: usize, b: usize, kids: &[usize]) -> Alignment {
        let mut parents = vec![column(a, 0.0, None), column(b, 1.0, None)];
        parents[0].slot.spouse_right = true;
        let children = kids
            .iter()
            .enumerate()
            .map(|(k, &kid)| column(kid, k as f32, Some(0)))
            .collect();
        Alignment {
            rows: vec![parents, children],
        }
    }

    #[test]
    fn disjoint_packed_merge_appends() {
        let merged = merge(&family(0, 1, &[4, 5]), &family(2, 3, &[6]), true);
        assert_eq!(persons(&merged, 0), vec![0, 1, 2, 3]);
        assert_eq!(positions(&merged, 0), vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(persons(&merged, 1), vec![4, 5, 6]);
        assert_eq!(positions(&merged, 1), vec![0.0, 1.0, 2.0]);
        // 6 now points at the pair in columns 2 and 3
        assert_eq!(merged.rows[1][2].fam, Some(2));
        assert_eq!(merged.rows[1][0].fam, Some(0));
    }

    #[test]
    fn shared_person_is_not_duplicated() {
        // 1 is the right partner in one family and the left one in the other
        let merged = merge(&family(0, 1, &[4]), &family(1, 2, &[5]), true);
        assert_eq!(persons(&merged, 0), vec![0, 1, 2]);
        assert_eq!(positions(&merged, 0), vec![0.0, 1.0, 2.0]);
        assert!(merged.rows[0][1].slot.spouse_right);
        assert_eq!(merged.widths(), vec![3, 2]);
        assert_eq!(merged.rows[1][1].fam, Some(1));
    }

    #[test]
    fn unpacked_merge_uses_one_slide() {
        let left = Alignment {
            rows: vec![vec![column(0, 0.0, None)], vec![column(1, 3.0, None)]],
        };
        let right = Alignment {
            rows: vec![vec![column(2, 0.0, None)], vec![column(3, 0.0, None)]],
        };
        let merged = merge(&left, &right, false);
        // Row 1 needs a slide of 4, so row 0 gets it too
        assert_eq!(positions(&merged, 0), vec![0.0, 4.0]);
        assert_eq!(positions(&merged, 1), vec![3.0, 4.0]);

        let packed = merge(&left, &right, true);
        assert_eq!(positions(&packed, 0), vec![0.0, 1.0]);
        assert_eq!(positions(&packed, 1), vec![3.0, 4.0]);
    }

    #[test]
    fn unpacked_shared_column_moves_to_the_middle() {
        let left = Alignment {
            rows: vec![vec![column(0, 0.0, None)], vec![column(1, 0.0, Some(0))]],
        };
        let right = Alignment {
            rows: vec![vec![column(0, 0.0, None)], vec![column(1, 2.0, Some(0)), column(2, 3.0, Some(0))]],
        };
        let merged = merge(&left, &right, false);
        assert_eq!(persons(&merged, 1), vec![1, 2]);
        // slide is 0, shared column lands between 0 and 2
        assert_eq!(positions(&merged, 1), vec![1.0, 3.0]);
    }

    #[test]
    fn merging_into_empty_keeps_positions() {
        let merged = merge(&Alignment::empty(2), &family(0, 1, &[2]), true);
        assert_eq!(merged, family(0, 1, &[2]));
    }
}
