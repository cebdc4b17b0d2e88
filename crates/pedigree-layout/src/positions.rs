use crate::alignment::SPACE;
use crate::util::{distinct_families, mean};
use crate::{PedigreeLayout, SpouseLink};
use tracing::trace;

/// Refine the horizontal positions of a finished grid
///
/// Each iteration pulls every family's children and parents toward each
/// other, pulls partners back together, then sweeps every row left to right
/// to restore the minimum spacing. The order of columns never changes.
pub(crate) fn refine_positions(
    layout: &PedigreeLayout,
    max_iterations: usize,
    tolerance: f32,
) -> Vec<Vec<f32>> {
    let mut pos = layout.pos.clone();

    for iteration in 0..max_iterations {
        let mut changed = false;

        for row in 1..pos.len() {
            for family in distinct_families(&layout.fam[row]) {
                let (above, rest) = pos.split_at_mut(row);
                let parents = &mut above[row - 1];
                if family + 1 >= parents.len() {
                    continue;
                }

                let kids: Vec<usize> = (0..rest[0].len())
                    .filter(|&c| layout.fam[row][c] == Some(family))
                    .collect();
                let Some(kid_mean) = mean(kids.iter().map(|&c| rest[0][c])) else {
                    continue;
                };
                let parent_mean = (parents[family] + parents[family + 1]) / 2.0;

                let delta = (parent_mean - kid_mean) / 2.0;
                if delta.abs() > tolerance {
                    for &c in &kids {
                        rest[0][c] += delta;
                    }
                    parents[family] -= delta;
                    parents[family + 1] -= delta;
                    changed = true;
                }
            }
        }

        // Keep partners next to each other
        for (row, links) in layout.spouse.iter().enumerate() {
            for (c, link) in links.iter().enumerate() {
                if *link == SpouseLink::Unlinked || c + 1 >= pos[row].len() {
                    continue;
                }
                let gap = pos[row][c + 1] - pos[row][c];
                if gap - SPACE > tolerance {
                    let middle = (pos[row][c] + pos[row][c + 1]) / 2.0;
                    pos[row][c] = middle - SPACE / 2.0;
                    pos[row][c + 1] = middle + SPACE / 2.0;
                    changed = true;
                }
            }
        }

        // Enforce minimum horizontal distance between columns
        for row in pos.iter_mut() {
            for c in 1..row.len() {
                if row[c] < row[c - 1] + SPACE {
                    row[c] = row[c - 1] + SPACE;
                }
            }
        }

        if !changed {
            trace!("Positions settled after {iteration} iterations");
            break;
        }
    }

    normalize(&mut pos);
    pos
}

/// Translate positions so the leftmost column sits at 0
fn normalize(pos: &mut [Vec<f32>]) {
    let min = pos.iter().flatten().copied().fold(f32::INFINITY, f32::min);
    if min.is_finite() {
        for p in pos.iter_mut().flatten() {
            *p -= min;
        }
    }
}
