use super::ScalingParams;
use crate::{ArcPath, PedigreeLayout, Point};
use serde::{Deserialize, Serialize};

/// Points sampled along each hop of a duplicate arc
pub const ARC_POINTS: usize = 15;

/// Dashed path joining every occurrence of an individual drawn more than once
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateArc {
    pub person: usize,
    pub path: ArcPath,
}

/// One arc per duplicated individual, visiting its occurrences left to right
///
/// Consecutive hops share their joint, so a person drawn `k` times gets
/// `(k - 1) * (ARC_POINTS - 1) + 1` points.
pub(crate) fn duplicate_arcs(layout: &PedigreeLayout, params: &ScalingParams) -> Vec<DuplicateArc> {
    layout
        .duplicates()
        .into_iter()
        .map(|(person, places)| {
            let mut ends: Vec<Point> = places
                .iter()
                .map(|&(row, column)| {
                    Point::new(layout.pos[row][column], row as f32 + params.box_height / 2.0)
                })
                .collect();
            ends.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));

            let mut points = Vec::with_capacity(ends.len().saturating_sub(1) * (ARC_POINTS - 1) + 1);
            for (hop, pair) in ends.windows(2).enumerate() {
                points.extend(arc(pair[0], pair[1]).skip(usize::from(hop > 0)));
            }

            DuplicateArc {
                person,
                path: ArcPath {
                    points: points
                        .into_iter()
                        .map(|p| p.scale(params.h_scale, params.v_scale))
                        .collect(),
                    dashed: true,
                },
            }
        })
        .collect()
}

/// Straight line from `from` to `to` bowed upward by half a generation at its middle
fn arc(from: Point, to: Point) -> impl Iterator<Item = Point> {
    let last = (ARC_POINTS - 1) as f32;
    let middle = last / 2.0;

    (0..ARC_POINTS).map(move |k| {
        let t = k as f32 / last;
        let bow = (k as f32 - middle).powi(2) / (2.0 * middle * middle) - 0.5;
        Point::new(
            from.x + (to.x - from.x) * t,
            from.y + (to.y - from.y) * t + bow,
        )
    })
}
