//! Drawable geometry for a finished [`PedigreeLayout`]
//!
//! Coordinates are computed in layout units, where generation `g` occupies
//! the band from `y = g` to `y = g + box_height` and columns sit at their
//! `pos`, then multiplied by the horizontal and vertical scale factors.
//! Nothing here depends on a rendering backend.

mod arcs;

pub use arcs::{DuplicateArc, ARC_POINTS};

use crate::util::{distinct_families, mean};
use crate::{PedigreeError, PedigreeLayout, Point, Segment, SpouseLink, TwinKind};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Box and line dimensions used to turn a layout into geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalingParams {
    /// Width of an individual's box, in columns
    pub box_width: f32,

    /// Height of an individual's box, in generations
    pub box_height: f32,

    /// Height of the uplines between a child and the sibling bar
    pub leg_height: f32,

    /// Multiplier applied to every x coordinate
    pub h_scale: f32,

    /// Multiplier applied to every y coordinate
    pub v_scale: f32,

    /// How far along the way from the sibling bar attachment to the parents'
    /// midpoint the parent link drops. 0 draws a single vertical link from
    /// the parents, anything above draws a horizontal, vertical, horizontal
    /// elbow
    pub branch: f32,

    /// Minimum distance between the parent link and either end of the sibling bar
    pub parent_connect: f32,
}

impl Default for ScalingParams {
    fn default() -> Self {
        Self {
            box_width: 0.6,
            box_height: 0.5,
            leg_height: 0.25,
            h_scale: 1.0,
            v_scale: 1.0,
            branch: 0.6,
            parent_connect: 0.5,
        }
    }
}

impl ScalingParams {
    /// # Errors
    /// Returns an error if a dimension or scale is not a positive finite
    /// number, if `branch` is outside `[0, 1]` or `parent_connect` is negative
    pub fn validate(&self) -> Result<(), PedigreeError> {
        for (name, value) in [
            ("box_width", self.box_width),
            ("box_height", self.box_height),
            ("leg_height", self.leg_height),
            ("h_scale", self.h_scale),
            ("v_scale", self.v_scale),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(PedigreeError::InvalidScaling(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }

        if !(0.0..=1.0).contains(&self.branch) {
            return Err(PedigreeError::InvalidScaling(format!(
                "branch must be between 0 and 1, got {}",
                self.branch
            )));
        }

        if !(self.parent_connect.is_finite() && self.parent_connect >= 0.0) {
            return Err(PedigreeError::InvalidScaling(format!(
                "parent_connect must not be negative, got {}",
                self.parent_connect
            )));
        }

        Ok(())
    }
}

/// Line between two partners, doubled for consanguineous pairs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpouseConnector {
    pub generation: usize,
    /// Column of the left partner
    pub column: usize,
    pub link: SpouseLink,
    pub lines: Vec<Segment>,
}

/// Lines joining the children of one family to their parents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentChildConnector {
    /// Generation of the children
    pub generation: usize,
    /// Column of the left parent in the generation above
    pub family: usize,
    /// Columns of the children
    pub children: Vec<usize>,
    /// One line per child, from the top of its box to the sibling bar
    pub uplines: Vec<Segment>,
    pub sibling_bar: Segment,
    /// One vertical segment when drawn straight, three when branched
    pub parent_link: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TwinIndicator {
    /// Bar between the uplines of a monozygotic or dizygotic pair
    Bar {
        generation: usize,
        column: usize,
        kind: TwinKind,
        segment: Segment,
    },
    /// Anchor for a "?" between the uplines of a pair of unknown zygosity
    Unknown {
        generation: usize,
        column: usize,
        label: Point,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PedigreeConnectors {
    pub spouses: Vec<SpouseConnector>,
    pub parent_child: Vec<ParentChildConnector>,
    pub twins: Vec<TwinIndicator>,
    pub duplicates: Vec<DuplicateArc>,
}

/// Compute every connector of a layout
///
/// # Errors
/// Returns an error if the scaling parameters are invalid
pub fn compute_connectors(
    layout: &PedigreeLayout,
    params: &ScalingParams,
) -> Result<PedigreeConnectors, PedigreeError> {
    params.validate()?;
    debug!(
        "Computing connectors for {} generations with branch {}",
        layout.generations(),
        params.branch
    );

    let spouses = spouse_connectors(layout, params);
    let (parent_child, twins) = family_connectors(layout, params);
    let duplicates = arcs::duplicate_arcs(layout, params);

    Ok(PedigreeConnectors {
        spouses,
        parent_child,
        twins,
        duplicates,
    })
}

fn spouse_connectors(layout: &PedigreeLayout, params: &ScalingParams) -> Vec<SpouseConnector> {
    let half_width = params.box_width / 2.0;
    let mut connectors = Vec::new();

    for (generation, links) in layout.spouse.iter().enumerate() {
        let pos = &layout.pos[generation];
        for (column, &link) in links.iter().enumerate() {
            if link == SpouseLink::Unlinked || column + 1 >= pos.len() {
                continue;
            }

            let line = |y: f32| {
                Segment::new(
                    Point::new(pos[column] + half_width, y),
                    Point::new(pos[column + 1] - half_width, y),
                )
                .scale(params.h_scale, params.v_scale)
            };

            let y = generation as f32 + params.box_height / 2.0;
            let mut lines = vec![line(y)];
            if link == SpouseLink::Consanguineous {
                lines.push(line(y + params.box_height / 10.0));
            }

            connectors.push(SpouseConnector {
                generation,
                column,
                link,
                lines,
            });
        }
    }

    connectors
}

fn family_connectors(
    layout: &PedigreeLayout,
    params: &ScalingParams,
) -> (Vec<ParentChildConnector>, Vec<TwinIndicator>) {
    let (h, v) = (params.h_scale, params.v_scale);
    let mut connectors = Vec::new();
    let mut indicators = Vec::new();

    for generation in 1..layout.generations() {
        let pos = &layout.pos[generation];
        let parents = &layout.pos[generation - 1];
        let twins = layout.twins.as_ref().map(|t| &t[generation]);
        let twin_right = |column: usize| twins.and_then(|t| t[column]);

        for family in distinct_families(&layout.fam[generation]) {
            if family + 1 >= parents.len() {
                continue;
            }

            let children: Vec<usize> = (0..pos.len())
                .filter(|&c| layout.fam[generation][c] == Some(family))
                .collect();

            // Members of a twin set share one target on the sibling bar
            let mut groups: Vec<usize> = Vec::with_capacity(children.len());
            for (k, &c) in children.iter().enumerate() {
                let joined = k > 0 && children[k - 1] + 1 == c && twin_right(children[k - 1]).is_some();
                let group = match groups.last() {
                    Some(&last) if joined => last,
                    Some(&last) => last + 1,
                    None => 0,
                };
                groups.push(group);
            }
            let target: Vec<f32> = groups
                .iter()
                .map(|&group| {
                    mean(
                        children
                            .iter()
                            .zip(&groups)
                            .filter(|&(_, &g)| g == group)
                            .map(|(&c, _)| pos[c]),
                    )
                    .unwrap_or_default()
                })
                .collect();

            let y = generation as f32;
            let bar_y = y - params.leg_height;

            let uplines = children
                .iter()
                .zip(&target)
                .map(|(&c, &t)| Segment::new(Point::new(pos[c], y), Point::new(t, bar_y)).scale(h, v))
                .collect();

            for k in 0..children.len().saturating_sub(1) {
                let (left, right) = (children[k], children[k + 1]);
                let Some(kind) = twin_right(left) else {
                    continue;
                };
                if right != left + 1 {
                    continue;
                }
                let twin_y = y - params.leg_height / 2.0;
                let from = Point::new((pos[left] + target[k]) / 2.0, twin_y);
                let to = Point::new((pos[right] + target[k]) / 2.0, twin_y);
                indicators.push(match kind {
                    TwinKind::Monozygotic | TwinKind::Dizygotic => TwinIndicator::Bar {
                        generation,
                        column: left,
                        kind,
                        segment: Segment::new(from, to).scale(h, v),
                    },
                    TwinKind::Unknown => TwinIndicator::Unknown {
                        generation,
                        column: left,
                        label: Point::new((from.x + to.x) / 2.0, twin_y).scale(h, v),
                    },
                });
            }

            let parent_x = (parents[family] + parents[family + 1]) / 2.0;
            let parent_y = (generation - 1) as f32 + params.box_height / 2.0;

            let mut min = target.iter().copied().fold(f32::INFINITY, f32::min);
            let mut max = target.iter().copied().fold(f32::NEG_INFINITY, f32::max);

            let parent_link = if params.branch == 0.0 {
                // Straight drop from the parents, the bar reaches under it
                min = min.min(parent_x);
                max = max.max(parent_x);
                vec![Segment::new(
                    Point::new(parent_x, bar_y),
                    Point::new(parent_x, parent_y),
                )]
            } else {
                let attach_x = if max - min < 2.0 * params.parent_connect {
                    (min + max) / 2.0
                } else {
                    parent_x.clamp(min + params.parent_connect, max - params.parent_connect)
                };
                let drop_x = attach_x + (parent_x - attach_x) * params.branch;
                vec![
                    Segment::new(Point::new(attach_x, bar_y), Point::new(drop_x, bar_y)),
                    Segment::new(Point::new(drop_x, bar_y), Point::new(drop_x, parent_y)),
                    Segment::new(Point::new(drop_x, parent_y), Point::new(parent_x, parent_y)),
                ]
            };
            let sibling_bar = Segment::new(Point::new(min, bar_y), Point::new(max, bar_y)).scale(h, v);

            connectors.push(ParentChildConnector {
                generation,
                family,
                children,
                uplines,
                sibling_bar,
                parent_link: parent_link.into_iter().map(|s| s.scale(h, v)).collect(),
            });
        }
    }

    (connectors, indicators)
}
