//! Pedigree chart layout
//!
//! This crate arranges the individuals of a family tree into generation
//! rows so that partners sit next to each other and children sit under
//! their parents, then produces the line geometry needed to draw the chart.
//! It does not draw anything itself.
//!
//! # Phases
//!
//! - [`PedigreeAligner::compute_grid`]: generation depths, spouse pairing
//!   and recursive subtree merging into a grid of columns
//! - [`PedigreeAligner::compute_positions`]: iterative refinement of the
//!   horizontal positions
//! - [`compute_connectors`]: spouse lines, sibling bars, parent links, twin
//!   markers and duplicate arcs, scaled by [`ScalingParams`]
//!
//! # Example
//!
//! ```
//! use pedigree_layout::{align_pedigree, compute_connectors, PedigreeInput, ScalingParams, Sex};
//!
//! let mut pedigree = PedigreeInput::new();
//! let dad = pedigree.add_individual("dad", Sex::Male, None, None);
//! let mom = pedigree.add_individual("mom", Sex::Female, None, None);
//! pedigree.add_individual("kid", Sex::Female, Some(dad), Some(mom));
//!
//! // Single call with the default configuration
//! let layout = align_pedigree(&pedigree).unwrap();
//! assert_eq!(layout.n, vec![2, 1]);
//!
//! // Geometry for a renderer
//! let connectors = compute_connectors(&layout, &ScalingParams::default()).unwrap();
//! assert_eq!(connectors.spouses.len(), 1);
//! assert_eq!(connectors.parent_child.len(), 1);
//! ```

mod alignment;
mod connectors;
mod depth;
mod error;
mod geometry;
mod input;
mod layout;
mod positions;
mod util;

pub use connectors::{
    compute_connectors, DuplicateArc, ParentChildConnector, PedigreeConnectors, ScalingParams,
    SpouseConnector, TwinIndicator, ARC_POINTS,
};
pub use depth::generation_depths;
pub use error::PedigreeError;
pub use geometry::{ArcPath, Point, Segment};
pub use input::{Anchor, Hints, PedigreeInput, Relation, RelationCode, Sex, SpouseHint, TwinKind};
pub use layout::{align_pedigree, PedigreeAligner, PedigreeLayout, SpouseLink};
