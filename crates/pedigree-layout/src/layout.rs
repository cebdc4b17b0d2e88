use crate::alignment::{Alignment, Builder, SpouseList, SpouseRecord};
use crate::depth::Ancestry;
use crate::positions::refine_positions;
use crate::util::{ancestors, default_ranks, locate, sort_by_rank};
use crate::{PedigreeError, PedigreeInput, TwinKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// Marker for a column whose person is partnered with the next column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SpouseLink {
    #[default]
    Unlinked,
    Partner,
    /// The partners share an ancestor
    Consanguineous,
}

impl SpouseLink {
    /// Numeric code (0, 1 or 2)
    pub fn code(self) -> u8 {
        match self {
            SpouseLink::Unlinked => 0,
            SpouseLink::Partner => 1,
            SpouseLink::Consanguineous => 2,
        }
    }
}

/// The computed chart, one row per generation
///
/// All matrices are indexed `[generation][column]` and row `g` has `n[g]`
/// columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PedigreeLayout {
    /// Number of occupied columns per generation
    pub n: Vec<usize>,
    /// Index of the individual drawn in each column
    pub nid: Vec<Vec<usize>>,
    /// Horizontal position of each column, strictly increasing along a row
    pub pos: Vec<Vec<f32>>,
    /// Column of the left parent in the row above, for columns drawn under their parents
    pub fam: Vec<Vec<Option<usize>>>,
    /// Link between each column and the next one
    pub spouse: Vec<Vec<SpouseLink>>,
    /// Twin link between each column and the next one, `None` if the pedigree has no twins
    pub twins: Option<Vec<Vec<Option<TwinKind>>>>,
}

impl PedigreeLayout {
    pub fn generations(&self) -> usize {
        self.n.len()
    }

    /// Every `(generation, column)` where `person` is drawn
    pub fn occurrences(&self, person: usize) -> Vec<(usize, usize)> {
        self.nid
            .iter()
            .enumerate()
            .flat_map(|(row, ids)| {
                ids.iter()
                    .enumerate()
                    .filter(move |&(_, &id)| id == person)
                    .map(move |(column, _)| (row, column))
            })
            .collect()
    }

    pub fn contains(&self, person: usize) -> bool {
        self.nid.iter().any(|row| row.contains(&person))
    }

    /// Individuals drawn more than once, with all their occurrences
    pub fn duplicates(&self) -> BTreeMap<usize, Vec<(usize, usize)>> {
        let mut seen: BTreeMap<usize, Vec<(usize, usize)>> = BTreeMap::new();
        for (row, ids) in self.nid.iter().enumerate() {
            for (column, &id) in ids.iter().enumerate() {
                seen.entry(id).or_default().push((row, column));
            }
        }
        seen.retain(|_, places| places.len() > 1);
        seen
    }
}

/// Configuration for the pedigree layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PedigreeAligner {
    /// Place every merged subtree right next to its neighbour instead of
    /// sliding whole subtrees apart
    pub packed: bool,

    /// Refine positions after the grid is built
    pub align: bool,

    /// Maximum iterations for position refinement
    pub max_position_iterations: usize,

    /// Movement below which refinement stops
    pub tolerance: f32,
}

impl Default for PedigreeAligner {
    fn default() -> Self {
        Self {
            packed: true,
            align: true,
            max_position_iterations: 100,
            tolerance: 0.01,
        }
    }
}

impl PedigreeAligner {
    /// Create a new aligner with the given spacing mode
    pub fn new(packed: bool) -> Self {
        Self {
            packed,
            ..Default::default()
        }
    }

    /// Lay out a pedigree
    ///
    /// Identical input always gives an identical layout.
    ///
    /// # Errors
    /// Returns an error if the input is structurally invalid, see
    /// [`PedigreeInput::validate`], or if an individual is their own ancestor
    pub fn layout(&self, input: &PedigreeInput) -> Result<PedigreeLayout, PedigreeError> {
        let grid = self.compute_grid(input)?;
        if !self.align || grid.n.iter().all(|&n| n <= 1) {
            return Ok(grid);
        }

        Ok(PedigreeLayout {
            pos: self.compute_positions(&grid),
            ..grid
        })
    }

    /// Compute the grid with the positions produced by merging
    ///
    /// This phase decides who is drawn where. Its positions are only
    /// guaranteed to respect column order.
    ///
    /// # Errors
    /// Same as [`PedigreeAligner::layout`]
    pub fn compute_grid(&self, input: &PedigreeInput) -> Result<PedigreeLayout, PedigreeError> {
        input.validate()?;
        let ancestry = Ancestry::new(&input.father, &input.mother)?;

        let spouses = SpouseList::from_input(input);
        let level = ancestry.aligned_depths(&spouses.couples());
        let ranks = match &input.hints.order {
            Some(order) => order.clone(),
            None => default_ranks(input.len(), &input.relation),
        };

        let builder = Builder::new(input, &level, &ranks, self.packed);
        let founders = find_founders(spouses.records(), input, &ranks);
        debug!(
            "Laying out {} individuals over {} generations from founders {founders:?}",
            input.len(),
            builder.levels()
        );

        let mut alignment = Alignment::empty(builder.levels());
        let mut spouses = spouses;
        for founder in founders {
            let (subtree, rest) = builder.subtree(founder, spouses);
            spouses = rest;
            let row = builder.level(founder);
            if subtree.rows[row].len() == 1 && alignment.row_contains(row, founder) {
                continue;
            }
            alignment = builder.merge(&alignment, &subtree);
        }

        for person in sort_by_rank((0..input.len()).collect(), &ranks) {
            if alignment.contains(person) {
                continue;
            }
            debug!("Individual {person} is not reached from any founder couple");
            let (subtree, rest) = builder.subtree(person, spouses);
            spouses = rest;
            alignment = builder.merge(&alignment, &subtree);
        }

        Ok(finish(input, alignment))
    }

    /// Refine the positions of a grid from [`PedigreeAligner::compute_grid`]
    pub fn compute_positions(&self, grid: &PedigreeLayout) -> Vec<Vec<f32>> {
        refine_positions(grid, self.max_position_iterations, self.tolerance)
    }
}

/// Lay out a pedigree with the default configuration
///
/// # Errors
/// Same as [`PedigreeAligner::layout`]
pub fn align_pedigree(input: &PedigreeInput) -> Result<PedigreeLayout, PedigreeError> {
    PedigreeAligner::default().layout(input)
}

/// Individuals the top-level fold starts from
///
/// Founder couples are pairs where neither partner has parents. Founders
/// with several partners come first so that all their partnerships are
/// drawn together, then the remaining founder wives.
fn find_founders(records: &[SpouseRecord], input: &PedigreeInput, ranks: &[usize]) -> Vec<usize> {
    let founding: Vec<&SpouseRecord> = records
        .iter()
        .filter(|r| input.is_founder(r.husband) && input.is_founder(r.wife))
        .collect();

    let repeated_wives = repeated(&founding, |r| r.wife);
    let repeated_husbands = repeated(&founding, |r| r.husband);

    let wives = founding
        .iter()
        .filter(|r| !repeated_wives.contains(&r.husband) && !repeated_husbands.contains(&r.husband))
        .map(|r| r.wife);

    let mut seen = BTreeSet::new();
    let candidates = repeated_wives
        .iter()
        .chain(&repeated_husbands)
        .copied()
        .chain(wives)
        .filter(|&p| seen.insert(p))
        .collect();

    sort_by_rank(candidates, ranks)
}

/// Members that appear in more than one record, once per extra appearance
fn repeated<F>(records: &[&SpouseRecord], member: F) -> Vec<usize>
where
    F: Fn(&SpouseRecord) -> usize,
{
    let mut seen = BTreeSet::new();
    records
        .iter()
        .map(|r| member(r))
        .filter(|&p| !seen.insert(p))
        .collect()
}

/// Resolve slot markers into the public matrices
fn finish(input: &PedigreeInput, alignment: Alignment) -> PedigreeLayout {
    let Alignment { rows } = alignment;

    let nid: Vec<Vec<usize>> = rows
        .iter()
        .map(|row| row.iter().map(|c| c.person()).collect())
        .collect();

    let spouse = rows
        .iter()
        .enumerate()
        .map(|(g, row)| {
            row.iter()
                .enumerate()
                .map(|(c, column)| {
                    if !column.slot.spouse_right {
                        return SpouseLink::Unlinked;
                    }
                    let Some(next) = row.get(c + 1) else {
                        warn!("Partner marker of {} has no right neighbour in generation {g}", column.person());
                        return SpouseLink::Unlinked;
                    };
                    if consanguineous(input, column.person(), next.person()) {
                        SpouseLink::Consanguineous
                    } else {
                        SpouseLink::Partner
                    }
                })
                .collect()
        })
        .collect();

    let fam: Vec<Vec<Option<usize>>> = rows
        .iter()
        .map(|row| row.iter().map(|c| c.fam).collect())
        .collect();

    let twins = twins(input, &nid, &fam);

    PedigreeLayout {
        n: rows.iter().map(Vec::len).collect(),
        pos: rows
            .iter()
            .map(|row| row.iter().map(|c| c.pos).collect())
            .collect(),
        nid,
        fam,
        spouse,
        twins,
    }
}

/// Whether two partners share an ancestor, or one descends from the other
fn consanguineous(input: &PedigreeInput, a: usize, b: usize) -> bool {
    let of_a = ancestors(a, &input.father, &input.mother);
    let of_b = ancestors(b, &input.father, &input.mother);
    of_a.contains(&b) || of_b.contains(&a) || !of_a.is_disjoint(&of_b)
}

/// Mark twin pairs that ended up side by side under their parents
fn twins(
    input: &PedigreeInput,
    nid: &[Vec<usize>],
    fam: &[Vec<Option<usize>>],
) -> Option<Vec<Vec<Option<TwinKind>>>> {
    let pairs: Vec<(usize, usize, TwinKind)> = input
        .relation
        .iter()
        .filter_map(|r| Some((r.left, r.right, r.code.twin_kind()?)))
        .collect();
    if pairs.is_empty() {
        return None;
    }

    // Twins are looked up where they hang from their parents
    let connected: Vec<Vec<Option<usize>>> = nid
        .iter()
        .zip(fam)
        .map(|(ids, fams)| {
            ids.iter()
                .zip(fams)
                .map(|(&id, f)| f.map(|_| id))
                .collect()
        })
        .collect();

    let mut marks: Vec<Vec<Option<TwinKind>>> =
        nid.iter().map(|row| vec![None; row.len()]).collect();
    for (left, right, kind) in pairs {
        let found_left = locate(&connected, |&id| id == Some(left));
        let found_right = locate(&connected, |&id| id == Some(right));
        match (found_left, found_right) {
            (Some((gl, cl)), Some((gr, cr))) if gl == gr && cl.abs_diff(cr) == 1 => {
                marks[gl][cl.min(cr)] = Some(kind);
            }
            _ => warn!("Twins {left} and {right} are not side by side, leaving them unmarked"),
        }
    }

    Some(marks)
}
