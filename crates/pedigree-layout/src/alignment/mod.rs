//! Recursive subtree alignment
//!
//! An [`Alignment`] is a per-generation grid of columns. Subtrees are built
//! bottom-up from single individuals and folded together with [`merge`].
//! Every step returns a new alignment, nothing is resized in place.

mod merge;
mod spouses;
mod subtree;

pub(crate) use merge::merge;
pub(crate) use spouses::{SpouseList, SpouseRecord};
pub(crate) use subtree::Builder;

/// Horizontal distance between neighbouring columns
pub(crate) const SPACE: f32 = 1.0;

/// An occupied column of an alignment row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct Slot {
    pub person: usize,
    /// The person in this column is partnered with the one in the next column
    pub spouse_right: bool,
    /// Another column of the same row holds this person's own entry. Repeats
    /// only exist to sit next to one more partner and never hang from parents.
    pub repeat: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Column {
    pub slot: Slot,
    pub pos: f32,
    /// Column of the left parent in the row above
    pub fam: Option<usize>,
}

impl Column {
    pub(crate) fn person(&self) -> usize {
        self.slot.person
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct Alignment {
    pub rows: Vec<Vec<Column>>,
}

impl Alignment {
    pub(crate) fn empty(levels: usize) -> Self {
        Self {
            rows: vec![Vec::new(); levels],
        }
    }

    /// A single individual at position 0 of their row
    pub(crate) fn leaf(person: usize, level: usize, levels: usize) -> Self {
        let mut alignment = Self::empty(levels);
        alignment.rows[level].push(Column {
            slot: Slot {
                person,
                spouse_right: false,
                repeat: false,
            },
            pos: 0.0,
            fam: None,
        });
        alignment
    }

    pub(crate) fn widths(&self) -> Vec<usize> {
        self.rows.iter().map(Vec::len).collect()
    }

    pub(crate) fn row_contains(&self, row: usize, person: usize) -> bool {
        self.rows[row].iter().any(|c| c.person() == person)
    }

    pub(crate) fn contains(&self, person: usize) -> bool {
        (0..self.rows.len()).any(|row| self.row_contains(row, person))
    }

    /// Move every column of row `from` and all rows below it
    pub(crate) fn shift_from(&mut self, from: usize, by: f32) {
        for column in self.rows.iter_mut().skip(from).flatten() {
            column.pos += by;
        }
    }
}
