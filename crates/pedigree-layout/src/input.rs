use crate::PedigreeError;
use serde::{Deserialize, Serialize};

/// Sex category of an individual
///
/// Only used to orient partner pairs, the geometry itself doesn't depend on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
    Unknown,
    Terminated,
}

/// Zygosity of a twin pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TwinKind {
    Monozygotic,
    Dizygotic,
    Unknown,
}

impl TwinKind {
    /// Numeric twin code (1, 2 or 3)
    pub fn code(self) -> u8 {
        match self {
            TwinKind::Monozygotic => 1,
            TwinKind::Dizygotic => 2,
            TwinKind::Unknown => 3,
        }
    }
}

/// Kind of a declared pairwise relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationCode {
    MonozygoticTwin,
    DizygoticTwin,
    UnknownTwin,
    Spouse,
}

impl RelationCode {
    /// Numeric relation code (1 to 4)
    pub fn code(self) -> u8 {
        match self {
            RelationCode::MonozygoticTwin => 1,
            RelationCode::DizygoticTwin => 2,
            RelationCode::UnknownTwin => 3,
            RelationCode::Spouse => 4,
        }
    }

    pub fn twin_kind(self) -> Option<TwinKind> {
        match self {
            RelationCode::MonozygoticTwin => Some(TwinKind::Monozygotic),
            RelationCode::DizygoticTwin => Some(TwinKind::Dizygotic),
            RelationCode::UnknownTwin => Some(TwinKind::Unknown),
            RelationCode::Spouse => None,
        }
    }
}

/// A relationship that can't be inferred from parentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    /// Index of the first individual
    pub left: usize,
    /// Index of the second individual
    pub right: usize,
    pub code: RelationCode,
}

/// Which member of a hinted partner pair the pair is drawn with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Anchor {
    /// Whichever member is reached first
    #[default]
    Either,
    /// The left member
    Left,
    /// The right member
    Right,
}

/// Forces the left/right orientation of a partner pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpouseHint {
    pub left: usize,
    pub right: usize,
    #[serde(default)]
    pub anchor: Anchor,
}

/// Optional ordering hints
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hints {
    /// One rank per individual, lower ranks are placed further left. Ties are allowed.
    #[serde(default)]
    pub order: Option<Vec<usize>>,

    #[serde(default)]
    pub spouse: Vec<SpouseHint>,
}

/// The pedigree to lay out
///
/// The position of an individual in `id` is its index everywhere else.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PedigreeInput {
    pub id: Vec<String>,
    pub father: Vec<Option<usize>>,
    pub mother: Vec<Option<usize>>,
    pub sex: Vec<Sex>,
    #[serde(default)]
    pub relation: Vec<Relation>,
    #[serde(default)]
    pub hints: Hints,
}

impl PedigreeInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an individual and return its index
    pub fn add_individual(
        &mut self,
        id: impl Into<String>,
        sex: Sex,
        father: Option<usize>,
        mother: Option<usize>,
    ) -> usize {
        self.id.push(id.into());
        self.sex.push(sex);
        self.father.push(father);
        self.mother.push(mother);
        self.id.len() - 1
    }

    pub fn add_relation(&mut self, left: usize, right: usize, code: RelationCode) {
        self.relation.push(Relation { left, right, code });
    }

    pub fn len(&self) -> usize {
        self.id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_empty()
    }

    /// Both parents of an individual, if recorded
    pub fn parents(&self, person: usize) -> Option<(usize, usize)> {
        match (self.father[person], self.mother[person]) {
            (Some(father), Some(mother)) => Some((father, mother)),
            _ => None,
        }
    }

    pub fn is_founder(&self, person: usize) -> bool {
        self.parents(person).is_none()
    }

    /// Check the structural invariants of the pedigree
    ///
    /// # Errors
    /// Returns the first violation found: mismatched array lengths, parent
    /// indices out of range, individuals with a single parent, malformed
    /// relations, then malformed hints.
    pub fn validate(&self) -> Result<(), PedigreeError> {
        let n = self.id.len();
        for (field, found) in [
            ("father", self.father.len()),
            ("mother", self.mother.len()),
            ("sex", self.sex.len()),
        ] {
            if found != n {
                return Err(PedigreeError::LengthMismatch {
                    field,
                    expected: n,
                    found,
                });
            }
        }

        for person in 0..n {
            for parent in [self.father[person], self.mother[person]].into_iter().flatten() {
                if parent >= n {
                    return Err(PedigreeError::ParentOutOfRange { person, parent });
                }
            }
        }

        if let Some(person) =
            (0..n).find(|&i| self.father[i].is_some() != self.mother[i].is_some())
        {
            return Err(PedigreeError::SingleParent { person });
        }

        for relation in &self.relation {
            if relation.left >= n || relation.right >= n {
                return Err(PedigreeError::RelationOutOfRange {
                    left: relation.left,
                    right: relation.right,
                });
            }
            if relation.left == relation.right {
                return Err(PedigreeError::SelfRelation {
                    person: relation.left,
                });
            }
        }

        self.validate_hints()
    }

    fn validate_hints(&self) -> Result<(), PedigreeError> {
        let n = self.id.len();
        if let Some(order) = &self.hints.order {
            if order.len() != n {
                return Err(PedigreeError::InvalidHint(format!(
                    "order has {} entries, expected {n}",
                    order.len()
                )));
            }
        }

        for hint in &self.hints.spouse {
            if hint.left >= n || hint.right >= n {
                return Err(PedigreeError::InvalidHint(format!(
                    "spouse hint ({}, {}) references an unknown individual",
                    hint.left, hint.right
                )));
            }
            if hint.left == hint.right {
                return Err(PedigreeError::InvalidHint(format!(
                    "spouse hint pairs individual {} with themself",
                    hint.left
                )));
            }
        }

        Ok(())
    }
}
