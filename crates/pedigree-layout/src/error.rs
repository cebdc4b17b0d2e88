use thiserror::Error;

/// Errors that can occur while laying out a pedigree
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PedigreeError {
    /// A per-individual array does not have one entry per individual
    #[error("{field} has {found} entries, expected {expected}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        found: usize,
    },

    /// A parent index points outside of the individual list
    #[error("individual {person} has parent index {parent} which is out of range")]
    ParentOutOfRange { person: usize, parent: usize },

    /// Exactly one of the two parents is recorded
    #[error("individual {person} must have both parents or none")]
    SingleParent { person: usize },

    /// The individual is listed as their own ancestor
    #[error("individual {person} is their own ancestor")]
    CyclicAncestry { person: usize },

    /// A relation references an individual that does not exist
    #[error("relation between {left} and {right} references an unknown individual")]
    RelationOutOfRange { left: usize, right: usize },

    /// A relation links an individual to themself
    #[error("individual {person} cannot be related to themself")]
    SelfRelation { person: usize },

    /// Layout hints do not match the pedigree
    #[error("invalid hint: {0}")]
    InvalidHint(String),

    /// Connector scaling parameters are unusable
    #[error("invalid scaling parameters: {0}")]
    InvalidScaling(String),
}
