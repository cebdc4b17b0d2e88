use crate::{Anchor, PedigreeInput, RelationCode, Sex};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Side {
    Left,
    Right,
}

/// A partner pair still waiting to be drawn
///
/// The husband is the male member, or the member given first when neither is
/// male. Fathers are always husbands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct SpouseRecord {
    pub husband: usize,
    pub wife: usize,
    /// Side the husband must be drawn on, if hinted
    pub husband_side: Option<Side>,
    /// Side of the member the pair is drawn with, if hinted
    pub anchor: Option<Side>,
}

/// A partner claimed by a subtree, with the side it must go on if known
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Partner {
    pub person: usize,
    pub side: Option<Side>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SpouseList {
    records: Vec<SpouseRecord>,
}

impl SpouseList {
    /// Hinted pairs first, then declared partners, then parents of children
    pub(crate) fn from_input(input: &PedigreeInput) -> Self {
        let oriented = |a: usize, b: usize| {
            if input.sex[a] == Sex::Male || input.sex[b] != Sex::Male {
                (a, b, Side::Left)
            } else {
                (b, a, Side::Right)
            }
        };

        let hinted = input.hints.spouse.iter().map(|hint| {
            let (husband, wife, side) = oriented(hint.left, hint.right);
            SpouseRecord {
                husband,
                wife,
                husband_side: Some(side),
                anchor: match hint.anchor {
                    Anchor::Either => None,
                    Anchor::Left => Some(Side::Left),
                    Anchor::Right => Some(Side::Right),
                },
            }
        });

        let declared = input
            .relation
            .iter()
            .filter(|r| r.code == RelationCode::Spouse)
            .map(|r| {
                let (husband, wife, _) = oriented(r.left, r.right);
                SpouseRecord {
                    husband,
                    wife,
                    husband_side: None,
                    anchor: None,
                }
            });

        let parents = (0..input.len())
            .filter_map(|child| input.parents(child))
            .map(|(father, mother)| SpouseRecord {
                husband: father,
                wife: mother,
                husband_side: None,
                anchor: None,
            });

        let mut seen = BTreeSet::new();
        let records = hinted
            .chain(declared)
            .chain(parents)
            .filter(|r| seen.insert((r.husband.min(r.wife), r.husband.max(r.wife))))
            .collect();

        Self { records }
    }

    pub(crate) fn records(&self) -> &[SpouseRecord] {
        &self.records
    }

    pub(crate) fn couples(&self) -> Vec<(usize, usize)> {
        self.records.iter().map(|r| (r.husband, r.wife)).collect()
    }

    /// Take the pairs that `person` draws
    ///
    /// A person is treated as a husband if they are one in any remaining
    /// record. Only records where they hold the anchor (or no anchor was
    /// hinted) and whose partner passes `keep` are taken, the others stay for
    /// the partner to claim. Returns the claimed partners, whether `person`
    /// claimed as a wife, and the remaining list.
    pub(crate) fn claim<F>(self, person: usize, keep: F) -> (Vec<Partner>, bool, Self)
    where
        F: Fn(usize) -> bool,
    {
        let as_wife = !self.records.iter().any(|r| r.husband == person);

        let (claimed, rest): (Vec<_>, Vec<_>) = self.records.into_iter().partition(|r| {
            let (member, partner, holds_anchor) = if as_wife {
                (r.wife, r.husband, r.anchor.is_none() || r.anchor != r.husband_side)
            } else {
                (r.husband, r.wife, r.anchor.is_none() || r.anchor == r.husband_side)
            };
            member == person && holds_anchor && keep(partner)
        });

        let partners = claimed
            .into_iter()
            .map(|r| {
                if as_wife {
                    Partner {
                        person: r.husband,
                        side: r.husband_side,
                    }
                } else {
                    Partner {
                        person: r.wife,
                        side: r.husband_side.map(|side| match side {
                            Side::Left => Side::Right,
                            Side::Right => Side::Left,
                        }),
                    }
                }
            })
            .collect();

        (partners, as_wife, Self { records: rest })
    }
}
