//! Enumeration types for the Kinship social-graph generator.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Sex
// ---------------------------------------------------------------------------

/// Biological sex of an individual.
///
/// Only the genealogy step reads this: couples of the same sex are not fed
/// to child creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    /// Male.
    Male,
    /// Female.
    Female,
}

impl Sex {
    /// Return the other sex.
    pub const fn opposite(self) -> Self {
        match self {
            Self::Male => Self::Female,
            Self::Female => Self::Male,
        }
    }
}

impl core::fmt::Display for Sex {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Male => write!(f, "male"),
            Self::Female => write!(f, "female"),
        }
    }
}

// ---------------------------------------------------------------------------
// RelationshipKind
// ---------------------------------------------------------------------------

/// The kind of a directed relationship edge.
///
/// The kind names the source's role toward the target: `Parent(A -> C)`
/// means A is C's parent. The mirrored edge carries
/// [`reciprocal`](Self::reciprocal).
///
/// The enum is `#[non_exhaustive]` so kinds added later (or read back from
/// older persisted worlds) do not break downstream matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum RelationshipKind {
    /// Known to each other, nothing more.
    Acquaintance,
    /// Friendship.
    Friend,
    /// Rivalry or enmity.
    Enemy,
    /// Uncommitted romantic involvement.
    CasualRomanticPartner,
    /// Committed romantic relationship.
    RomanticPartner,
    /// Marriage.
    Spouse,
    /// Shares both parents.
    Sibling,
    /// Source is the target's parent.
    Parent,
    /// Source is the target's grandparent.
    Grandparent,
    /// Source is the target's child.
    Child,
    /// Source is the target's grandchild.
    Grandchild,
}

impl RelationshipKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 11] = [
        Self::Acquaintance,
        Self::Friend,
        Self::Enemy,
        Self::CasualRomanticPartner,
        Self::RomanticPartner,
        Self::Spouse,
        Self::Sibling,
        Self::Parent,
        Self::Grandparent,
        Self::Child,
        Self::Grandchild,
    ];

    /// The kind carried by the mirrored (target -> source) edge.
    ///
    /// `Parent`/`Child` and `Grandparent`/`Grandchild` swap; every other kind
    /// maps to itself.
    pub const fn reciprocal(self) -> Self {
        match self {
            Self::Parent => Self::Child,
            Self::Child => Self::Parent,
            Self::Grandparent => Self::Grandchild,
            Self::Grandchild => Self::Grandparent,
            other => other,
        }
    }

    /// Whether both directions of an edge carry the same kind.
    pub fn is_symmetric(self) -> bool {
        self.reciprocal() == self
    }

    /// Whether this kind marks its holders as romantically committed.
    pub const fn is_commitment(self) -> bool {
        matches!(self, Self::RomanticPartner | Self::Spouse)
    }
}

impl core::fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let label = match self {
            Self::Acquaintance => "acquaintance",
            Self::Friend => "friend",
            Self::Enemy => "enemy",
            Self::CasualRomanticPartner => "casual_romantic_partner",
            Self::RomanticPartner => "romantic_partner",
            Self::Spouse => "spouse",
            Self::Sibling => "sibling",
            Self::Parent => "parent",
            Self::Grandparent => "grandparent",
            Self::Child => "child",
            Self::Grandchild => "grandchild",
        };
        f.write_str(label)
    }
}
