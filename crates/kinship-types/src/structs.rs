//! Core entity structs for the Kinship social-graph generator.
//!
//! Covers the read-only [`Individual`] snapshot supplied by callers and the
//! directed [`Relationship`] records produced by generation.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::enums::{RelationshipKind, Sex};
use crate::ids::IndividualId;

/// Lowest value a relationship edge can carry.
pub const RELATIONSHIP_VALUE_MIN: i32 = -100;

/// Highest value a relationship edge can carry.
pub const RELATIONSHIP_VALUE_MAX: i32 = 100;

// ---------------------------------------------------------------------------
// BodyAttributes
// ---------------------------------------------------------------------------

/// Physical attributes sampled at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyAttributes {
    /// Standing height in centimetres.
    pub height_cm: Decimal,
    /// Body weight in kilograms.
    pub weight_kg: Decimal,
}

// ---------------------------------------------------------------------------
// Individual
// ---------------------------------------------------------------------------

/// A member of the simulated population.
///
/// Generation reads only `birth_date` and `sex`; `traits` matter to child
/// creation, which samples them for inheritance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Individual {
    /// Unique identifier.
    pub id: IndividualId,
    /// Display name.
    pub name: String,
    /// Calendar date of birth.
    pub birth_date: NaiveDate,
    /// Biological sex.
    pub sex: Sex,
    /// Trait identifiers (e.g. `"curious"`, `"stubborn"`).
    #[serde(default)]
    pub traits: BTreeSet<String>,
    /// Sampled body attributes, if any were generated.
    #[serde(default)]
    pub body: Option<BodyAttributes>,
    /// First parent (`None` for seed individuals).
    #[serde(default)]
    pub parent_a: Option<IndividualId>,
    /// Second parent (`None` for seed individuals).
    #[serde(default)]
    pub parent_b: Option<IndividualId>,
    /// Generation number (0 for seed individuals).
    #[serde(default)]
    pub generation: u32,
}

impl Individual {
    /// Create a seed individual with a fresh identifier and no traits.
    pub fn new(name: impl Into<String>, birth_date: NaiveDate, sex: Sex) -> Self {
        Self {
            id: IndividualId::new(),
            name: name.into(),
            birth_date,
            sex,
            traits: BTreeSet::new(),
            body: None,
            parent_a: None,
            parent_b: None,
            generation: 0,
        }
    }

    /// Replace the identifier.
    #[must_use]
    pub const fn with_id(mut self, id: IndividualId) -> Self {
        self.id = id;
        self
    }

    /// Replace the trait set.
    #[must_use]
    pub fn with_traits<I, S>(mut self, traits: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.traits = traits.into_iter().map(Into::into).collect();
        self
    }

    /// Attach body attributes.
    #[must_use]
    pub fn with_body(mut self, body: BodyAttributes) -> Self {
        self.body = Some(body);
        self
    }

    /// Full years of age on `date`. Zero if `date` precedes the birth date.
    pub fn age_on(&self, date: NaiveDate) -> u32 {
        date.years_since(self.birth_date).unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// RelationshipHistory
// ---------------------------------------------------------------------------

/// First and most recent interaction dates of a relationship.
///
/// `first_interaction <= last_interaction` always holds; the constructor
/// orders its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipHistory {
    first_interaction: NaiveDate,
    last_interaction: NaiveDate,
}

impl RelationshipHistory {
    /// Build a history from two dates in either order.
    pub fn new(a: NaiveDate, b: NaiveDate) -> Self {
        Self {
            first_interaction: a.min(b),
            last_interaction: a.max(b),
        }
    }

    /// Date of the first interaction.
    pub const fn first_interaction(&self) -> NaiveDate {
        self.first_interaction
    }

    /// Date of the most recent interaction.
    pub const fn last_interaction(&self) -> NaiveDate {
        self.last_interaction
    }
}

// ---------------------------------------------------------------------------
// Relationship
// ---------------------------------------------------------------------------

/// One directed relationship edge.
///
/// Edges are produced in matched pairs (`A -> B` and `B -> A`, the second
/// carrying the reciprocal kind) and are never mutated by generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    /// The individual holding this view of the relationship.
    pub source: IndividualId,
    /// The individual the relationship points at.
    pub target: IndividualId,
    /// What the source is to the target.
    pub kind: RelationshipKind,
    /// Strength in `[-100, 100]`.
    pub value: i32,
    /// Interaction dates.
    pub history: RelationshipHistory,
}

impl Relationship {
    /// Create an edge, clamping `value` to `[-100, 100]`.
    pub fn new(
        source: IndividualId,
        target: IndividualId,
        kind: RelationshipKind,
        value: i64,
        history: RelationshipHistory,
    ) -> Self {
        Self {
            source,
            target,
            kind,
            value: clamp_value(value),
            history,
        }
    }

    /// Whether this edge links `a` and `b`, in either direction.
    pub fn connects(&self, a: IndividualId, b: IndividualId) -> bool {
        (self.source == a && self.target == b) || (self.source == b && self.target == a)
    }

    /// Whether `id` is either endpoint of this edge.
    pub fn involves(&self, id: IndividualId) -> bool {
        self.source == id || self.target == id
    }
}

/// Clamp a raw sampled value into the relationship value range.
fn clamp_value(raw: i64) -> i32 {
    let clamped = raw.clamp(
        i64::from(RELATIONSHIP_VALUE_MIN),
        i64::from(RELATIONSHIP_VALUE_MAX),
    );
    i32::try_from(clamped).unwrap_or(0)
}
