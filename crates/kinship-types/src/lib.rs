//! Shared type definitions for the Kinship social-graph generator.
//!
//! This crate is the single source of truth for the data that flows in and
//! out of the generation core: the population snapshot handed in by callers
//! and the directed relationship records handed back.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrapper for individual identifiers
//! - [`enums`] -- Biological sex and the closed relationship-kind enumeration
//! - [`structs`] -- Individuals, body attributes, and relationship edges

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{RelationshipKind, Sex};
pub use ids::IndividualId;
pub use structs::{
    BodyAttributes, Individual, RELATIONSHIP_VALUE_MAX, RELATIONSHIP_VALUE_MIN, Relationship,
    RelationshipHistory,
};
