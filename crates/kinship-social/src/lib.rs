//! Social-graph generation for the Kinship population generator.
//!
//! This crate builds friendships, rivalries, romances, marriages, and the
//! kinship of a second generation over a population snapshot. It performs
//! no I/O: callers hand in individuals and known edges, and get new edges
//! (and, for genealogy, new individuals) back. All randomness flows through
//! an injected [`RandomSource`].
//!
//! # Modules
//!
//! - [`random`] -- Injectable randomness ([`RandomSource`], [`RngSource`], [`SequenceSource`])
//! - [`pairs`] -- Unique unordered pair enumeration and shuffled selection
//! - [`attraction`] -- Attraction scoring collaborator and the gating threshold
//! - [`factory`] -- Reciprocal edge creation with duplicate detection
//! - [`rules`] -- The five social rules and their shared quota loop
//! - [`genealogy`] -- Children, parent/child, grandparent, and sibling edges for couples
//! - [`children`] -- Default child creation ([`InheritingChildFactory`])
//! - [`orchestrator`] -- Full passes over a population
//! - [`error`] -- Error types ([`ChildError`])

pub mod attraction;
pub mod children;
pub mod error;
pub mod factory;
pub mod genealogy;
pub mod orchestrator;
pub mod pairs;
pub mod random;
pub mod rules;

// Re-export primary types at crate root for convenience.
pub use attraction::{ATTRACTION_THRESHOLD, AgeProximityAttraction, AttractionScorer, is_attracted};
pub use children::{InheritingChildFactory, child_birth_date, generate_child_name};
pub use error::ChildError;
pub use factory::{ReciprocalPair, create_relationship, relationship_exists, value_range};
pub use genealogy::{ChildFactory, Couple, Genealogy, GenealogyContext, derive_genealogy};
pub use orchestrator::{
    WorldGeneration, couples_from_relationships, generate_relationships, generate_world,
};
pub use pairs::{Pair, select_pairs, select_pairs_where, unordered_pairs};
pub use random::{RandomSource, RngSource, SequenceSource, random_id};
pub use rules::{GENERATION_ORDER, RelationshipRule};
