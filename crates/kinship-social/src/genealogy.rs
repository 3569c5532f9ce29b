//! Second-generation derivation from couples.
//!
//! Each opposite-sex couple has between zero and two children. Child
//! creation is delegated to a [`ChildFactory`]; this module only decides how
//! many children a couple has and wires the kinship edges around them:
//!
//! - `Parent`/`Child` between each parent and each child (four edges per
//!   child, fixed value 50).
//! - `Grandparent`/`Grandchild` between each child and any known parent of
//!   either parent.
//! - `Sibling` between every two children of the same couple, so `k`
//!   children produce `k·(k-1)` sibling edges.
//!
//! Same-sex couples are dropped before any randomness is consumed. That is
//! a product policy of this model, not something the data model requires;
//! every other relationship kind accepts any two individuals.

use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;
use tracing::{debug, info};

use kinship_types::{Individual, IndividualId, Relationship, RelationshipKind, Sex};

use crate::factory::create_relationship;
use crate::pairs::{Pair, unordered_pairs};
use crate::random::RandomSource;

/// Most children a single couple may have in one pass.
pub const MAX_CHILDREN_PER_COUPLE: i64 = 2;

/// Two individuals eligible for the genealogy step.
pub type Couple<'a> = Pair<'a>;

// ---------------------------------------------------------------------------
// ChildFactory
// ---------------------------------------------------------------------------

/// Creates the individual born to a couple.
///
/// Implementations may perform I/O, hence the future. Errors are returned
/// to the caller of [`derive_genealogy`] unchanged.
pub trait ChildFactory {
    /// Failure reported by the factory.
    type Error;

    /// Create a child of `mother` and `father`, born no later than
    /// `reference_date`.
    fn create_child(
        &mut self,
        mother: &Individual,
        father: &Individual,
        reference_date: NaiveDate,
    ) -> impl Future<Output = Result<Individual, Self::Error>>;
}

// ---------------------------------------------------------------------------
// Derivation
// ---------------------------------------------------------------------------

/// What genealogy derivation reads besides the couples themselves.
#[derive(Debug, Clone, Copy)]
pub struct GenealogyContext<'a> {
    /// Everyone who may appear as a grandparent.
    pub population: &'a [Individual],
    /// Known edges; `Parent` edges among them identify grandparents.
    pub relationships: &'a [Relationship],
    /// Date the pass is generated for.
    pub reference_date: NaiveDate,
}

/// New individuals and the kinship edges connecting them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Genealogy {
    /// Children created for the couples.
    pub children: Vec<Individual>,
    /// Parent, child, grandparent, grandchild, and sibling edges.
    pub relationships: Vec<Relationship>,
}

/// Derive children and kinship edges for `couples`.
///
/// Couples that are not one male and one female are skipped. For every
/// other couple, a child count in `[0, 2]` is drawn from `source` and the
/// factory is asked for each child in turn.
pub async fn derive_genealogy<F, R>(
    couples: &[Couple<'_>],
    context: GenealogyContext<'_>,
    factory: &mut F,
    source: &mut R,
) -> Result<Genealogy, F::Error>
where
    F: ChildFactory + ?Sized,
    R: RandomSource + ?Sized,
{
    let mut genealogy = Genealogy::default();
    let people: HashMap<IndividualId, &Individual> = context
        .population
        .iter()
        .map(|individual| (individual.id, individual))
        .collect();

    let mut couples_considered: usize = 0;
    for couple in couples {
        let (Some(mother), Some(father)) =
            (couple.member_of_sex(Sex::Female), couple.member_of_sex(Sex::Male))
        else {
            debug!(
                first = %couple.first.id,
                second = %couple.second.id,
                "skipping couple without one mother and one father"
            );
            continue;
        };
        couples_considered = couples_considered.saturating_add(1);

        let child_count = source.random_int(0, MAX_CHILDREN_PER_COUPLE);
        let grandparents = known_parents_of(&people, context.relationships, &[mother, father]);
        let mut siblings: Vec<Individual> = Vec::new();

        for _ in 0..child_count {
            let child = factory
                .create_child(mother, father, context.reference_date)
                .await?;
            debug!(
                child = %child.id,
                mother = %mother.id,
                father = %father.id,
                birth_date = %child.birth_date,
                "child created"
            );

            for parent in [mother, father] {
                link(
                    &mut genealogy.relationships,
                    parent,
                    &child,
                    RelationshipKind::Parent,
                    context.reference_date,
                    source,
                );
            }
            for &grandparent in &grandparents {
                link(
                    &mut genealogy.relationships,
                    grandparent,
                    &child,
                    RelationshipKind::Grandparent,
                    context.reference_date,
                    source,
                );
            }
            siblings.push(child);
        }

        for (elder, younger) in unordered_pairs(&siblings) {
            link(
                &mut genealogy.relationships,
                elder,
                younger,
                RelationshipKind::Sibling,
                context.reference_date,
                source,
            );
        }
        genealogy.children.append(&mut siblings);
    }

    info!(
        couples = couples.len(),
        couples_considered,
        children = genealogy.children.len(),
        relationships = genealogy.relationships.len(),
        "genealogy derived"
    );
    Ok(genealogy)
}

/// Append the reciprocal `kind` edges between `a` and `b` to `edges`.
fn link<R: RandomSource + ?Sized>(
    edges: &mut Vec<Relationship>,
    a: &Individual,
    b: &Individual,
    kind: RelationshipKind,
    reference_date: NaiveDate,
    source: &mut R,
) {
    if let Some(pair) = create_relationship(edges, a, b, kind, reference_date, source) {
        edges.extend(pair);
    }
}

/// Individuals with a `Parent` edge pointing at any of `children`, in edge
/// order and without repeats. Parents missing from `people` are ignored.
fn known_parents_of<'a>(
    people: &HashMap<IndividualId, &'a Individual>,
    relationships: &[Relationship],
    children: &[&Individual],
) -> Vec<&'a Individual> {
    let child_ids: BTreeSet<IndividualId> = children.iter().map(|child| child.id).collect();
    let mut seen = BTreeSet::new();
    relationships
        .iter()
        .filter(|edge| edge.kind == RelationshipKind::Parent && child_ids.contains(&edge.target))
        .filter(|edge| seen.insert(edge.source))
        .filter_map(|edge| people.get(&edge.source).copied())
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
