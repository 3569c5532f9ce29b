//! Full generation passes over a population.
//!
//! [`generate_relationships`] runs every social rule in
//! [`GENERATION_ORDER`], threading the growing edge list from one rule into
//! the next. [`generate_world`] follows that with genealogy for the couples
//! the pass produced.

use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;
use tracing::info;

use kinship_types::{Individual, IndividualId, Relationship, RelationshipKind};

use crate::attraction::AttractionScorer;
use crate::genealogy::{ChildFactory, Couple, GenealogyContext, derive_genealogy};
use crate::pairs::Pair;
use crate::random::RandomSource;
use crate::rules::GENERATION_ORDER;

/// Relationships and children produced by [`generate_world`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorldGeneration {
    /// Every edge: the ones passed in, then the social edges of this pass,
    /// then the kinship edges of the new children.
    pub relationships: Vec<Relationship>,
    /// Individuals born during genealogy.
    pub children: Vec<Individual>,
}

/// Run every social rule over `population`, in [`GENERATION_ORDER`].
///
/// `relationships` is the accumulator: each rule sees everything created
/// before it, including edges from earlier rules in the same pass, and
/// appends its own. The extended list is returned.
pub fn generate_relationships<A, R>(
    population: &[Individual],
    mut relationships: Vec<Relationship>,
    reference_date: NaiveDate,
    scorer: &A,
    source: &mut R,
) -> Vec<Relationship>
where
    A: AttractionScorer + ?Sized,
    R: RandomSource + ?Sized,
{
    let initial = relationships.len();
    for rule in GENERATION_ORDER {
        let created = rule.generate(population, &relationships, reference_date, scorer, source);
        relationships.extend(created);
    }

    info!(
        population = population.len(),
        created = relationships.len().saturating_sub(initial),
        total = relationships.len(),
        "relationship generation complete"
    );
    relationships
}

/// Couples linked by an edge of any of `kinds`, one per unordered pair.
///
/// Couples come out in the order their first edge appears. Edges pointing
/// at someone outside `population` are ignored.
pub fn couples_from_relationships<'a>(
    population: &'a [Individual],
    relationships: &[Relationship],
    kinds: &[RelationshipKind],
) -> Vec<Couple<'a>> {
    let people: HashMap<IndividualId, &'a Individual> = population
        .iter()
        .map(|individual| (individual.id, individual))
        .collect();
    let mut seen = BTreeSet::new();

    relationships
        .iter()
        .filter(|edge| kinds.contains(&edge.kind))
        .filter_map(|edge| {
            let first = people.get(&edge.source).copied()?;
            let second = people.get(&edge.target).copied()?;
            let key = (edge.source.min(edge.target), edge.source.max(edge.target));
            seen.insert(key).then_some(Pair::new(first, second))
        })
        .collect()
}

/// Generate social relationships, then children for every couple linked by
/// one of `couple_kinds`.
///
/// Randomness for pair selection, values, dates, and child counts comes
/// from `source`; the child factory brings its own. A factory error aborts
/// the pass and is returned as is.
pub async fn generate_world<A, F, R>(
    population: &[Individual],
    existing: Vec<Relationship>,
    reference_date: NaiveDate,
    scorer: &A,
    couple_kinds: &[RelationshipKind],
    factory: &mut F,
    source: &mut R,
) -> Result<WorldGeneration, F::Error>
where
    A: AttractionScorer + ?Sized,
    F: ChildFactory + ?Sized,
    R: RandomSource + ?Sized,
{
    let mut relationships =
        generate_relationships(population, existing, reference_date, scorer, source);

    let couples = couples_from_relationships(population, &relationships, couple_kinds);
    let context = GenealogyContext {
        population,
        relationships: &relationships,
        reference_date,
    };
    let genealogy = derive_genealogy(&couples, context, factory, source).await?;

    relationships.extend(genealogy.relationships);
    Ok(WorldGeneration {
        relationships,
        children: genealogy.children,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]
mod tests {
    use kinship_types::{RelationshipHistory, Sex};

    use super::*;
    use crate::children::InheritingChildFactory;
    use crate::random::{RngSource, SequenceSource};
    use crate::rules::RelationshipRule;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn population(size: usize) -> Vec<Individual> {
        (0..size)
            .map(|i| {
                let sex = if i % 2 == 0 { Sex::Female } else { Sex::Male };
                Individual::new(format!("P{i}"), date(1985, 6, 1), sex)
            })
            .collect()
    }

    fn attracted(_: &Individual, _: &Individual, _: NaiveDate) -> i32 {
        100
    }

    fn count(edges: &[Relationship], kind: RelationshipKind) -> usize {
        edges.iter().filter(|e| e.kind == kind).count()
    }

    #[test]
    fn every_rule_contributes_its_quota() {
        let people = population(16);
        let mut source = RngSource::seeded(2);

        let edges =
            generate_relationships(&people, Vec::new(), date(2025, 6, 1), &attracted, &mut source);

        assert_eq!(count(&edges, RelationshipKind::Friend), 6);
        assert_eq!(count(&edges, RelationshipKind::Enemy), 4);
        assert_eq!(count(&edges, RelationshipKind::RomanticPartner), 4);
        assert_eq!(count(&edges, RelationshipKind::Spouse), 4);
        assert_eq!(count(&edges, RelationshipKind::CasualRomanticPartner), 4);
    }

    #[test]
    fn romance_commitments_carry_into_marriage() {
        let people = population(16);
        let mut source = RngSource::seeded(9);

        let edges =
            generate_relationships(&people, Vec::new(), date(2025, 6, 1), &attracted, &mut source);

        let romantic: BTreeSet<IndividualId> = edges
            .iter()
            .filter(|e| e.kind == RelationshipKind::RomanticPartner)
            .map(|e| e.source)
            .collect();
        let married: BTreeSet<IndividualId> = edges
            .iter()
            .filter(|e| e.kind == RelationshipKind::Spouse)
            .map(|e| e.source)
            .collect();
        assert_eq!(romantic.len(), 4);
        assert_eq!(married.len(), 4);
        assert!(romantic.is_disjoint(&married));
    }

    #[test]
    fn existing_edges_are_kept_in_front() {
        let people = population(8);
        let history = RelationshipHistory::new(date(2020, 1, 1), date(2024, 1, 1));
        let existing = vec![
            Relationship::new(people[0].id, people[1].id, RelationshipKind::Spouse, 90, history),
            Relationship::new(people[1].id, people[0].id, RelationshipKind::Spouse, 90, history),
        ];
        let mut source = RngSource::seeded(4);

        let edges = generate_relationships(
            &people,
            existing.clone(),
            date(2025, 6, 1),
            &attracted,
            &mut source,
        );

        assert_eq!(&edges[..2], existing.as_slice());
        let new_spouses = edges[2..]
            .iter()
            .filter(|e| e.kind == RelationshipKind::Spouse)
            .count();
        assert!(new_spouses <= 2);
        assert!(!edges[2..].iter().any(|e| e.kind.is_commitment()
            && (e.involves(people[0].id) || e.involves(people[1].id))));
    }

    #[test]
    fn couples_are_deduplicated() {
        let people = population(4);
        let history = RelationshipHistory::new(date(2020, 1, 1), date(2024, 1, 1));
        let edges = vec![
            Relationship::new(people[0].id, people[1].id, RelationshipKind::Spouse, 90, history),
            Relationship::new(people[1].id, people[0].id, RelationshipKind::Spouse, 90, history),
            Relationship::new(people[2].id, people[3].id, RelationshipKind::Friend, 40, history),
            Relationship::new(people[3].id, people[2].id, RelationshipKind::Friend, 40, history),
            Relationship::new(people[2].id, IndividualId::new(), RelationshipKind::Spouse, 90, history),
        ];

        let couples = couples_from_relationships(&people, &edges, &[RelationshipKind::Spouse]);

        assert_eq!(couples.len(), 1);
        assert_eq!(couples[0].ids(), (people[0].id, people[1].id));

        let both = couples_from_relationships(
            &people,
            &edges,
            &[RelationshipKind::Spouse, RelationshipKind::Friend],
        );
        assert_eq!(both.len(), 2);
    }

    #[tokio::test]
    async fn world_pass_adds_children_of_spouses() {
        let people = population(16);
        let today = date(2025, 6, 1);
        let mut factory = InheritingChildFactory::new(RngSource::seeded(100));
        let mut source = RngSource::seeded(6);

        let world = generate_world(
            &people,
            Vec::new(),
            today,
            &attracted,
            &[RelationshipKind::Spouse],
            &mut factory,
            &mut source,
        )
        .await
        .unwrap();

        let children = world.children.len();
        assert!(children <= 4);
        assert_eq!(count(&world.relationships, RelationshipKind::Parent), 2 * children);
        assert_eq!(count(&world.relationships, RelationshipKind::Child), 2 * children);
        for child in &world.children {
            assert_eq!(child.generation, 1);
            assert!(child.birth_date <= today);
            let parents = [child.parent_a.unwrap(), child.parent_b.unwrap()];
            assert!(world.relationships.iter().any(|e| e.kind == RelationshipKind::Spouse
                && e.connects(parents[0], parents[1])));
        }
    }

    async fn seeded_world(people: &[Individual], seed: u64) -> WorldGeneration {
        let mut factory = InheritingChildFactory::new(RngSource::seeded(seed));
        let mut source = RngSource::seeded(seed.wrapping_add(1));
        generate_world(
            people,
            Vec::new(),
            date(2025, 6, 1),
            &attracted,
            &[RelationshipKind::Spouse, RelationshipKind::RomanticPartner],
            &mut factory,
            &mut source,
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn world_pass_is_reproducible() {
        let people = population(24);

        let first = seeded_world(&people, 1).await;
        let second = seeded_world(&people, 1).await;

        assert_eq!(first, second);
        assert_eq!(count(&first.relationships, RelationshipKind::Spouse), 6);
    }

    #[test]
    fn zero_quota_population_draws_nothing() {
        let people = population(4);
        let mut source = SequenceSource::exhausted();

        let edges =
            generate_relationships(&people, Vec::new(), date(2025, 6, 1), &attracted, &mut source);

        assert!(edges.is_empty());
        assert_eq!(source.draws(), 0);
        assert_eq!(RelationshipRule::Friendship.quota(people.len()), 0);
    }
}
