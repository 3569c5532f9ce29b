//! The five social relationship rules.
//!
//! Every rule runs the same loop: walk a shuffled list of all unique pairs,
//! skip ineligible candidates, ask the factory for edges, and stop once the
//! quota of successful pairs is met. Rules differ only in four parameters,
//! so they are variants of one enum rather than five copies of the loop.
//!
//! | Rule            | Kind                    | Divisor | Attraction | Exclusive |
//! |-----------------|-------------------------|---------|------------|-----------|
//! | `Friendship`    | `Friend`                | 5       | no         | no        |
//! | `Enmity`        | `Enemy`                 | 8       | no         | no        |
//! | `CasualRomance` | `CasualRomanticPartner` | 8       | yes        | no        |
//! | `Romance`       | `RomanticPartner`       | 8       | yes        | yes       |
//! | `Marriage`      | `Spouse`                | 8       | yes        | yes       |

use std::collections::HashSet;
use std::fmt;

use chrono::NaiveDate;
use tracing::{debug, info, trace};

use kinship_types::{Individual, IndividualId, Relationship, RelationshipKind};

use crate::attraction::{AttractionScorer, is_attracted};
use crate::factory::create_relationship;
use crate::pairs::select_pairs;
use crate::random::RandomSource;

/// Quota divisor of the friendship rule.
pub const FRIENDSHIP_QUOTA_DIVISOR: usize = 5;

/// Quota divisor of every other rule.
pub const DEFAULT_QUOTA_DIVISOR: usize = 8;

/// Order in which a generation pass runs the rules.
///
/// Romance precedes Marriage, so anyone who finds a romantic partner in a
/// pass is already committed by the time spouses are chosen.
pub const GENERATION_ORDER: [RelationshipRule; 5] = [
    RelationshipRule::Friendship,
    RelationshipRule::Enmity,
    RelationshipRule::Romance,
    RelationshipRule::Marriage,
    RelationshipRule::CasualRomance,
];

/// One social relationship rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationshipRule {
    /// Creates `Friend` pairs.
    Friendship,
    /// Creates `Enemy` pairs.
    Enmity,
    /// Creates `CasualRomanticPartner` pairs between attracted individuals.
    CasualRomance,
    /// Creates `RomanticPartner` pairs between attracted, uncommitted
    /// individuals.
    Romance,
    /// Creates `Spouse` pairs between attracted, uncommitted individuals.
    Marriage,
}

impl RelationshipRule {
    /// Kind of the edges this rule creates.
    pub const fn kind(self) -> RelationshipKind {
        match self {
            Self::Friendship => RelationshipKind::Friend,
            Self::Enmity => RelationshipKind::Enemy,
            Self::CasualRomance => RelationshipKind::CasualRomanticPartner,
            Self::Romance => RelationshipKind::RomanticPartner,
            Self::Marriage => RelationshipKind::Spouse,
        }
    }

    /// Population size per allowed pair.
    pub const fn quota_divisor(self) -> usize {
        match self {
            Self::Friendship => FRIENDSHIP_QUOTA_DIVISOR,
            Self::Enmity | Self::CasualRomance | Self::Romance | Self::Marriage => {
                DEFAULT_QUOTA_DIVISOR
            }
        }
    }

    /// Whether candidates must pass the attraction threshold.
    pub const fn requires_attraction(self) -> bool {
        matches!(self, Self::CasualRomance | Self::Romance | Self::Marriage)
    }

    /// Whether each individual may hold at most one commitment.
    pub const fn is_exclusive(self) -> bool {
        matches!(self, Self::Romance | Self::Marriage)
    }

    /// Maximum number of successful pairs for a population of the given
    /// size (integer division).
    pub fn quota(self, population_size: usize) -> usize {
        population_size
            .checked_div(self.quota_divisor())
            .unwrap_or_default()
    }

    /// Run this rule once over `population`.
    ///
    /// `existing` holds every edge known before the rule runs; it seeds the
    /// committed set of exclusive rules and is what the factory checks for
    /// duplicates. Only the newly created edges are returned, two per
    /// successful pair. A candidate the factory rejects as a duplicate costs
    /// no quota and commits nobody.
    pub fn generate<A, R>(
        self,
        population: &[Individual],
        existing: &[Relationship],
        reference_date: NaiveDate,
        scorer: &A,
        source: &mut R,
    ) -> Vec<Relationship>
    where
        A: AttractionScorer + ?Sized,
        R: RandomSource + ?Sized,
    {
        let kind = self.kind();
        let quota = self.quota(population.len());
        let mut created = Vec::new();
        if quota == 0 {
            debug!(rule = %self, population = population.len(), "quota is zero, skipping rule");
            return created;
        }

        let mut committed = if self.is_exclusive() {
            committed_individuals(existing)
        } else {
            HashSet::new()
        };
        let mut pairs_created: usize = 0;

        for pair in select_pairs(population, source) {
            if pairs_created >= quota {
                break;
            }
            let (first, second) = pair.ids();

            if self.is_exclusive() && (committed.contains(&first) || committed.contains(&second))
            {
                trace!(rule = %self, %first, %second, "skipping committed candidate");
                continue;
            }
            if self.requires_attraction()
                && !is_attracted(scorer, pair.first, pair.second, reference_date)
            {
                trace!(rule = %self, %first, %second, "skipping unattracted candidate");
                continue;
            }

            // Each unordered pair is offered once per pass, so only
            // `existing` can already hold this relationship.
            let Some(edges) = create_relationship(
                existing,
                pair.first,
                pair.second,
                kind,
                reference_date,
                source,
            ) else {
                continue;
            };

            debug!(
                rule = %self,
                %first,
                %second,
                value = edges.forward.value,
                "created relationship"
            );
            if self.is_exclusive() {
                committed.insert(first);
                committed.insert(second);
            }
            created.extend(edges);
            pairs_created = pairs_created.saturating_add(1);
        }

        info!(
            rule = %self,
            population = population.len(),
            quota,
            pairs_created,
            "relationship rule complete"
        );
        created
    }
}

impl fmt::Display for RelationshipRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Friendship => "friendship",
            Self::Enmity => "enmity",
            Self::CasualRomance => "casual_romance",
            Self::Romance => "romance",
            Self::Marriage => "marriage",
        };
        f.write_str(label)
    }
}

/// Everyone holding a romantic or marital commitment in `relationships`.
pub fn committed_individuals(relationships: &[Relationship]) -> HashSet<IndividualId> {
    relationships
        .iter()
        .filter(|edge| edge.kind.is_commitment())
        .flat_map(|edge| [edge.source, edge.target])
        .collect()
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
    use crate::random::{RngSource, SequenceSource};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        date(2025, 6, 1)
    }

    fn population(size: usize) -> Vec<Individual> {
        (0..size)
            .map(|i| {
                let sex = if i % 2 == 0 { Sex::Female } else { Sex::Male };
                Individual::new(format!("P{i}"), date(1990, 1, 1), sex)
            })
            .collect()
    }

    fn always(score: i32) -> impl Fn(&Individual, &Individual, NaiveDate) -> i32 {
        move |_, _, _| score
    }

    fn edge(a: &Individual, b: &Individual, kind: RelationshipKind) -> Relationship {
        Relationship::new(a.id, b.id, kind, 60, RelationshipHistory::new(today(), today()))
    }

    /// Unordered id pairs linked by the created edges of `kind`.
    fn linked(edges: &[Relationship], kind: RelationshipKind) -> Vec<(IndividualId, IndividualId)> {
        edges
            .iter()
            .filter(|e| e.kind == kind && e.source < e.target)
            .map(|e| (e.source, e.target))
            .collect()
    }

    #[test]
    fn rule_parameters() {
        assert_eq!(RelationshipRule::Friendship.quota_divisor(), 5);
        for rule in [
            RelationshipRule::Enmity,
            RelationshipRule::CasualRomance,
            RelationshipRule::Romance,
            RelationshipRule::Marriage,
        ] {
            assert_eq!(rule.quota_divisor(), 8);
            assert_eq!(rule.requires_attraction(), rule != RelationshipRule::Enmity);
        }
        assert!(!RelationshipRule::Friendship.requires_attraction());
        assert!(RelationshipRule::Romance.is_exclusive());
        assert!(RelationshipRule::Marriage.is_exclusive());
        assert!(!RelationshipRule::CasualRomance.is_exclusive());
        assert_eq!(RelationshipRule::Marriage.kind(), RelationshipKind::Spouse);
    }

    #[test]
    fn quota_uses_integer_division() {
        assert_eq!(RelationshipRule::Marriage.quota(16), 2);
        assert_eq!(RelationshipRule::Marriage.quota(15), 1);
        assert_eq!(RelationshipRule::Marriage.quota(7), 0);
        assert_eq!(RelationshipRule::Friendship.quota(12), 2);
    }

    #[test]
    fn marriage_of_sixteen_stops_at_two_pairs() {
        let people = population(16);
        let mut source = RngSource::seeded(3);

        let edges = RelationshipRule::Marriage.generate(
            &people,
            &[],
            today(),
            &always(100),
            &mut source,
        );

        assert_eq!(edges.len(), 4);
        assert!(edges.iter().all(|e| e.kind == RelationshipKind::Spouse));
    }

    #[test]
    fn small_population_gets_nothing() {
        let people = population(7);
        let mut source = SequenceSource::exhausted();

        let edges =
            RelationshipRule::Enmity.generate(&people, &[], today(), &always(0), &mut source);

        assert!(edges.is_empty());
        assert_eq!(source.draws(), 0);
    }

    #[test]
    fn exclusive_rule_commits_new_partners() {
        // An exhausted source keeps pairs in enumeration order:
        // (P0,P1), (P0,P2), ..., (P1,P2), ..., (P2,P3), ...
        let people = population(16);
        let mut source = SequenceSource::exhausted();

        let edges = RelationshipRule::Marriage.generate(
            &people,
            &[],
            today(),
            &always(100),
            &mut source,
        );

        let couples = linked(&edges, RelationshipKind::Spouse);
        assert_eq!(couples.len(), 2);
        let mut members: Vec<IndividualId> =
            couples.iter().flat_map(|&(a, b)| [a, b]).collect();
        members.sort();
        members.dedup();
        assert_eq!(members.len(), 4);
        for id in [people[0].id, people[1].id, people[2].id, people[3].id] {
            assert!(members.contains(&id));
        }
    }

    #[test]
    fn existing_commitments_are_respected() {
        let people = population(16);
        let existing = vec![edge(&people[0], &people[5], RelationshipKind::RomanticPartner)];
        let mut source = SequenceSource::exhausted();

        let edges = RelationshipRule::Marriage.generate(
            &people,
            &existing,
            today(),
            &always(100),
            &mut source,
        );

        assert_eq!(edges.len(), 4);
        assert!(!edges.iter().any(|e| e.involves(people[0].id)));
        assert!(!edges.iter().any(|e| e.involves(people[5].id)));
    }

    #[test]
    fn non_exclusive_rule_allows_repeat_members() {
        let people = population(16);
        let mut source = SequenceSource::exhausted();

        let edges = RelationshipRule::CasualRomance.generate(
            &people,
            &[],
            today(),
            &always(100),
            &mut source,
        );

        // (P0,P1) then (P0,P2): P0 appears twice.
        assert_eq!(edges.len(), 4);
        assert_eq!(edges.iter().filter(|e| e.source == people[0].id).count(), 2);
    }

    #[test]
    fn unattracted_candidates_are_skipped() {
        let people = population(16);
        let mut source = RngSource::seeded(11);

        let edges =
            RelationshipRule::Romance.generate(&people, &[], today(), &always(39), &mut source);

        assert!(edges.is_empty());
    }

    #[test]
    fn attraction_is_checked_first_to_second() {
        let people = population(8);
        let favourite = people[0].id;
        let scorer = move |source: &Individual, _: &Individual, _: NaiveDate| {
            if source.id == favourite { 90 } else { 0 }
        };
        let mut source = SequenceSource::exhausted();

        let edges =
            RelationshipRule::Romance.generate(&people, &[], today(), &scorer, &mut source);

        assert_eq!(edges.len(), 2);
        assert!(edges[0].connects(people[0].id, people[1].id));
    }

    #[test]
    fn attraction_gating_ignored_for_friendship() {
        let people = population(10);
        let mut source = RngSource::seeded(5);

        let edges =
            RelationshipRule::Friendship.generate(&people, &[], today(), &always(0), &mut source);

        assert_eq!(edges.len(), 4);
    }

    #[test]
    fn duplicates_cost_no_quota() {
        let people = population(5);
        let existing = vec![edge(&people[0], &people[1], RelationshipKind::Friend)];
        let mut source = SequenceSource::exhausted();

        let edges = RelationshipRule::Friendship.generate(
            &people,
            &existing,
            today(),
            &always(0),
            &mut source,
        );

        assert_eq!(edges.len(), 2);
        assert!(edges[0].connects(people[0].id, people[2].id));
    }

    #[test]
    fn created_edges_are_reciprocal() {
        let people = population(24);
        let mut source = RngSource::seeded(99);

        let edges =
            RelationshipRule::Enmity.generate(&people, &[], today(), &always(0), &mut source);

        assert_eq!(edges.len(), 6);
        for pair in edges.chunks(2) {
            let (forward, reverse) = (&pair[0], &pair[1]);
            assert_eq!(forward.source, reverse.target);
            assert_eq!(forward.target, reverse.source);
            assert_eq!(forward.kind, reverse.kind);
            assert_eq!(forward.value, reverse.value);
        }
    }

    #[test]
    fn committed_set_covers_both_directions() {
        let people = population(4);
        let existing = vec![
            edge(&people[0], &people[1], RelationshipKind::Spouse),
            edge(&people[2], &people[3], RelationshipKind::Friend),
        ];

        let committed = committed_individuals(&existing);

        assert_eq!(committed.len(), 2);
        assert!(committed.contains(&people[0].id));
        assert!(committed.contains(&people[1].id));
    }
}
