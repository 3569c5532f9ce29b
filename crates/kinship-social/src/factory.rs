//! Reciprocal relationship creation.
//!
//! [`create_relationship`] is the only place edges are built. It either
//! returns a matched pair (`A -> B` with the requested kind, `B -> A` with
//! the reciprocal kind) or nothing, when an edge of that kind already links
//! the two. "Nothing" is an ordinary result, not an error, so rule loops
//! treat duplicates the same way as any other skipped candidate.

use chrono::{Days, NaiveDate};
use tracing::trace;

use kinship_types::{Individual, IndividualId, Relationship, RelationshipHistory, RelationshipKind};

use crate::random::RandomSource;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Furthest back, in days, a sampled interaction date may fall before the
/// reference date.
pub const HISTORY_WINDOW_DAYS: i64 = 365;

/// Value of every parent/child edge.
pub const KINSHIP_PARENT_VALUE: i64 = 50;

/// Range for kinds without a dedicated one (acquaintances and any kind
/// added after this crate was written).
const NEUTRAL_RANGE: (i64, i64) = (-20, 20);

/// Inclusive value range sampled for an edge of `kind`.
pub const fn value_range(kind: RelationshipKind) -> (i64, i64) {
    match kind {
        RelationshipKind::Friend => (30, 80),
        RelationshipKind::Enemy => (-100, -40),
        RelationshipKind::CasualRomanticPartner => (20, 70),
        RelationshipKind::RomanticPartner => (60, 100),
        RelationshipKind::Spouse => (50, 100),
        RelationshipKind::Sibling => (10, 70),
        RelationshipKind::Parent | RelationshipKind::Child => {
            (KINSHIP_PARENT_VALUE, KINSHIP_PARENT_VALUE)
        }
        RelationshipKind::Grandparent | RelationshipKind::Grandchild => (30, 80),
        _ => NEUTRAL_RANGE,
    }
}

// ---------------------------------------------------------------------------
// ReciprocalPair
// ---------------------------------------------------------------------------

/// The two directed edges of one relationship.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReciprocalPair {
    /// `a -> b`, carrying the requested kind.
    pub forward: Relationship,
    /// `b -> a`, carrying the reciprocal kind.
    pub reverse: Relationship,
}

impl ReciprocalPair {
    /// Both edges, forward first.
    pub const fn into_edges(self) -> [Relationship; 2] {
        [self.forward, self.reverse]
    }
}

impl IntoIterator for ReciprocalPair {
    type Item = Relationship;
    type IntoIter = core::array::IntoIter<Relationship, 2>;

    fn into_iter(self) -> Self::IntoIter {
        self.into_edges().into_iter()
    }
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

/// Whether `existing` already holds an edge of `kind` between `a` and `b`,
/// in either direction.
pub fn relationship_exists(
    existing: &[Relationship],
    a: IndividualId,
    b: IndividualId,
    kind: RelationshipKind,
) -> bool {
    existing
        .iter()
        .any(|edge| edge.kind == kind && edge.connects(a, b))
}

/// Create the reciprocal edges of a `kind` relationship between `a` and `b`.
///
/// Returns `None` if `existing` already links them with `kind`. Otherwise:
///
/// 1. Samples a value from [`value_range`]. Symmetric kinds share one value;
///    asymmetric kinds sample each direction from its own kind's range.
/// 2. Samples a history. For `Parent` (and its mirror `Child`) the first
///    interaction is the child's birth date and the last is the reference
///    date. Every other kind gets two offsets of up to
///    [`HISTORY_WINDOW_DAYS`] before the reference date, never earlier than
///    the younger individual's birth date.
/// 3. Emits `a -> b` with `kind` and `b -> a` with the reciprocal kind.
pub fn create_relationship<R: RandomSource + ?Sized>(
    existing: &[Relationship],
    a: &Individual,
    b: &Individual,
    kind: RelationshipKind,
    reference_date: NaiveDate,
    source: &mut R,
) -> Option<ReciprocalPair> {
    if relationship_exists(existing, a.id, b.id, kind) {
        trace!(source = %a.id, target = %b.id, %kind, "relationship already exists");
        return None;
    }

    let reciprocal = kind.reciprocal();
    let forward_value = sample_value(kind, source);
    let reverse_value = if kind.is_symmetric() {
        forward_value
    } else {
        sample_value(reciprocal, source)
    };

    let history = sample_history(a, b, kind, reference_date, source);

    Some(ReciprocalPair {
        forward: Relationship::new(a.id, b.id, kind, forward_value, history),
        reverse: Relationship::new(b.id, a.id, reciprocal, reverse_value, history),
    })
}

/// Draw a value for `kind`.
fn sample_value<R: RandomSource + ?Sized>(kind: RelationshipKind, source: &mut R) -> i64 {
    let (min, max) = value_range(kind);
    source.random_int(min, max)
}

/// Draw the interaction history of a new `a -> b` relationship.
fn sample_history<R: RandomSource + ?Sized>(
    a: &Individual,
    b: &Individual,
    kind: RelationshipKind,
    reference_date: NaiveDate,
    source: &mut R,
) -> RelationshipHistory {
    let child = match kind {
        RelationshipKind::Parent => Some(b),
        RelationshipKind::Child => Some(a),
        _ => None,
    };
    if let Some(child) = child {
        return RelationshipHistory::new(child.birth_date, reference_date.max(child.birth_date));
    }

    let first_offset = source.random_int(0, HISTORY_WINDOW_DAYS);
    let last_offset = source.random_int(0, HISTORY_WINDOW_DAYS);
    let first = days_before(reference_date, first_offset.max(last_offset));
    let last = days_before(reference_date, first_offset.min(last_offset));

    let youngest_birth = a.birth_date.max(b.birth_date);
    let first = first.max(youngest_birth);
    let last = last.max(first);

    RelationshipHistory::new(first, last)
}

/// `date` moved back by `days`, saturating at `date` on overflow.
fn days_before(date: NaiveDate, days: i64) -> NaiveDate {
    let days = u64::try_from(days).unwrap_or(0);
    date.checked_sub_days(Days::new(days)).unwrap_or(date)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use kinship_types::{RELATIONSHIP_VALUE_MAX, RELATIONSHIP_VALUE_MIN, Sex};

    use super::*;
    use crate::random::{RngSource, SequenceSource};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn adult(name: &str, sex: Sex) -> Individual {
        Individual::new(name, date(1990, 3, 10), sex)
    }

    #[test]
    fn creates_matched_symmetric_pair() {
        let a = adult("Ash", Sex::Male);
        let b = adult("Brook", Sex::Female);
        let mut source = SequenceSource::new([55, 10, 200], []);

        let pair = create_relationship(
            &[],
            &a,
            &b,
            RelationshipKind::Friend,
            date(2025, 6, 1),
            &mut source,
        )
        .unwrap();

        assert_eq!((pair.forward.source, pair.forward.target), (a.id, b.id));
        assert_eq!((pair.reverse.source, pair.reverse.target), (b.id, a.id));
        assert_eq!(pair.forward.kind, RelationshipKind::Friend);
        assert_eq!(pair.reverse.kind, RelationshipKind::Friend);
        assert_eq!(pair.forward.value, 55);
        assert_eq!(pair.reverse.value, 55);
        // Offsets 10 and 200 days: the larger one is the first interaction.
        assert_eq!(pair.forward.history.first_interaction(), date(2024, 11, 13));
        assert_eq!(pair.forward.history.last_interaction(), date(2025, 5, 22));
        assert_eq!(pair.forward.history, pair.reverse.history);
    }

    #[test]
    fn duplicate_in_either_direction_yields_nothing() {
        let a = adult("Ash", Sex::Male);
        let b = adult("Brook", Sex::Female);
        let today = date(2025, 6, 1);
        let mut source = RngSource::seeded(4);

        let existing: Vec<Relationship> =
            create_relationship(&[], &a, &b, RelationshipKind::Enemy, today, &mut source)
                .unwrap()
                .into_iter()
                .collect();

        for _ in 0..2 {
            assert!(
                create_relationship(&existing, &a, &b, RelationshipKind::Enemy, today, &mut source)
                    .is_none()
            );
            assert!(
                create_relationship(&existing, &b, &a, RelationshipKind::Enemy, today, &mut source)
                    .is_none()
            );
        }
        // A different kind between the same two is still allowed.
        assert!(
            create_relationship(&existing, &a, &b, RelationshipKind::Friend, today, &mut source)
                .is_some()
        );
    }

    #[test]
    fn duplicate_check_draws_nothing() {
        let a = adult("Ash", Sex::Male);
        let b = adult("Brook", Sex::Female);
        let today = date(2025, 6, 1);
        let existing: Vec<Relationship> = create_relationship(
            &[],
            &a,
            &b,
            RelationshipKind::Spouse,
            today,
            &mut RngSource::seeded(1),
        )
        .unwrap()
        .into_iter()
        .collect();

        let mut source = SequenceSource::exhausted();
        assert!(
            create_relationship(&existing, &a, &b, RelationshipKind::Spouse, today, &mut source)
                .is_none()
        );
        assert_eq!(source.draws(), 0);
    }

    #[test]
    fn parent_history_starts_at_birth() {
        let parent = adult("Cedar", Sex::Female);
        let child = Individual::new("Dawn", date(2015, 8, 20), Sex::Male);
        let today = date(2025, 6, 1);
        let mut source = RngSource::seeded(8);

        let pair =
            create_relationship(&[], &parent, &child, RelationshipKind::Parent, today, &mut source)
                .unwrap();

        assert_eq!(pair.forward.kind, RelationshipKind::Parent);
        assert_eq!(pair.reverse.kind, RelationshipKind::Child);
        assert_eq!(pair.forward.source, parent.id);
        assert_eq!(pair.reverse.source, child.id);
        assert_eq!(pair.forward.value, 50);
        assert_eq!(pair.reverse.value, 50);
        assert_eq!(pair.forward.history.first_interaction(), child.birth_date);
        assert_eq!(pair.forward.history.last_interaction(), today);
    }

    #[test]
    fn child_kind_mirrors_parent_history() {
        let parent = adult("Cedar", Sex::Female);
        let child = Individual::new("Dawn", date(2015, 8, 20), Sex::Male);
        let today = date(2025, 6, 1);

        let pair = create_relationship(
            &[],
            &child,
            &parent,
            RelationshipKind::Child,
            today,
            &mut SequenceSource::exhausted(),
        )
        .unwrap();

        assert_eq!(pair.reverse.kind, RelationshipKind::Parent);
        assert_eq!(pair.forward.history.first_interaction(), child.birth_date);
    }

    #[test]
    fn asymmetric_kinds_sample_each_direction() {
        let elder = Individual::new("Elm", date(1950, 1, 1), Sex::Male);
        let young = Individual::new("Fern", date(2010, 1, 1), Sex::Female);
        let mut source = SequenceSource::new([35, 75, 0, 0], []);

        let pair = create_relationship(
            &[],
            &elder,
            &young,
            RelationshipKind::Grandparent,
            date(2025, 6, 1),
            &mut source,
        )
        .unwrap();

        assert_eq!(pair.forward.value, 35);
        assert_eq!(pair.reverse.value, 75);
        assert_eq!(pair.reverse.kind, RelationshipKind::Grandchild);
    }

    #[test]
    fn history_never_predates_younger_birth() {
        let elder = adult("Gale", Sex::Male);
        let newborn = Individual::new("Heath", date(2025, 5, 1), Sex::Female);
        let today = date(2025, 6, 1);
        let mut source = SequenceSource::new([20, 300, 300], []);

        let pair =
            create_relationship(&[], &elder, &newborn, RelationshipKind::Sibling, today, &mut source)
                .unwrap();

        assert_eq!(pair.forward.history.first_interaction(), newborn.birth_date);
        assert_eq!(pair.forward.history.last_interaction(), newborn.birth_date);
    }

    #[test]
    fn values_and_dates_stay_in_bounds() {
        let today = date(2025, 6, 1);
        let mut source = RngSource::seeded(2024);
        for kind in RelationshipKind::ALL {
            for _ in 0..50 {
                let a = adult("I", Sex::Male);
                let b = adult("J", Sex::Female);
                let pair = create_relationship(&[], &a, &b, kind, today, &mut source).unwrap();
                for edge in pair {
                    assert!(edge.value >= RELATIONSHIP_VALUE_MIN);
                    assert!(edge.value <= RELATIONSHIP_VALUE_MAX);
                    assert!(
                        edge.history.first_interaction() <= edge.history.last_interaction()
                    );
                }
            }
        }
    }

    #[test]
    fn enemies_are_negative_and_spouses_positive() {
        let today = date(2025, 6, 1);
        let mut source = RngSource::seeded(77);
        for _ in 0..100 {
            let a = adult("K", Sex::Male);
            let b = adult("L", Sex::Female);
            let enemy =
                create_relationship(&[], &a, &b, RelationshipKind::Enemy, today, &mut source)
                    .unwrap();
            let spouse =
                create_relationship(&[], &a, &b, RelationshipKind::Spouse, today, &mut source)
                    .unwrap();
            assert!(enemy.forward.value <= -40);
            assert!(spouse.forward.value >= 50);
        }
    }

    #[test]
    fn acquaintances_use_neutral_range() {
        assert_eq!(value_range(RelationshipKind::Acquaintance), (-20, 20));
    }
}
