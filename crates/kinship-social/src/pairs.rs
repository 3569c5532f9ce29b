//! Unique unordered pairings over a population.
//!
//! Every rule walks its candidates in the order produced here: all
//! `n·(n-1)/2` combinations, optionally filtered, then reordered by an
//! independent random sort key per pair.

use rust_decimal::Decimal;

use kinship_types::{Individual, IndividualId, Sex};

use crate::random::RandomSource;

// ---------------------------------------------------------------------------
// Pair
// ---------------------------------------------------------------------------

/// An unordered pair of distinct individuals.
///
/// Pairs produced by selection keep population order, so `first` is the
/// earlier member. Attraction is scored from `first` toward `second`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pair<'a> {
    /// First member.
    pub first: &'a Individual,
    /// Second member.
    pub second: &'a Individual,
}

impl<'a> Pair<'a> {
    /// Build a pair from two individuals.
    pub const fn new(first: &'a Individual, second: &'a Individual) -> Self {
        Self { first, second }
    }

    /// Identifiers of both members, in pair order.
    pub const fn ids(&self) -> (IndividualId, IndividualId) {
        (self.first.id, self.second.id)
    }

    /// Whether the members differ in biological sex.
    pub fn is_opposite_sex(&self) -> bool {
        self.first.sex != self.second.sex
    }

    /// The member of the given sex, if exactly one member has it.
    pub fn member_of_sex(&self, sex: Sex) -> Option<&'a Individual> {
        match (self.first.sex == sex, self.second.sex == sex) {
            (true, false) => Some(self.first),
            (false, true) => Some(self.second),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Enumeration
// ---------------------------------------------------------------------------

/// Every unordered pair of distinct positions in `items`, in index order.
///
/// Yields `n·(n-1)/2` pairs; no self-pairs, no repeats.
pub fn unordered_pairs<T>(items: &[T]) -> impl Iterator<Item = (&T, &T)> {
    items.iter().enumerate().flat_map(move |(index, first)| {
        items
            .iter()
            .skip(index.saturating_add(1))
            .map(move |second| (first, second))
    })
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// All unique pairs of `population`, randomly reordered.
pub fn select_pairs<'a, R>(population: &'a [Individual], source: &mut R) -> Vec<Pair<'a>>
where
    R: RandomSource + ?Sized,
{
    select_pairs_where(population, source, |_| true)
}

/// All unique pairs of `population` accepted by `predicate`, randomly
/// reordered.
///
/// The predicate runs before any randomness. When at most one pair
/// survives, the random source is not consulted at all. Otherwise each
/// surviving pair draws one sort key from `source` and the pairs are
/// stably sorted by key, so a scripted source reproduces the same order.
/// Keys are drawn at a finite resolution; pairs with equal keys keep their
/// enumeration order relative to each other.
pub fn select_pairs_where<'a, R, P>(
    population: &'a [Individual],
    source: &mut R,
    mut predicate: P,
) -> Vec<Pair<'a>>
where
    R: RandomSource + ?Sized,
    P: FnMut(&Pair<'a>) -> bool,
{
    let candidates: Vec<Pair<'a>> = unordered_pairs(population)
        .map(|(first, second)| Pair::new(first, second))
        .filter(|pair| predicate(pair))
        .collect();

    if candidates.len() <= 1 {
        return candidates;
    }

    let mut keyed: Vec<(Decimal, Pair<'a>)> = candidates
        .into_iter()
        .map(|pair| (source.random_real(), pair))
        .collect();
    keyed.sort_by(|a, b| a.0.cmp(&b.0));

    keyed.into_iter().map(|(_, pair)| pair).collect()
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
    use std::collections::BTreeSet;

    use chrono::NaiveDate;

    use super::*;
    use crate::random::{RngSource, SequenceSource};

    fn population(n: usize) -> Vec<Individual> {
        let born = NaiveDate::from_ymd_opt(1990, 1, 1).unwrap();
        (0..n)
            .map(|i| {
                let sex = if i % 2 == 0 { Sex::Female } else { Sex::Male };
                Individual::new(format!("P{i}"), born, sex)
            })
            .collect()
    }

    fn key(pair: &Pair<'_>) -> (IndividualId, IndividualId) {
        let (a, b) = pair.ids();
        (a.min(b), a.max(b))
    }

    #[test]
    fn covers_every_combination_once() {
        for n in [0_usize, 1, 2, 3, 7, 16] {
            let people = population(n);
            let mut source = RngSource::seeded(5);
            let pairs = select_pairs(&people, &mut source);

            assert_eq!(pairs.len(), n * n.saturating_sub(1) / 2, "n = {n}");
            let unique: BTreeSet<_> = pairs.iter().map(key).collect();
            assert_eq!(unique.len(), pairs.len(), "no duplicates for n = {n}");
            assert!(pairs.iter().all(|p| p.first.id != p.second.id));
        }
    }

    #[test]
    fn empty_and_singleton_never_touch_the_source() {
        let mut source = SequenceSource::exhausted();
        assert!(select_pairs(&population(0), &mut source).is_empty());
        assert_eq!(select_pairs(&population(2), &mut source).len(), 1);
        assert_eq!(source.draws(), 0);
    }

    #[test]
    fn predicate_short_circuits_to_single_pair() {
        let people = population(6);
        let (a, b) = (people[0].id, people[3].id);
        let mut source = SequenceSource::exhausted();

        let pairs = select_pairs_where(&people, &mut source, |p| p.ids() == (a, b));

        assert_eq!(pairs.len(), 1);
        assert_eq!(source.draws(), 0);
    }

    #[test]
    fn predicate_rejecting_everything_returns_empty() {
        let people = population(5);
        let mut source = SequenceSource::exhausted();
        assert!(select_pairs_where(&people, &mut source, |_| false).is_empty());
        assert_eq!(source.draws(), 0);
    }

    #[test]
    fn one_key_per_surviving_pair() {
        let people = population(4);
        let mut source = SequenceSource::exhausted();
        let pairs = select_pairs_where(&people, &mut source, Pair::is_opposite_sex);
        assert_eq!(pairs.len(), 4);
        assert_eq!(source.draws(), 4);
    }

    #[test]
    fn scripted_keys_decide_order() {
        let people = population(3);
        // Index order is (0,1), (0,2), (1,2); descending keys reverse it.
        let keys = [Decimal::new(9, 1), Decimal::new(5, 1), Decimal::new(1, 1)];
        let mut source = SequenceSource::new([], keys);

        let pairs = select_pairs(&people, &mut source);
        let order: Vec<_> = pairs.iter().map(Pair::ids).collect();
        assert_eq!(
            order,
            vec![
                (people[1].id, people[2].id),
                (people[0].id, people[2].id),
                (people[0].id, people[1].id),
            ]
        );
    }

    #[test]
    fn equal_keys_keep_enumeration_order() {
        let people = population(3);
        let keys = [Decimal::new(5, 1), Decimal::new(1, 1), Decimal::new(5, 1)];
        let mut source = SequenceSource::new([], keys);

        let order: Vec<_> = select_pairs(&people, &mut source)
            .iter()
            .map(Pair::ids)
            .collect();

        assert_eq!(
            order,
            vec![
                (people[0].id, people[2].id),
                (people[0].id, people[1].id),
                (people[1].id, people[2].id),
            ]
        );
    }

    #[test]
    fn seeded_selection_is_reproducible() {
        let people = population(10);
        let first: Vec<_> = select_pairs(&people, &mut RngSource::seeded(99))
            .iter()
            .map(Pair::ids)
            .collect();
        let second: Vec<_> = select_pairs(&people, &mut RngSource::seeded(99))
            .iter()
            .map(Pair::ids)
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn member_of_sex_requires_mixed_pair() {
        let people = population(3);
        let mixed = Pair::new(&people[0], &people[1]);
        let same = Pair::new(&people[0], &people[2]);

        assert_eq!(mixed.member_of_sex(Sex::Female).map(|p| p.id), Some(people[0].id));
        assert_eq!(mixed.member_of_sex(Sex::Male).map(|p| p.id), Some(people[1].id));
        assert!(same.member_of_sex(Sex::Male).is_none());
        assert!(!same.is_opposite_sex());
    }
}
