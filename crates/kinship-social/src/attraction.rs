//! Attraction scoring between two individuals.
//!
//! Romantic rules consult an [`AttractionScorer`] before pairing anyone.
//! The scorer is a collaborator: callers usually bring their own. Plain
//! closures of the right shape qualify, and [`AgeProximityAttraction`] is
//! provided for callers without a model of their own.

use chrono::NaiveDate;

use kinship_types::Individual;

/// Minimum score that lets a romantic rule pair two individuals.
pub const ATTRACTION_THRESHOLD: i32 = 40;

/// Scores how attracted `source` is to `target` on a given date.
pub trait AttractionScorer {
    /// Attraction of `source` toward `target` at `reference_date`.
    fn score_attraction(
        &self,
        source: &Individual,
        target: &Individual,
        reference_date: NaiveDate,
    ) -> i32;
}

impl<F> AttractionScorer for F
where
    F: Fn(&Individual, &Individual, NaiveDate) -> i32,
{
    fn score_attraction(
        &self,
        source: &Individual,
        target: &Individual,
        reference_date: NaiveDate,
    ) -> i32 {
        self(source, target, reference_date)
    }
}

/// Whether `source` is attracted enough to `target` for a romantic pairing.
pub fn is_attracted<A: AttractionScorer + ?Sized>(
    scorer: &A,
    source: &Individual,
    target: &Individual,
    reference_date: NaiveDate,
) -> bool {
    scorer.score_attraction(source, target, reference_date) >= ATTRACTION_THRESHOLD
}

// ---------------------------------------------------------------------------
// AgeProximityAttraction
// ---------------------------------------------------------------------------

/// Minimum age, in full years, for any attraction score above zero.
const ADULT_AGE: u32 = 18;

/// Score lost per year of age difference.
const PENALTY_PER_YEAR: i32 = 6;

/// Score of two adults born the same year.
const PEAK_SCORE: i32 = 100;

/// Attraction that falls off with age difference.
///
/// Minors score 0. Two adults score `100 - 6 * |age gap|`, floored at 0, so
/// a gap of more than ten years never clears [`ATTRACTION_THRESHOLD`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AgeProximityAttraction;

impl AttractionScorer for AgeProximityAttraction {
    fn score_attraction(
        &self,
        source: &Individual,
        target: &Individual,
        reference_date: NaiveDate,
    ) -> i32 {
        let source_age = source.age_on(reference_date);
        let target_age = target.age_on(reference_date);
        if source_age < ADULT_AGE || target_age < ADULT_AGE {
            return 0;
        }

        let gap = i32::try_from(source_age.abs_diff(target_age)).unwrap_or(i32::MAX);
        PEAK_SCORE
            .saturating_sub(gap.saturating_mul(PENALTY_PER_YEAR))
            .max(0)
    }
}
