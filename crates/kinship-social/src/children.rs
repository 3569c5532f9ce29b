//! Default child creation: birth date, sex, inherited traits, and body.

use std::collections::BTreeSet;

use chrono::{Datelike, Months, NaiveDate};

use kinship_types::{Individual, Sex};

use crate::error::ChildError;
use crate::genealogy::ChildFactory;
use crate::random::{RandomSource, random_id};

/// Youngest age, in years, at which a mother gives birth.
pub const MIN_CONCEPTION_AGE_YEARS: u32 = 18;

/// Oldest age, in years, at which a mother gives birth.
pub const MAX_CONCEPTION_AGE_YEARS: u32 = 39;

/// Months in a year, for age-to-date arithmetic.
const MONTHS_PER_YEAR: i64 = 12;

/// Sample a child's birth date from the mother's age at birth.
///
/// The age is drawn from `[18, min(39, reference_year - mother_birth_year)]`
/// whole years and added to the mother's birth date. A birth date that would
/// land after `reference_date` is pulled back to it.
pub fn child_birth_date<R: RandomSource + ?Sized>(
    mother: &Individual,
    reference_date: NaiveDate,
    source: &mut R,
) -> Result<NaiveDate, ChildError> {
    let years_available =
        i64::from(reference_date.year()).saturating_sub(i64::from(mother.birth_date.year()));
    let minimum = i64::from(MIN_CONCEPTION_AGE_YEARS);
    if years_available < minimum {
        return Err(ChildError::MotherTooYoung {
            mother: mother.id,
            age_years: mother.age_on(reference_date),
            minimum_years: MIN_CONCEPTION_AGE_YEARS,
            reference_date,
        });
    }

    let maximum = i64::from(MAX_CONCEPTION_AGE_YEARS).min(years_available);
    let age_years = source.random_int(minimum, maximum);
    let months = u32::try_from(age_years.saturating_mul(MONTHS_PER_YEAR)).map_err(|_err| {
        ChildError::DateOutOfRange {
            context: format!("mother age of {age_years} years"),
        }
    })?;

    let born = mother
        .birth_date
        .checked_add_months(Months::new(months))
        .ok_or_else(|| ChildError::DateOutOfRange {
            context: format!("{} plus {age_years} years", mother.birth_date),
        })?;
    Ok(born.min(reference_date))
}

/// Display name of a newborn.
pub fn generate_child_name(mother: &str, father: &str) -> String {
    format!("Child of {mother} and {father}")
}

/// [`ChildFactory`] that builds children from their parents.
///
/// Every child:
/// - is born per [`child_birth_date`];
/// - is male or female with equal odds;
/// - keeps each trait of either parent with probability one half;
/// - gets freshly sampled body attributes;
/// - sits one generation below the older-generation parent.
#[derive(Debug, Clone)]
pub struct InheritingChildFactory<R> {
    source: R,
}

impl<R: RandomSource> InheritingChildFactory<R> {
    /// Create a factory drawing from `source`.
    pub const fn new(source: R) -> Self {
        Self { source }
    }

    /// Build the child synchronously.
    pub fn build_child(
        &mut self,
        mother: &Individual,
        father: &Individual,
        reference_date: NaiveDate,
    ) -> Result<Individual, ChildError> {
        if mother.sex != Sex::Female || father.sex != Sex::Male {
            return Err(ChildError::NotAnOppositeSexCouple {
                first: mother.id,
                second: father.id,
            });
        }

        let birth_date = child_birth_date(mother, reference_date, &mut self.source)?;
        let sex = if self.source.random_int(0, 1) == 0 {
            Sex::Male
        } else {
            Sex::Female
        };
        let traits: BTreeSet<String> = mother
            .traits
            .iter()
            .chain(&father.traits)
            .filter(|_| self.source.random_int(0, 1) == 1)
            .cloned()
            .collect();
        let body = self.source.body_attributes(sex);
        let id = random_id(&mut self.source);

        Ok(Individual {
            id,
            name: generate_child_name(&mother.name, &father.name),
            birth_date,
            sex,
            traits,
            body: Some(body),
            parent_a: Some(mother.id),
            parent_b: Some(father.id),
            generation: mother.generation.max(father.generation).saturating_add(1),
        })
    }
}

impl<R: RandomSource> ChildFactory for InheritingChildFactory<R> {
    type Error = ChildError;

    fn create_child(
        &mut self,
        mother: &Individual,
        father: &Individual,
        reference_date: NaiveDate,
    ) -> impl Future<Output = Result<Individual, ChildError>> {
        std::future::ready(self.build_child(mother, father, reference_date))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::random::{RngSource, SequenceSource};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn couple() -> (Individual, Individual) {
        let mother = Individual::new("Wren", date(1980, 1, 1), Sex::Female)
            .with_traits(["curious", "patient"]);
        let father = Individual {
            generation: 2,
            ..Individual::new("Rowan", date(1978, 5, 5), Sex::Male).with_traits(["stubborn"])
        };
        (mother, father)
    }

    #[test]
    fn birth_date_window_for_1980_mother() {
        let (mother, _) = couple();
        let today = date(2025, 6, 1);

        let earliest =
            child_birth_date(&mother, today, &mut SequenceSource::new([0], [])).unwrap();
        let latest =
            child_birth_date(&mother, today, &mut SequenceSource::new([i64::MAX], [])).unwrap();

        assert_eq!(earliest, date(1998, 1, 1));
        assert_eq!(latest, date(2019, 1, 1));

        let mut source = RngSource::seeded(31);
        for _ in 0..200 {
            let born = child_birth_date(&mother, today, &mut source).unwrap();
            assert!(born >= earliest && born <= latest);
        }
    }

    #[test]
    fn young_mother_caps_the_age_range() {
        let mother = Individual::new("Sage", date(2000, 3, 1), Sex::Female);
        let today = date(2025, 6, 1);

        let latest =
            child_birth_date(&mother, today, &mut SequenceSource::new([i64::MAX], [])).unwrap();

        assert_eq!(latest, date(2025, 3, 1));
    }

    #[test]
    fn late_birthday_is_pulled_back_to_reference_date() {
        let mother = Individual::new("Vale", date(2000, 11, 20), Sex::Female);
        let today = date(2025, 6, 1);

        let latest =
            child_birth_date(&mother, today, &mut SequenceSource::new([i64::MAX], [])).unwrap();

        assert_eq!(latest, today);
    }

    #[test]
    fn too_young_mother_is_an_error() {
        let mother = Individual::new("Lark", date(2010, 1, 1), Sex::Female);
        let today = date(2025, 6, 1);
        let mut source = SequenceSource::exhausted();

        let err = child_birth_date(&mother, today, &mut source).unwrap_err();

        assert!(matches!(
            err,
            ChildError::MotherTooYoung { age_years: 15, minimum_years: 18, .. }
        ));
        assert_eq!(source.draws(), 0);
    }

    #[test]
    fn child_inherits_from_parents() {
        let (mother, father) = couple();
        // age, sex, three trait coins, six body draws, two id draws
        let mut factory = InheritingChildFactory::new(SequenceSource::new(
            [20, 1, 1, 0, 1, 0, 0, 0, 0, 0, 0, 7, 9],
            [],
        ));

        let child = factory.build_child(&mother, &father, date(2025, 6, 1)).unwrap();

        assert_eq!(child.birth_date, date(2000, 1, 1));
        assert_eq!(child.sex, Sex::Female);
        let traits: Vec<&str> = child.traits.iter().map(String::as_str).collect();
        assert_eq!(traits, ["curious", "stubborn"]);
        assert_eq!(child.generation, 3);
        assert_eq!(child.parent_a, Some(mother.id));
        assert_eq!(child.parent_b, Some(father.id));
        assert_eq!(child.name, "Child of Wren and Rowan");
        assert!(child.body.is_some());
    }

    #[test]
    fn swapped_couple_is_rejected() {
        let (mother, father) = couple();
        let mut factory = InheritingChildFactory::new(RngSource::seeded(1));

        let err = factory.build_child(&father, &mother, date(2025, 6, 1)).unwrap_err();

        assert_eq!(
            err,
            ChildError::NotAnOppositeSexCouple {
                first: father.id,
                second: mother.id,
            }
        );
    }

    #[test]
    fn seeded_factories_agree() {
        let (mother, father) = couple();
        let today = date(2025, 6, 1);
        let mut a = InheritingChildFactory::new(RngSource::seeded(8));
        let mut b = InheritingChildFactory::new(RngSource::seeded(8));

        let first = a.build_child(&mother, &father, today).unwrap();
        let second = b.build_child(&mother, &father, today).unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn create_child_resolves_to_built_child() {
        let (mother, father) = couple();
        let mut factory = InheritingChildFactory::new(RngSource::seeded(12));

        let child = factory
            .create_child(&mother, &father, date(2025, 6, 1))
            .await
            .unwrap();

        assert_eq!(child.generation, 3);
        assert!(child.birth_date <= date(2025, 6, 1));
    }
}
