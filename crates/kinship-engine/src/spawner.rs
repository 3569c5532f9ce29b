//! Seed population spawner.
//!
//! Creates the individuals a run starts from: unique names, a guaranteed
//! mix of sexes, birth dates spread across the configured age range,
//! distinct traits from the pool, and sampled body attributes. Every draw
//! goes through the run's [`RandomSource`], so a seed fully determines the
//! population, identifiers included.

use chrono::{Days, Months, NaiveDate};
use tracing::{debug, info};

use kinship_social::{RandomSource, random_id};
use kinship_types::{Individual, Sex};

use crate::config::PopulationConfig;
use crate::error::EngineError;

/// Latest day-of-year offset subtracted from a birthday, keeping sampled
/// ages whole.
const MAX_DAY_OFFSET: i64 = 364;

// -----------------------------------------------------------------------
// Name pool
// -----------------------------------------------------------------------

/// Built-in pool of names. The spawner picks without replacement from this
/// list to ensure uniqueness.
const NAME_POOL: &[&str] = &[
    "Alder", "Birch", "Cedar", "Dusk", "Ember", "Fern", "Grove", "Haze", "Iris", "Juniper",
    "Kestrel", "Lark", "Moss", "Nettle", "Oak", "Pine", "Quill", "Reed", "Sage", "Thorn",
    "Umber", "Vale", "Wren", "Yarrow", "Zephyr", "Ash", "Brook", "Clay", "Dawn", "Elm", "Flint",
    "Gale", "Heath", "Ivy", "Jay", "Kale", "Lichen", "Maple", "Nyx", "Onyx", "Pebble", "Quartz",
    "Raven", "Sable", "Terra", "Urchin", "Vole", "Willow", "Xylem", "Yew",
];

// -----------------------------------------------------------------------
// Spawning
// -----------------------------------------------------------------------

/// Spawn the seed population described by `config`.
///
/// Ages are whole years in `[min_age_years, max_age_years]` on
/// `reference_date`.
///
/// # Errors
///
/// Returns [`EngineError::Spawner`] if the name pool is smaller than the
/// requested population, or a birth date cannot be represented.
pub fn spawn_population<R: RandomSource + ?Sized>(
    config: &PopulationConfig,
    reference_date: NaiveDate,
    source: &mut R,
) -> Result<Vec<Individual>, EngineError> {
    let size = usize::try_from(config.size).map_err(|_conversion_err| EngineError::Spawner {
        message: format!("population size {} exceeds usize range", config.size),
    })?;
    let trait_count = usize::try_from(config.traits_per_individual).map_err(|_conversion_err| {
        EngineError::Spawner {
            message: format!("trait count {} exceeds usize range", config.traits_per_individual),
        }
    })?;

    let names = sample_without_replacement(NAME_POOL, size, source).ok_or_else(|| {
        EngineError::Spawner {
            message: format!(
                "requested {size} individuals but name pool only has {} entries",
                NAME_POOL.len()
            ),
        }
    })?;
    let sexes = assign_sexes(source, size);

    let mut population = Vec::with_capacity(size);
    for (name, sex) in names.into_iter().zip(sexes) {
        let birth_date = sample_birth_date(config, reference_date, source)?;
        let traits = sample_without_replacement(&config.trait_pool, trait_count, source)
            .ok_or_else(|| EngineError::Spawner {
                message: format!(
                    "requested {trait_count} traits but pool only has {}",
                    config.trait_pool.len()
                ),
            })?;
        let body = source.body_attributes(sex);
        let id = random_id(source);

        let individual = Individual::new(*name, birth_date, sex)
            .with_id(id)
            .with_traits(traits.into_iter().cloned())
            .with_body(body);

        debug!(
            id = %individual.id,
            name = %individual.name,
            sex = %individual.sex,
            birth_date = %individual.birth_date,
            "Spawned individual"
        );
        population.push(individual);
    }

    info!(size = population.len(), "Seed population spawned");
    Ok(population)
}

/// Birth date of someone aged a sampled number of whole years on
/// `reference_date`.
fn sample_birth_date<R: RandomSource + ?Sized>(
    config: &PopulationConfig,
    reference_date: NaiveDate,
    source: &mut R,
) -> Result<NaiveDate, EngineError> {
    let age_years = source.random_int(
        i64::from(config.min_age_years),
        i64::from(config.max_age_years),
    );
    let day_offset = source.random_int(0, MAX_DAY_OFFSET);

    let months = u32::try_from(age_years.saturating_mul(12)).map_err(|_conversion_err| {
        EngineError::Spawner {
            message: format!("age of {age_years} years is out of range"),
        }
    })?;
    let days = u64::try_from(day_offset).unwrap_or(0);

    reference_date
        .checked_sub_months(Months::new(months))
        .and_then(|date| date.checked_sub_days(Days::new(days)))
        .ok_or_else(|| EngineError::Spawner {
            message: format!("birth date {age_years} years before {reference_date} is out of range"),
        })
}

/// Pick `count` distinct entries of `pool` with a partial Fisher-Yates
/// shuffle. `None` if the pool is too small.
fn sample_without_replacement<'a, T, R>(
    pool: &'a [T],
    count: usize,
    source: &mut R,
) -> Option<Vec<&'a T>>
where
    R: RandomSource + ?Sized,
{
    if count > pool.len() {
        return None;
    }
    if count == 0 {
        return Some(Vec::new());
    }
    let last = i64::try_from(pool.len()).ok()?.checked_sub(1)?;

    let mut indices: Vec<usize> = (0..pool.len()).collect();
    for i in 0..count {
        let lower = i64::try_from(i).ok()?;
        let j = usize::try_from(source.random_int(lower, last)).ok()?;
        indices.swap(i, j);
    }

    indices
        .iter()
        .take(count)
        .map(|&index| pool.get(index))
        .collect()
}

/// Assign sexes to the seed population.
///
/// When `count >= 2`, the first two individuals are one male and one
/// female (in random order), so couples are possible from the start. The
/// rest are random 50/50.
fn assign_sexes<R: RandomSource + ?Sized>(source: &mut R, count: usize) -> Vec<Sex> {
    let mut sexes: Vec<Sex> = (0..count).map(|_| random_sex(source)).collect();
    if let [first, second, ..] = sexes.as_mut_slice() {
        *second = first.opposite();
    }
    sexes
}

fn random_sex<R: RandomSource + ?Sized>(source: &mut R) -> Sex {
    if source.random_int(0, 1) == 0 {
        Sex::Male
    } else {
        Sex::Female
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::collections::BTreeSet;

    use kinship_social::{RngSource, SequenceSource};

    use super::*;

    fn reference_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn config(size: u32) -> PopulationConfig {
        PopulationConfig {
            size,
            ..PopulationConfig::default()
        }
    }

    #[test]
    fn spawns_correct_count() {
        let population =
            spawn_population(&config(12), reference_date(), &mut RngSource::seeded(1)).unwrap();
        assert_eq!(population.len(), 12);
    }

    #[test]
    fn all_unique_names_and_ids() {
        let population =
            spawn_population(&config(50), reference_date(), &mut RngSource::seeded(2)).unwrap();

        let names: BTreeSet<&String> = population.iter().map(|p| &p.name).collect();
        let ids: BTreeSet<_> = population.iter().map(|p| p.id).collect();
        assert_eq!(names.len(), 50, "all names must be unique");
        assert_eq!(ids.len(), 50, "all ids must be unique");
    }

    #[test]
    fn ages_stay_in_configured_range() {
        let config = PopulationConfig {
            size: 40,
            min_age_years: 25,
            max_age_years: 30,
            ..PopulationConfig::default()
        };
        let population =
            spawn_population(&config, reference_date(), &mut RngSource::seeded(3)).unwrap();

        for individual in &population {
            let age = individual.age_on(reference_date());
            assert!((25..=30).contains(&age), "age {age} out of range");
        }
    }

    #[test]
    fn traits_are_distinct_pool_members() {
        let population =
            spawn_population(&config(20), reference_date(), &mut RngSource::seeded(4)).unwrap();
        let pool = PopulationConfig::default().trait_pool;

        for individual in &population {
            assert_eq!(individual.traits.len(), 3);
            assert!(individual.traits.iter().all(|t| pool.contains(t)));
            assert!(individual.body.is_some());
        }
    }

    #[test]
    fn first_two_have_opposite_sexes() {
        for seed in 0..20 {
            let population =
                spawn_population(&config(2), reference_date(), &mut RngSource::seeded(seed))
                    .unwrap();
            assert_ne!(population[0].sex, population[1].sex);
        }
    }

    #[test]
    fn same_seed_same_population() {
        let a = spawn_population(&config(24), reference_date(), &mut RngSource::seeded(9)).unwrap();
        let b = spawn_population(&config(24), reference_date(), &mut RngSource::seeded(9)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn oversized_population_is_rejected() {
        let err = spawn_population(&config(51), reference_date(), &mut RngSource::seeded(1))
            .unwrap_err();
        assert!(matches!(err, EngineError::Spawner { .. }));
    }

    #[test]
    fn empty_population_is_fine() {
        let mut source = SequenceSource::exhausted();
        let population = spawn_population(&config(0), reference_date(), &mut source).unwrap();
        assert!(population.is_empty());
        assert_eq!(source.draws(), 0);
    }

    #[test]
    fn partial_shuffle_picks_distinct_entries() {
        let pool = ["a", "b", "c", "d"];
        let picked =
            sample_without_replacement(&pool, 4, &mut RngSource::seeded(6)).unwrap();
        let unique: BTreeSet<&&str> = picked.iter().copied().collect();
        assert_eq!(unique.len(), 4);
        assert!(sample_without_replacement(&pool, 5, &mut RngSource::seeded(6)).is_none());
    }
}
