//! Generator binary for Kinship.
//!
//! Wires the generation core to a seeded population and prints what it
//! produced. Logs go to stderr; the JSON report goes to stdout.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `kinship-config.yaml` (or `KINSHIP_CONFIG`)
//! 3. Spawn the seed population
//! 4. Generate social relationships, then children for couples
//! 5. Print the JSON report

mod config;
mod error;
mod report;
mod spawner;

use std::path::PathBuf;

use kinship_social::{
    AgeProximityAttraction, InheritingChildFactory, RngSource, generate_relationships,
    generate_world,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH, EngineConfig};
use crate::error::EngineError;
use crate::report::GenerationReport;

/// Application entry point for the generator.
///
/// # Errors
///
/// Returns an error if configuration, spawning, generation, or report
/// serialization fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!("kinship-engine starting");

    // 2. Load configuration.
    let config = load_config()?;
    info!(
        seed = config.world.seed,
        reference_date = %config.world.reference_date,
        population_size = config.population.size,
        genealogy_enabled = config.genealogy.enabled,
        "Configuration loaded"
    );

    // 3-4. Spawn and generate.
    let report = run(&config).await?;
    info!(
        population = report.population.len(),
        children = report.children.len(),
        relationships = report.relationships.len(),
        "Generation complete"
    );

    // 5. Print the report.
    let json = serde_json::to_string_pretty(&report).map_err(EngineError::from)?;
    println!("{json}");
    Ok(())
}

/// Spawn the population described by `config` and generate its graph.
async fn run(config: &EngineConfig) -> Result<GenerationReport, EngineError> {
    let seed = config.world.seed;
    let reference_date = config.world.reference_date;
    let mut source = RngSource::new(StdRng::seed_from_u64(seed));

    let population = spawner::spawn_population(&config.population, reference_date, &mut source)?;
    let scorer = AgeProximityAttraction;

    let (relationships, children) = if config.genealogy.enabled {
        let mut factory =
            InheritingChildFactory::new(RngSource::new(StdRng::seed_from_u64(seed.wrapping_add(1))));
        let world = generate_world(
            &population,
            Vec::new(),
            reference_date,
            &scorer,
            &config.genealogy.couple_kinds(),
            &mut factory,
            &mut source,
        )
        .await?;
        (world.relationships, world.children)
    } else {
        let relationships =
            generate_relationships(&population, Vec::new(), reference_date, &scorer, &mut source);
        (relationships, Vec::new())
    };

    Ok(GenerationReport::new(
        seed,
        reference_date,
        population,
        children,
        relationships,
    ))
}

/// Load configuration from `KINSHIP_CONFIG` or `kinship-config.yaml`.
///
/// If the file does not exist, returns default configuration.
fn load_config() -> Result<EngineConfig, EngineError> {
    let config_path = std::env::var_os(CONFIG_PATH_ENV)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    if config_path.exists() {
        let config = EngineConfig::from_file(&config_path)?;
        Ok(config)
    } else {
        info!(path = %config_path.display(), "Config file not found, using defaults");
        let mut config = EngineConfig::default();
        config.world.apply_env_overrides()?;
        Ok(config)
    }
}
