//! Configuration loading and typed config structures for the engine.
//!
//! The configuration lives in `kinship-config.yaml` in the working
//! directory, or at the path named by `KINSHIP_CONFIG`. Every field has a
//! default, so a missing file or section runs the engine with defaults.
//! The generation core itself takes no configuration; everything here
//! shapes the population it is handed.

use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;

use kinship_types::RelationshipKind;

/// Environment variable naming the config file to load.
pub const CONFIG_PATH_ENV: &str = "KINSHIP_CONFIG";

/// Environment variable overriding `world.seed`.
pub const SEED_ENV: &str = "KINSHIP_SEED";

/// Config file read when [`CONFIG_PATH_ENV`] is unset.
pub const DEFAULT_CONFIG_PATH: &str = "kinship-config.yaml";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but makes no sense.
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level engine configuration.
///
/// Mirrors the structure of `kinship-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EngineConfig {
    /// Seed and reference date.
    #[serde(default)]
    pub world: WorldConfig,

    /// Shape of the seed population.
    #[serde(default)]
    pub population: PopulationConfig,

    /// Second-generation settings.
    #[serde(default)]
    pub genealogy: GenealogyConfig,
}

impl EngineConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `KINSHIP_SEED`, when set to an integer, overrides `world.seed`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.world.apply_env_overrides()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.population.validate()?;
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Seed for every random draw of a run.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Date the population's ages and relationship histories are relative to.
    #[serde(default = "default_reference_date")]
    pub reference_date: NaiveDate,
}

impl WorldConfig {
    /// Apply `KINSHIP_SEED` when it is set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the variable is not a `u64`.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(val) = std::env::var(SEED_ENV) {
            self.seed = val.trim().parse().map_err(|err| ConfigError::Invalid {
                field: "world.seed",
                reason: format!("{SEED_ENV}={val}: {err}"),
            })?;
        }
        Ok(())
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            reference_date: default_reference_date(),
        }
    }
}

const fn default_seed() -> u64 {
    42
}

fn default_reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Population
// ---------------------------------------------------------------------------

/// Seed population parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PopulationConfig {
    /// Number of individuals to spawn.
    #[serde(default = "default_size")]
    pub size: u32,

    /// Youngest age, in years, on the reference date.
    #[serde(default = "default_min_age_years")]
    pub min_age_years: u32,

    /// Oldest age, in years, on the reference date.
    #[serde(default = "default_max_age_years")]
    pub max_age_years: u32,

    /// Traits individuals draw from.
    #[serde(default = "default_trait_pool")]
    pub trait_pool: Vec<String>,

    /// Distinct traits drawn per individual.
    #[serde(default = "default_traits_per_individual")]
    pub traits_per_individual: u32,
}

impl PopulationConfig {
    /// Reject ranges the spawner cannot satisfy.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_age_years > self.max_age_years {
            return Err(ConfigError::Invalid {
                field: "population.min_age_years",
                reason: format!(
                    "{} exceeds max_age_years {}",
                    self.min_age_years, self.max_age_years
                ),
            });
        }
        let pool_len = u32::try_from(self.trait_pool.len()).unwrap_or(u32::MAX);
        if self.traits_per_individual > pool_len {
            return Err(ConfigError::Invalid {
                field: "population.traits_per_individual",
                reason: format!(
                    "{} exceeds trait pool size {pool_len}",
                    self.traits_per_individual
                ),
            });
        }
        Ok(())
    }
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            size: default_size(),
            min_age_years: default_min_age_years(),
            max_age_years: default_max_age_years(),
            trait_pool: default_trait_pool(),
            traits_per_individual: default_traits_per_individual(),
        }
    }
}

const fn default_size() -> u32 {
    24
}

const fn default_min_age_years() -> u32 {
    18
}

const fn default_max_age_years() -> u32 {
    60
}

fn default_trait_pool() -> Vec<String> {
    [
        "curious", "patient", "stubborn", "generous", "anxious", "cheerful", "proud", "loyal",
        "reckless", "shy",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

const fn default_traits_per_individual() -> u32 {
    3
}

// ---------------------------------------------------------------------------
// Genealogy
// ---------------------------------------------------------------------------

/// Second-generation configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GenealogyConfig {
    /// Whether children are derived at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Whether romantic partners, not only spouses, count as couples.
    #[serde(default)]
    pub include_romantic_partners: bool,
}

impl GenealogyConfig {
    /// Relationship kinds whose pairs are treated as couples.
    pub fn couple_kinds(&self) -> Vec<RelationshipKind> {
        let mut kinds = vec![RelationshipKind::Spouse];
        if self.include_romantic_partners {
            kinds.push(RelationshipKind::RomanticPartner);
        }
        kinds
    }
}

impl Default for GenealogyConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            include_romantic_partners: false,
        }
    }
}

const fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = EngineConfig::parse("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.world.seed, 42);
        assert_eq!(
            config.world.reference_date,
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
        );
        assert_eq!(config.population.size, 24);
        assert!(config.genealogy.enabled);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let yaml = r#"
world:
  seed: 7
  reference_date: "2030-01-15"
population:
  size: 40
  trait_pool: [brave, calm]
  traits_per_individual: 1
genealogy:
  include_romantic_partners: true
"#;
        let config = EngineConfig::parse(yaml).unwrap();
        assert_eq!(config.world.seed, 7);
        assert_eq!(
            config.world.reference_date,
            NaiveDate::from_ymd_opt(2030, 1, 15).unwrap()
        );
        assert_eq!(config.population.size, 40);
        assert_eq!(config.population.min_age_years, 18);
        assert_eq!(config.population.trait_pool, ["brave", "calm"]);
        assert!(config.genealogy.enabled);
        assert_eq!(
            config.genealogy.couple_kinds(),
            [RelationshipKind::Spouse, RelationshipKind::RomanticPartner]
        );
    }

    #[test]
    fn malformed_yaml_is_a_yaml_error() {
        let err = EngineConfig::parse("world: [unterminated").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }));
    }

    #[test]
    fn inverted_age_range_is_rejected() {
        let yaml = "population:\n  min_age_years: 50\n  max_age_years: 20\n";
        let err = EngineConfig::parse(yaml).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "population.min_age_years",
                ..
            }
        ));
    }

    #[test]
    fn too_many_traits_is_rejected() {
        let yaml = "population:\n  trait_pool: [one]\n  traits_per_individual: 2\n";
        assert!(EngineConfig::parse(yaml).is_err());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = EngineConfig::from_file(Path::new("does/not/exist.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
