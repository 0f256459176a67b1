// ABOUTME: Environment-driven configuration for training, inference, and evaluation runs
// ABOUTME: Reads storage paths, catalog options, reward policy, and hyperparameters from MEAL_PLANNER_* variables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::catalog::CatalogLoadOptions;
use meal_planner_core::errors::AppResult;
use meal_planner_rl::config::{ConfigError, EngineConfig};
use meal_planner_rl::reward::RewardPolicy;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt::Display;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::str::FromStr;

/// Default directory for persisted Q-tables
pub const DEFAULT_TABLES_DIR: &str = "tables";
/// Default recipe catalog location
pub const DEFAULT_CATALOG_PATH: &str = "data/recipes.json";

/// Catalog loading options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Recipe catalog JSON file
    pub path: PathBuf,
    /// Collapse ingredient synonyms onto canonical names
    pub normalize_ingredients: bool,
    /// Replace stated calories with the 4/4/9 macro estimate
    pub recompute_calories: bool,
    /// Drop meals outside this calorie band
    pub calorie_band: Option<RangeInclusive<i32>>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_CATALOG_PATH),
            normalize_ingredients: true,
            recompute_calories: false,
            calorie_band: None,
        }
    }
}

impl CatalogConfig {
    /// Loading options for the catalog provider
    #[must_use]
    pub fn load_options(&self) -> CatalogLoadOptions {
        CatalogLoadOptions {
            normalize_ingredients: self.normalize_ingredients,
            recompute_calories: self.recompute_calories,
            calorie_band: self.calorie_band.clone(),
        }
    }
}

/// Complete planner configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Directory holding `q_table_<profile>.json` artifacts
    pub tables_dir: PathBuf,
    /// Catalog loading options
    pub catalog: CatalogConfig,
    /// Reward policy used for new training runs
    pub reward: RewardPolicy,
    /// Training, inference, and evaluation settings
    pub engine: EngineConfig,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            tables_dir: PathBuf::from(DEFAULT_TABLES_DIR),
            catalog: CatalogConfig::default(),
            reward: RewardPolicy::default(),
            engine: EngineConfig::default(),
        }
    }
}

impl PlannerConfig {
    /// Load configuration from environment
    ///
    /// # Errors
    ///
    /// Returns a configuration error when a variable cannot be parsed or a
    /// hyperparameter is out of range
    pub fn from_env() -> AppResult<Self> {
        let defaults = Self::default();
        let mut engine = defaults.engine;

        engine.training.episodes = env_parse("MEAL_PLANNER_EPISODES", engine.training.episodes)?;
        engine.training.epsilon = env_parse("MEAL_PLANNER_EPSILON", engine.training.epsilon)?;
        engine.training.alpha = env_parse("MEAL_PLANNER_ALPHA", engine.training.alpha)?;
        engine.training.log_interval =
            env_parse("MEAL_PLANNER_LOG_INTERVAL", engine.training.log_interval)?;
        engine.training.seed = env_parse_opt("MEAL_PLANNER_SEED")?;
        engine.evaluation.trials = env_parse("MEAL_PLANNER_EVAL_TRIALS", engine.evaluation.trials)?;
        engine.evaluation.tolerance_kcal =
            env_parse("MEAL_PLANNER_EVAL_TOLERANCE", engine.evaluation.tolerance_kcal)?;
        engine.recommender.strict_catalog_check = env_flag(
            "MEAL_PLANNER_STRICT_CATALOG",
            engine.recommender.strict_catalog_check,
        );
        engine.validate()?;

        let catalog = CatalogConfig {
            path: PathBuf::from(env_var_or("MEAL_PLANNER_CATALOG_PATH", DEFAULT_CATALOG_PATH)),
            normalize_ingredients: env_flag(
                "MEAL_PLANNER_NORMALIZE_INGREDIENTS",
                defaults.catalog.normalize_ingredients,
            ),
            recompute_calories: env_flag(
                "MEAL_PLANNER_RECOMPUTE_CALORIES",
                defaults.catalog.recompute_calories,
            ),
            calorie_band: env::var("MEAL_PLANNER_CALORIE_BAND")
                .ok()
                .map(|raw| parse_band(&raw))
                .transpose()?,
        };

        Ok(Self {
            tables_dir: PathBuf::from(env_var_or("MEAL_PLANNER_TABLES_DIR", DEFAULT_TABLES_DIR)),
            catalog,
            reward: env_parse("MEAL_PLANNER_REWARD", defaults.reward)?,
            engine,
        })
    }
}

/// Parse `"min-max"` into an inclusive calorie band
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] for malformed bands and
/// [`ConfigError::InvalidRange`] when `min > max`
pub fn parse_band(raw: &str) -> Result<RangeInclusive<i32>, ConfigError> {
    let (low, high) = raw.split_once('-').ok_or_else(|| {
        ConfigError::Parse(format!("calorie band '{raw}' must look like 100-1000"))
    })?;
    let low: i32 = low
        .trim()
        .parse()
        .map_err(|e| ConfigError::Parse(format!("calorie band '{raw}': {e}")))?;
    let high: i32 = high
        .trim()
        .parse()
        .map_err(|e| ConfigError::Parse(format!("calorie band '{raw}': {e}")))?;
    if low > high {
        return Err(ConfigError::InvalidRange("calorie band minimum exceeds maximum"));
    }
    Ok(low..=high)
}

fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn env_flag(key: &str, default: bool) -> bool {
    env::var(key).map_or(default, |v| v != "false" && v != "0")
}

fn env_parse<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    env_parse_opt(key).map(|value| value.unwrap_or(default))
}

fn env_parse_opt<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| ConfigError::Parse(format!("{key}={raw}: {e}"))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_band() {
        assert_eq!(parse_band("100-1000").unwrap(), 100..=1000);
        assert_eq!(parse_band(" 200 - 800 ").unwrap(), 200..=800);
        assert!(matches!(parse_band("900-100"), Err(ConfigError::InvalidRange(_))));
        assert!(matches!(parse_band("abc"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_defaults() {
        let config = PlannerConfig::default();
        assert_eq!(config.tables_dir, PathBuf::from("tables"));
        assert_eq!(config.catalog.path, PathBuf::from("data/recipes.json"));
        assert_eq!(config.reward, RewardPolicy::SparseTerminal);
        assert_eq!(config.engine.training.episodes, 200_000);
    }
}
