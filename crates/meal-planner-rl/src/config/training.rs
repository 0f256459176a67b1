// ABOUTME: Hyperparameter and runtime configuration for training, inference, and evaluation
// ABOUTME: Provides defaults matching the reference training run plus range validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Engine Configuration
//!
//! Training hyperparameters are recorded inside every persisted artifact so a
//! table can always be traced back to the run that produced it.

use super::error::ConfigError;
use meal_planner_core::constants::{evaluation, training};
use serde::{Deserialize, Serialize};

/// Aggregated engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Q-learning hyperparameters
    pub training: TrainingConfig,
    /// Inference settings
    pub recommender: RecommenderConfig,
    /// Evaluation harness settings
    pub evaluation: EvaluationConfig,
}

impl EngineConfig {
    /// Validate every section
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] encountered
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.training.validate()?;
        self.evaluation.validate()
    }
}

/// Tabular Q-learning hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Episodes per calorie target
    pub episodes: u64,
    /// Exploration probability for epsilon-greedy selection
    pub epsilon: f64,
    /// Learning rate
    pub alpha: f64,
    /// Episodes between progress samples (0 disables sampling)
    pub log_interval: u64,
    /// Base seed; each target derives its own stream from it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            episodes: training::DEFAULT_EPISODES,
            epsilon: training::DEFAULT_EPSILON,
            alpha: training::DEFAULT_ALPHA,
            log_interval: training::DEFAULT_LOG_INTERVAL,
            seed: None,
        }
    }
}

impl TrainingConfig {
    /// Check hyperparameter ranges
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidRange`] when a value is out of bounds
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.episodes == 0 {
            return Err(ConfigError::InvalidRange("episodes must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.epsilon) {
            return Err(ConfigError::InvalidRange("epsilon must be between 0 and 1"));
        }
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(ConfigError::InvalidRange("alpha must be in (0, 1]"));
        }
        Ok(())
    }

    /// Same configuration with a different episode count
    #[must_use]
    pub const fn with_episodes(mut self, episodes: u64) -> Self {
        self.episodes = episodes;
        self
    }

    /// Same configuration with a fixed seed
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Inference settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommenderConfig {
    /// Reject requests when the live catalog no longer matches the artifact
    pub strict_catalog_check: bool,
}

/// Evaluation harness settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Recommendations sampled per target
    pub trials: usize,
    /// Success band around the target in kcal
    pub tolerance_kcal: u32,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            trials: evaluation::DEFAULT_TRIALS,
            tolerance_kcal: evaluation::DEFAULT_TOLERANCE_KCAL,
        }
    }
}

impl EvaluationConfig {
    /// Check harness settings
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidRange`] when no trials are requested
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.trials == 0 {
            return Err(ConfigError::InvalidRange("trials must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_run() {
        let config = TrainingConfig::default();
        assert_eq!(config.episodes, 200_000);
        assert!((config.epsilon - 0.1).abs() < f64::EPSILON);
        assert!((config.alpha - 0.1).abs() < f64::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        let config = TrainingConfig {
            epsilon: 1.5,
            ..TrainingConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRange(_))
        ));

        let config = TrainingConfig {
            alpha: 0.0,
            ..TrainingConfig::default()
        };
        assert!(config.validate().is_err());

        assert!(TrainingConfig::default().with_episodes(0).validate().is_err());
        assert!(EvaluationConfig {
            trials: 0,
            tolerance_kcal: 100
        }
        .validate()
        .is_err());
    }
}
