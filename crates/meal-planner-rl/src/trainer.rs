// ABOUTME: Tabular Q-learning trainer for the meal selection environment
// ABOUTME: Epsilon-greedy episodes, lazy Q initialization, progress sampling, and parallel target sweeps
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Q-Learning Trainer
//!
//! Runs undiscounted one-step Q-learning over a [`SelectionEnv`]:
//!
//! ```text
//! Q(s, a) <- Q(s, a) + alpha * (r + max_a' Q(s', a') - Q(s, a))
//! ```
//!
//! States are initialized lazily with zero for every action available there.
//! Terminal successors contribute zero to the target and are not stored,
//! since no action is ever taken from them.

use crate::catalog::fingerprint;
use crate::config::TrainingConfig;
use crate::environment::SelectionEnv;
use crate::qtable::{ActionValues, ProfileQTable, QTable, StateKey};
use crate::reward::RewardPolicy;
use chrono::Utc;
use meal_planner_core::config::DietaryProfile;
use meal_planner_core::errors::{AppError, AppResult, PlannerError};
use meal_planner_core::models::Meal;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Shared flag that stops training at the next episode boundary
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Fresh, uncancelled token
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Progress snapshot taken every `log_interval` episodes
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrainingSample {
    /// Episode number (1-based)
    pub episode: u64,
    /// Sum of step rewards in the episode
    pub total_reward: f64,
    /// Absolute deviation of the final plan from the target
    pub calorie_deviation: u64,
    /// Protein grams of the final plan
    pub total_protein: f64,
}

/// Summary of one target's training run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingReport {
    /// Target trained
    pub target_calories: u32,
    /// Episodes completed
    pub episodes: u64,
    /// Non-terminal states stored in the table
    pub states_visited: usize,
    /// Progress samples
    pub samples: Vec<TrainingSample>,
    /// Wall-clock duration
    #[serde(serialize_with = "serialize_duration_ms")]
    pub elapsed: Duration,
}

fn serialize_duration_ms<S: serde::Serializer>(
    duration: &Duration,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_u128(duration.as_millis())
}

/// Tabular Q-learning trainer
#[derive(Debug, Clone)]
pub struct QLearningTrainer {
    config: TrainingConfig,
    cancellation: CancellationToken,
    deadline: Option<Instant>,
}

impl QLearningTrainer {
    /// Create a trainer
    ///
    /// # Errors
    ///
    /// Returns a configuration error when hyperparameters are out of range
    pub fn new(config: TrainingConfig) -> AppResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            cancellation: CancellationToken::new(),
            deadline: None,
        })
    }

    /// Attach a cancellation token
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Stop training once `deadline` has passed
    #[must_use]
    pub const fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Hyperparameters in use
    #[must_use]
    pub const fn config(&self) -> &TrainingConfig {
        &self.config
    }

    fn rng_for(&self, target_calories: u32) -> ChaCha8Rng {
        self.config.seed.map_or_else(ChaCha8Rng::from_entropy, |seed| {
            ChaCha8Rng::seed_from_u64(seed ^ u64::from(target_calories))
        })
    }

    fn should_stop(&self) -> bool {
        self.cancellation.is_cancelled()
            || self
                .deadline
                .is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Train a table for the environment's target
    ///
    /// Uses a generator derived from the configured seed and the target, or
    /// OS entropy when no seed is configured.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::TrainingCancelled`] when stopped early
    pub fn train(&self, env: &mut SelectionEnv) -> AppResult<(QTable, TrainingReport)> {
        let mut rng = self.rng_for(env.target_calories());
        self.train_with_rng(env, &mut rng)
    }

    /// Train a table using the supplied random generator
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::TrainingCancelled`] when stopped early
    pub fn train_with_rng<R: Rng + ?Sized>(
        &self,
        env: &mut SelectionEnv,
        rng: &mut R,
    ) -> AppResult<(QTable, TrainingReport)> {
        let started = Instant::now();
        let target = env.target_calories();
        let mut table = QTable::new(target);
        let mut samples = Vec::new();

        for episode in 1..=self.config.episodes {
            if self.should_stop() {
                info!(
                    profile = env.profile(),
                    target_calories = target,
                    completed_episodes = episode - 1,
                    "Training cancelled"
                );
                return Err(PlannerError::TrainingCancelled {
                    profile: env.profile().to_owned(),
                    target,
                    completed_episodes: episode - 1,
                }
                .into());
            }

            let total_reward = self.run_episode(env, &mut table, rng)?;

            if self.config.log_interval > 0 && episode % self.config.log_interval == 0 {
                let sample = TrainingSample {
                    episode,
                    total_reward,
                    calorie_deviation: env.calorie_deviation(),
                    total_protein: env.totals().macros.protein,
                };
                debug!(
                    profile = env.profile(),
                    target_calories = target,
                    episode = sample.episode,
                    total_reward = sample.total_reward,
                    calorie_deviation = sample.calorie_deviation,
                    total_protein = sample.total_protein,
                    "Training progress"
                );
                samples.push(sample);
            }
        }

        let report = TrainingReport {
            target_calories: target,
            episodes: self.config.episodes,
            states_visited: table.len(),
            samples,
            elapsed: started.elapsed(),
        };
        debug!(
            profile = env.profile(),
            target_calories = target,
            states_visited = report.states_visited,
            elapsed_ms = report.elapsed.as_millis(),
            "Target trained"
        );
        Ok((table, report))
    }

    fn run_episode<R: Rng + ?Sized>(
        &self,
        env: &mut SelectionEnv,
        table: &mut QTable,
        rng: &mut R,
    ) -> AppResult<f64> {
        let observation = env.reset();
        let mut state = StateKey::from(observation.state);
        table.ensure_state(&state, &observation.available);
        let mut total_reward = 0.0;

        loop {
            let action = if rng.gen::<f64>() < self.config.epsilon {
                env.available_actions().choose(rng).copied()
            } else {
                table.get(&state).and_then(ActionValues::best_action)
            }
            .ok_or_else(|| AppError::internal("no available action in non-terminal state"))?;

            let transition = env.step(action)?;
            total_reward += transition.reward;
            let next_state = StateKey::from(transition.state);

            let next_max = if transition.done {
                0.0
            } else {
                table.ensure_state(&next_state, env.available_actions());
                table.get(&next_state).map_or(0.0, ActionValues::max_value)
            };

            if let Some(values) = table.get_mut(&state) {
                let current = values.get(action).unwrap_or(0.0);
                let updated =
                    self.config.alpha.mul_add(transition.reward + next_max - current, current);
                values.set(action, updated);
            }

            if transition.done {
                return Ok(total_reward);
            }
            state = next_state;
        }
    }
}

/// Train every target of a profile in parallel and merge into one artifact
///
/// `targets` overrides the profile's allowed sweep when given.
///
/// # Errors
///
/// Returns [`PlannerError::CatalogEmpty`] when the filtered universe is too
/// small, or the first training error of any target
pub fn train_sweep(
    profile: &DietaryProfile,
    catalog: &[Meal],
    reward: &RewardPolicy,
    trainer: &QLearningTrainer,
    targets: Option<&[u32]>,
) -> AppResult<(ProfileQTable, Vec<TrainingReport>)> {
    let universe: Arc<[Meal]> = profile.filter_meals(catalog).into();
    let targets = targets.map_or_else(|| profile.targets.targets(), <[u32]>::to_vec);
    info!(
        profile = %profile.name,
        universe_size = universe.len(),
        targets = targets.len(),
        episodes = trainer.config().episodes,
        reward = reward.name(),
        "Starting training sweep"
    );

    // Fail fast before spawning work
    SelectionEnv::new(profile.name.as_str(), Arc::clone(&universe), 0, *reward)?;

    let fragments = targets
        .par_iter()
        .map(|&target| {
            let mut env =
                SelectionEnv::new(profile.name.as_str(), Arc::clone(&universe), target, *reward)?;
            trainer.train(&mut env)
        })
        .collect::<AppResult<Vec<_>>>()?;

    let mut artifact = ProfileQTable::new(
        profile.name.as_str(),
        fingerprint(&universe),
        universe.len(),
        *reward,
        trainer.config().clone(),
    );
    let mut reports = Vec::with_capacity(fragments.len());
    for (table, report) in fragments {
        artifact.insert_fragment(table);
        reports.push(report);
    }
    artifact.trained_at = Utc::now();

    info!(
        profile = %profile.name,
        targets = reports.len(),
        entries = artifact.len(),
        "Training sweep complete"
    );
    Ok((artifact, reports))
}

#[cfg(test)]
mod tests {
    use super::*;
    use meal_planner_core::models::Macros;

    fn universe() -> Vec<Meal> {
        [300, 400, 500, 350, 450, 600]
            .iter()
            .zip(1_i64..)
            .map(|(&kcal, id)| {
                Meal::new(id, format!("meal-{id}"), kcal, Macros::new(25.0, 40.0, 12.0), ["rice"])
            })
            .collect()
    }

    fn config(episodes: u64) -> TrainingConfig {
        TrainingConfig {
            episodes,
            log_interval: 100,
            seed: Some(7),
            ..TrainingConfig::default()
        }
    }

    #[test]
    fn test_single_episode_only_updates_terminal_step() {
        let trainer = QLearningTrainer::new(TrainingConfig {
            epsilon: 0.0,
            ..config(1)
        })
        .unwrap();
        let mut env =
            SelectionEnv::new("omnivore", universe(), 1800, RewardPolicy::SparseTerminal).unwrap();
        let (table, report) = trainer.train(&mut env).unwrap();

        // Greedy on an all-zero table picks indices 0,1,2,3 (1550 kcal, 250 short)
        let last_state = table.get(&StateKey::from(vec![0, 1, 2])).unwrap();
        assert!((last_state.get(3).unwrap() + 50.0).abs() < 1e-9);
        assert!(table.get(&StateKey::empty()).unwrap().get(0).unwrap().abs() < f64::EPSILON);
        assert_eq!(report.states_visited, 4);
        assert!(report.samples.is_empty());
    }

    #[test]
    fn test_seeded_training_is_reproducible() {
        let trainer = QLearningTrainer::new(config(500)).unwrap();
        let mut env =
            SelectionEnv::new("omnivore", universe(), 1800, RewardPolicy::TieredShaped).unwrap();
        let (first, _) = trainer.train(&mut env).unwrap();
        let (second, report) = trainer.train(&mut env).unwrap();
        assert_eq!(first, second);
        assert_eq!(report.samples.len(), 5);
    }

    #[test]
    fn test_cancellation_stops_training() {
        let token = CancellationToken::new();
        token.cancel();
        let trainer = QLearningTrainer::new(config(10))
            .unwrap()
            .with_cancellation(token);
        let mut env =
            SelectionEnv::new("omnivore", universe(), 1800, RewardPolicy::SparseTerminal).unwrap();
        let err = trainer.train(&mut env).unwrap_err();
        assert_eq!(
            err.planner_error(),
            Some(&PlannerError::TrainingCancelled {
                profile: "omnivore".to_owned(),
                target: 1800,
                completed_episodes: 0
            })
        );
    }

    #[test]
    fn test_invalid_hyperparameters_are_rejected() {
        assert!(QLearningTrainer::new(TrainingConfig {
            epsilon: -0.5,
            ..TrainingConfig::default()
        })
        .is_err());
    }
}
