// ABOUTME: Reinforcement-learning engine for the meal planner
// ABOUTME: Selection environment, rewards, Q-learning trainer, recommender, and evaluation harness
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Meal Planner RL
//!
//! Learns, per dietary profile and calorie target, a tabular policy for
//! picking four distinct meals whose calories sum close to the target.
//!
//! ## Modules
//!
//! - **environment**: `SelectionEnv`, the finite-horizon selection process
//! - **reward**: Pluggable `RewardPolicy` variants
//! - **qtable**: `StateKey`, `QTable` fragments, and the persisted `ProfileQTable`
//! - **trainer**: `QLearningTrainer` and the parallel `train_sweep`
//! - **catalog** / **store**: Async meal catalog and artifact storage seams
//! - **recommender**: Greedy rollout over trained tables
//! - **evaluation**: Deviation statistics and random baselines

/// Engine configuration
pub mod config;

/// Reward policies
pub mod reward;

/// Meal selection environment
pub mod environment;

/// Q-table data structures and the persisted artifact
pub mod qtable;

/// Q-learning trainer
pub mod trainer;

/// Meal catalog abstraction
pub mod catalog;

/// Artifact storage abstraction
pub mod store;

/// Greedy recommender
pub mod recommender;

/// Evaluation harness
pub mod evaluation;

pub use catalog::{fingerprint, InMemoryCatalog, MealCatalog};
pub use config::{ConfigError, EngineConfig, EvaluationConfig, RecommenderConfig, TrainingConfig};
pub use environment::{Observation, RunningTotals, SelectionEnv, Transition};
pub use evaluation::{BaselineComparison, EvaluationHarness, EvaluationReport, TargetEvaluation};
pub use qtable::{ActionValues, ProfileQTable, QKey, QTable, StateKey};
pub use recommender::{greedy_rollout, Recommendation, Recommender, Rollout};
pub use reward::{
    DeviationTerm, FatShaping, MacroAwareReward, ProteinShaping, RewardPolicy, ShapingScope,
};
pub use store::{ArtifactStore, InMemoryArtifactStore};
pub use trainer::{train_sweep, CancellationToken, QLearningTrainer, TrainingReport, TrainingSample};
