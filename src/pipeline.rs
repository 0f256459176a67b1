// ABOUTME: Offline training pipeline that builds and persists Q-tables per dietary profile
// ABOUTME: Skips profiles with an existing artifact unless forced and holds a lock while training
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Training Pipeline
//!
//! For each profile: check the store, take the profile's lock, read the live
//! catalog, train every allowed target in parallel, and save the merged
//! artifact atomically. The CPU-bound sweep runs on the blocking pool so the
//! async runtime stays responsive.

use crate::store::FileArtifactStore;
use meal_planner_core::config::ProfileRegistry;
use meal_planner_core::errors::{AppError, AppResult, PlannerError};
use meal_planner_rl::catalog::MealCatalog;
use meal_planner_rl::qtable::ProfileQTable;
use meal_planner_rl::reward::RewardPolicy;
use meal_planner_rl::store::ArtifactStore;
use meal_planner_rl::trainer::{train_sweep, QLearningTrainer, TrainingReport};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task;
use tracing::{debug, info, instrument};

/// Result of training one profile
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TrainingOutcome {
    /// A new artifact was written
    Trained {
        /// Profile trained
        profile: String,
        /// Artifact location
        location: String,
        /// Per-target reports, in target order
        reports: Vec<TrainingReport>,
        /// Q entries in the artifact
        entries: usize,
        /// Wall-clock time for the whole profile
        #[serde(skip)]
        elapsed: Duration,
    },
    /// An artifact already existed
    Skipped {
        /// Profile skipped
        profile: String,
        /// Existing artifact location
        location: String,
    },
}

impl TrainingOutcome {
    /// Profile this outcome refers to
    #[must_use]
    pub fn profile(&self) -> &str {
        match self {
            Self::Trained { profile, .. } | Self::Skipped { profile, .. } => profile,
        }
    }

    /// Whether training actually ran
    #[must_use]
    pub const fn is_trained(&self) -> bool {
        matches!(self, Self::Trained { .. })
    }
}

/// Trains and persists profile artifacts
pub struct TrainingPipeline {
    catalog: Arc<dyn MealCatalog>,
    store: FileArtifactStore,
    registry: ProfileRegistry,
    trainer: QLearningTrainer,
    reward: RewardPolicy,
    force: bool,
    targets: Option<Vec<u32>>,
}

impl TrainingPipeline {
    /// Create a pipeline that skips profiles already trained
    pub fn new(
        catalog: Arc<dyn MealCatalog>,
        store: FileArtifactStore,
        registry: ProfileRegistry,
        trainer: QLearningTrainer,
        reward: RewardPolicy,
    ) -> Self {
        Self {
            catalog,
            store,
            registry,
            trainer,
            reward,
            force: false,
            targets: None,
        }
    }

    /// Retrain even when an artifact exists
    #[must_use]
    pub const fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Train only these targets instead of each profile's full sweep
    #[must_use]
    pub fn with_targets(mut self, targets: Vec<u32>) -> Self {
        self.targets = Some(targets);
        self
    }

    /// Store the pipeline writes to
    #[must_use]
    pub const fn store(&self) -> &FileArtifactStore {
        &self.store
    }

    fn skipped(&self, profile: &str) -> TrainingOutcome {
        let location = self.store.location(profile);
        info!(profile, location = %location, "Q-table exists, skipping training");
        TrainingOutcome::Skipped {
            profile: profile.to_owned(),
            location,
        }
    }

    /// Train one profile
    ///
    /// # Errors
    ///
    /// Returns an invalid-profile error for unknown names, a resource-locked
    /// error when another run is training the profile, or any catalog,
    /// training, or storage error
    #[instrument(skip(self), fields(reward = self.reward.name(), force = self.force))]
    pub async fn train_profile(&self, profile: &str) -> AppResult<TrainingOutcome> {
        let definition = self.registry.get(profile)?.clone();
        if !self.force && self.store.exists(profile) {
            return Ok(self.skipped(profile));
        }

        let lock = self.store.lock(profile)?;
        // Another run may have finished between the check and the lock
        if !self.force && self.store.exists(profile) {
            return Ok(self.skipped(profile));
        }

        let meals = self.catalog.list_all_meals().await?;
        debug!(
            profile,
            catalog = %self.catalog.describe(),
            meals = meals.len(),
            "Training from catalog"
        );
        let started = Instant::now();
        let reward = self.reward;
        let trainer = self.trainer.clone();
        let targets = self.targets.clone();
        let store = self.store.clone();
        // Sweep, merge and save all read or write whole artifacts; keep them off the runtime
        let (entries, reports) = task::spawn_blocking(move || {
            let (trained, reports) =
                train_sweep(&definition, &meals, &reward, &trainer, targets.as_deref())?;
            let artifact = if targets.is_some() {
                merge_into_existing(&store, trained)?
            } else {
                trained
            };
            store.save(&artifact)?;
            Ok::<_, AppError>((artifact.len(), reports))
        })
        .await
        .map_err(|e| AppError::internal(format!("training task failed: {e}")).with_source(e))??;
        drop(lock);

        let elapsed = started.elapsed();
        info!(
            profile,
            targets = reports.len(),
            entries,
            elapsed_ms = elapsed.as_millis(),
            "Profile trained"
        );
        Ok(TrainingOutcome::Trained {
            profile: profile.to_owned(),
            location: self.store.location(profile),
            entries,
            reports,
            elapsed,
        })
    }

    /// Train every registered profile in name order, stopping at the first error
    ///
    /// # Errors
    ///
    /// See [`TrainingPipeline::train_profile`]
    pub async fn train_all(&self) -> AppResult<Vec<TrainingOutcome>> {
        let names: Vec<String> = self.registry.names().map(str::to_owned).collect();
        let mut outcomes = Vec::with_capacity(names.len());
        for name in &names {
            outcomes.push(self.train_profile(name).await?);
        }
        let trained = outcomes.iter().filter(|o| o.is_trained()).count();
        info!(
            profiles = outcomes.len(),
            trained,
            skipped = outcomes.len() - trained,
            "Training pipeline complete"
        );
        Ok(outcomes)
    }
}

/// Fold a partial sweep into the saved artifact so untouched buckets survive
fn merge_into_existing(
    store: &FileArtifactStore,
    trained: ProfileQTable,
) -> AppResult<ProfileQTable> {
    let mut existing = match store.load(&trained.profile) {
        Ok(existing) => existing,
        Err(e) if matches!(e.planner_error(), Some(PlannerError::ModelNotFound { .. })) => {
            return Ok(trained);
        }
        Err(e) => return Err(e),
    };

    if existing.catalog_fingerprint != trained.catalog_fingerprint {
        return Err(PlannerError::CatalogMismatch {
            profile: trained.profile,
            expected: existing.catalog_fingerprint,
            actual: trained.catalog_fingerprint,
        }
        .into());
    }
    if existing.reward != trained.reward {
        return Err(AppError::invalid_input(format!(
            "profile '{}' was trained with the {} reward; retrain every target to switch to {}",
            trained.profile,
            existing.reward.name(),
            trained.reward.name()
        )));
    }

    let merged: Vec<u32> = trained.targets().collect();
    existing.merge(trained);
    info!(
        profile = %existing.profile,
        retrained = ?merged,
        targets = existing.targets().count(),
        "Merged retrained buckets into existing Q-table"
    );
    Ok(existing)
}
