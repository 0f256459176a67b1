// ABOUTME: Greedy meal plan recommender backed by persisted profile Q-tables
// ABOUTME: Validates requests, filters the live catalog, and rolls out the learned policy with fallbacks
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Recommender
//!
//! Serves plans from trained artifacts. Each request filters the live
//! catalog with the profile rule, then walks the table greedily from the
//! empty state. Unknown states, or states whose stored actions no longer
//! apply, fall back to a uniformly random available meal.

use crate::catalog::{fingerprint, MealCatalog};
use crate::config::RecommenderConfig;
use crate::qtable::{ProfileQTable, StateKey};
use crate::store::ArtifactStore;
use dashmap::DashMap;
use meal_planner_core::config::{DietaryProfile, ProfileRegistry};
use meal_planner_core::constants::MEALS_PER_PLAN;
use meal_planner_core::errors::{AppError, AppResult, PlannerError};
use meal_planner_core::models::{Macros, Meal};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::sync::Arc;
use tokio::task;
use tracing::{debug, instrument, warn};

/// A recommended plan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    /// Profile served
    pub profile: String,
    /// Target the caller asked for
    pub requested_target: u32,
    /// Trained bucket used to answer
    pub bucket_target: u32,
    /// Selected meals in selection order
    pub meals: Vec<Meal>,
    /// Sum of calories
    pub total_calories: i64,
    /// Sum of macros
    pub total_macros: Macros,
    /// Steps answered by the random fallback
    pub fallback_steps: usize,
}

impl Recommendation {
    /// Absolute distance between the plan and the requested target
    #[must_use]
    pub fn deviation(&self) -> u64 {
        (self.total_calories - i64::from(self.requested_target)).unsigned_abs()
    }
}

/// Indices chosen by a rollout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rollout {
    /// Chosen indices in order
    pub actions: Vec<usize>,
    /// Steps that used the random fallback
    pub fallback_steps: usize,
}

/// Walk `table` greedily for `target` over a universe of `universe_len` meals
///
/// At each step the highest-valued stored action that is still valid for the
/// current universe wins (first maximum on ties). When the state is unknown
/// or none of its actions are valid, a random available index is used.
pub fn greedy_rollout<R: Rng + ?Sized>(
    table: &ProfileQTable,
    target: u32,
    universe_len: usize,
    rng: &mut R,
) -> Rollout {
    let mut state = StateKey::empty();
    let mut taken = vec![false; universe_len];
    let mut fallback_steps = 0;

    for _ in 0..MEALS_PER_PLAN.min(universe_len) {
        let greedy = table.lookup(target, &state).and_then(|values| {
            values.best_among(|action| taken.get(action).is_some_and(|&used| !used))
        });
        let action = greedy.or_else(|| {
            fallback_steps += 1;
            let available: Vec<usize> = (0..universe_len).filter(|&index| !taken[index]).collect();
            available.choose(rng).copied()
        });
        let Some(action) = action else { break };
        taken[action] = true;
        state.push(action);
    }

    Rollout {
        actions: state.as_slice().to_vec(),
        fallback_steps,
    }
}

/// Serves recommendations for every registered profile
pub struct Recommender {
    catalog: Arc<dyn MealCatalog>,
    store: Arc<dyn ArtifactStore>,
    registry: ProfileRegistry,
    config: RecommenderConfig,
    artifacts: DashMap<String, Arc<ProfileQTable>>,
}

impl Recommender {
    /// Create a recommender
    pub fn new(
        catalog: Arc<dyn MealCatalog>,
        store: Arc<dyn ArtifactStore>,
        registry: ProfileRegistry,
        config: RecommenderConfig,
    ) -> Self {
        Self {
            catalog,
            store,
            registry,
            config,
            artifacts: DashMap::new(),
        }
    }

    /// Registered profiles
    #[must_use]
    pub const fn registry(&self) -> &ProfileRegistry {
        &self.registry
    }

    /// Artifact for `profile`, loaded once and cached
    ///
    /// Loading reads and decodes the whole artifact, so it runs on the
    /// blocking pool.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::ModelNotFound`] when no artifact was saved
    pub async fn artifact(&self, profile: &str) -> AppResult<Arc<ProfileQTable>> {
        if let Some(cached) = self.artifacts.get(profile) {
            return Ok(Arc::clone(cached.value()));
        }
        let store = Arc::clone(&self.store);
        let name = profile.to_owned();
        let loaded = task::spawn_blocking(move || store.load(&name))
            .await
            .map_err(|e| {
                AppError::internal(format!("artifact load task failed: {e}")).with_source(e)
            })??;
        let loaded = Arc::new(loaded);
        debug!(
            profile,
            targets = loaded.targets().count(),
            entries = loaded.len(),
            location = %self.store.location(profile),
            "Loaded Q-table"
        );
        self.artifacts
            .insert(profile.to_owned(), Arc::clone(&loaded));
        Ok(loaded)
    }

    /// Drop cached artifacts so the next request reloads from the store
    pub fn invalidate(&self, profile: &str) {
        self.artifacts.remove(profile);
    }

    /// Filtered universe for `profile` from the live catalog
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::InvalidProfile`] for unknown profiles or a
    /// catalog error
    pub async fn universe(&self, profile: &str) -> AppResult<Vec<Meal>> {
        let definition = self.registry.get(profile)?;
        let meals = self.catalog.list_all_meals().await?;
        Ok(definition.filter_meals(&meals))
    }

    /// Recommend a plan using OS entropy for fallbacks
    ///
    /// # Errors
    ///
    /// See [`Recommender::recommend_with_rng`]
    pub async fn recommend(
        &self,
        profile: &str,
        target_calories: u32,
    ) -> AppResult<Recommendation> {
        let mut rng = StdRng::from_entropy();
        self.recommend_with_rng(profile, target_calories, &mut rng).await
    }

    /// Recommend a plan for an allowed target
    ///
    /// # Errors
    ///
    /// - [`PlannerError::InvalidProfile`] for unknown profiles
    /// - [`PlannerError::InvalidTarget`] for targets outside the profile sweep
    /// - [`PlannerError::ModelNotFound`] when no artifact exists
    /// - [`PlannerError::BucketNotTrained`] when the artifact lacks the target
    /// - [`PlannerError::CatalogEmpty`] when fewer than four meals pass the filter
    /// - [`PlannerError::CatalogMismatch`] under strict catalog checking
    #[instrument(skip_all, fields(profile = %profile, target = target_calories))]
    pub async fn recommend_with_rng<R: Rng + Send>(
        &self,
        profile: &str,
        target_calories: u32,
        rng: &mut R,
    ) -> AppResult<Recommendation> {
        let definition = self.registry.get(profile)?;
        definition.ensure_target(target_calories)?;
        self.serve(definition, target_calories, target_calories, rng)
            .await
    }

    /// Recommend from the trained bucket closest to `target_calories`
    ///
    /// Any integer target is accepted; ties go to the lower bucket.
    ///
    /// # Errors
    ///
    /// Same as [`Recommender::recommend_with_rng`] except for target validation
    pub async fn recommend_nearest<R: Rng + Send>(
        &self,
        profile: &str,
        target_calories: u32,
        rng: &mut R,
    ) -> AppResult<Recommendation> {
        let definition = self.registry.get(profile)?;
        let artifact = self.artifact(profile).await?;
        let bucket = artifact.nearest_target(target_calories).ok_or_else(|| {
            PlannerError::BucketNotTrained {
                profile: profile.to_owned(),
                target: target_calories,
            }
        })?;
        self.serve(definition, target_calories, bucket, rng).await
    }

    /// Recommend from an exact trained bucket without checking the sweep
    ///
    /// # Errors
    ///
    /// Same as [`Recommender::recommend_with_rng`] except for target validation
    pub async fn recommend_from_bucket<R: Rng + Send>(
        &self,
        profile: &str,
        target_calories: u32,
        rng: &mut R,
    ) -> AppResult<Recommendation> {
        let definition = self.registry.get(profile)?;
        self.serve(definition, target_calories, target_calories, rng)
            .await
    }

    async fn serve<R: Rng + Send>(
        &self,
        profile: &DietaryProfile,
        requested_target: u32,
        bucket_target: u32,
        rng: &mut R,
    ) -> AppResult<Recommendation> {
        let artifact = self.artifact(&profile.name).await?;
        if !artifact.has_target(bucket_target) {
            return Err(PlannerError::BucketNotTrained {
                profile: profile.name.clone(),
                target: bucket_target,
            }
            .into());
        }

        let catalog = self.catalog.list_all_meals().await?;
        let universe = profile.filter_meals(&catalog);
        if universe.len() < MEALS_PER_PLAN {
            return Err(PlannerError::CatalogEmpty {
                profile: profile.name.clone(),
                available: universe.len(),
                required: MEALS_PER_PLAN,
            }
            .into());
        }
        self.check_catalog(&artifact, &universe)?;

        let rollout = greedy_rollout(&artifact, bucket_target, universe.len(), rng);
        let meals: Vec<Meal> = rollout
            .actions
            .iter()
            .filter_map(|&index| universe.get(index).cloned())
            .collect();
        let total_calories = meals.iter().map(|meal| i64::from(meal.calories)).sum();
        let total_macros = meals.iter().map(|meal| meal.macros).sum();

        if rollout.fallback_steps > 0 {
            debug!(
                profile = %profile.name,
                bucket_target,
                fallback_steps = rollout.fallback_steps,
                "Greedy rollout used random fallback"
            );
        }

        Ok(Recommendation {
            profile: profile.name.clone(),
            requested_target,
            bucket_target,
            meals,
            total_calories,
            total_macros,
            fallback_steps: rollout.fallback_steps,
        })
    }

    fn check_catalog(&self, artifact: &ProfileQTable, universe: &[Meal]) -> AppResult<()> {
        let actual = fingerprint(universe);
        if actual == artifact.catalog_fingerprint {
            return Ok(());
        }
        if self.config.strict_catalog_check {
            return Err(PlannerError::CatalogMismatch {
                profile: artifact.profile.clone(),
                expected: artifact.catalog_fingerprint.clone(),
                actual,
            }
            .into());
        }
        warn!(
            profile = %artifact.profile,
            trained_universe = artifact.universe_size,
            live_universe = universe.len(),
            "Catalog changed since training; meal indices may refer to different meals"
        );
        Ok(())
    }
}
