// ABOUTME: Command modules for the meal-planner CLI and their shared context
// ABOUTME: Builds the catalog, artifact store, and recommender from the loaded configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub mod evaluate;
pub mod profiles;
pub mod recommend;
pub mod train;

use meal_planner::catalog::JsonFileCatalog;
use meal_planner::config::PlannerConfig;
use meal_planner::store::FileArtifactStore;
use meal_planner_core::config::ProfileRegistry;
use meal_planner_core::errors::AppResult;
use meal_planner_rl::Recommender;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

/// State shared by every subcommand
pub struct CommandContext {
    pub config: PlannerConfig,
    pub registry: ProfileRegistry,
    pub json: bool,
}

impl CommandContext {
    pub const fn new(config: PlannerConfig, registry: ProfileRegistry, json: bool) -> Self {
        Self {
            config,
            registry,
            json,
        }
    }

    pub fn store(&self) -> FileArtifactStore {
        FileArtifactStore::new(&self.config.tables_dir)
    }

    pub async fn catalog(&self) -> AppResult<Arc<JsonFileCatalog>> {
        let catalog = JsonFileCatalog::open(
            &self.config.catalog.path,
            self.config.catalog.load_options(),
        )
        .await?;
        Ok(Arc::new(catalog))
    }

    pub async fn recommender(&self) -> AppResult<Recommender> {
        Ok(Recommender::new(
            self.catalog().await?,
            Arc::new(self.store()),
            self.registry.clone(),
            self.config.engine.recommender.clone(),
        ))
    }
}

/// Seeded generator when a seed is given, OS entropy otherwise
pub fn rng_from(seed: Option<u64>) -> StdRng {
    seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64)
}
