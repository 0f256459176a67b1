// ABOUTME: Train command for the meal-planner CLI
// ABOUTME: Applies CLI overrides to training settings and runs the pipeline with Ctrl-C cancellation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::CommandContext;
use crate::helpers::display::{display_training_outcome, print_json};
use meal_planner::pipeline::TrainingPipeline;
use meal_planner_core::errors::AppResult;
use meal_planner_rl::reward::RewardPolicy;
use meal_planner_rl::trainer::{CancellationToken, QLearningTrainer};
use std::time::{Duration, Instant};
use tokio::signal;
use tracing::{info, warn};

/// Options for one `train` invocation
pub struct TrainOptions {
    /// Profile to train, or every profile when `None`
    pub profile: Option<String>,
    pub episodes: Option<u64>,
    pub seed: Option<u64>,
    pub force: bool,
    pub reward: Option<RewardPolicy>,
    pub targets: Vec<u32>,
    pub time_limit_secs: Option<u64>,
}

/// Train one or all profiles
pub async fn run(ctx: &CommandContext, options: TrainOptions) -> AppResult<()> {
    let mut training = ctx.config.engine.training.clone();
    if let Some(episodes) = options.episodes {
        training = training.with_episodes(episodes);
    }
    if let Some(seed) = options.seed {
        training = training.with_seed(seed);
    }

    let token = CancellationToken::new();
    let mut trainer = QLearningTrainer::new(training)?.with_cancellation(token.clone());
    if let Some(secs) = options.time_limit_secs {
        trainer = trainer.with_deadline(Instant::now() + Duration::from_secs(secs));
    }

    let watcher = token.clone();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping training after the current episode");
            watcher.cancel();
        }
    });

    let reward = options.reward.unwrap_or(ctx.config.reward);
    info!(reward = reward.name(), force = options.force, "Starting training");

    let mut pipeline = TrainingPipeline::new(
        ctx.catalog().await?,
        ctx.store(),
        ctx.registry.clone(),
        trainer,
        reward,
    )
    .with_force(options.force);
    if !options.targets.is_empty() {
        pipeline = pipeline.with_targets(options.targets);
    }

    let outcomes = match options.profile {
        Some(profile) => vec![pipeline.train_profile(&profile).await?],
        None => pipeline.train_all().await?,
    };

    if ctx.json {
        print_json(&outcomes)?;
    } else {
        for outcome in &outcomes {
            display_training_outcome(outcome);
        }
    }
    Ok(())
}
