// ABOUTME: Evaluate command for the meal-planner CLI
// ABOUTME: Reports deviation statistics per target and optionally compares against random plans
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{rng_from, CommandContext};
use crate::helpers::display::{display_baseline, display_evaluation, print_json};
use meal_planner_core::errors::AppResult;
use meal_planner_rl::EvaluationHarness;

/// Options for one `evaluate` invocation
pub struct EvaluateOptions {
    /// Targets to evaluate; empty means the profile's full sweep
    pub targets: Vec<u32>,
    pub trials: Option<usize>,
    pub tolerance: Option<u32>,
    pub baseline: bool,
    pub seed: Option<u64>,
}

/// Evaluate a trained profile
pub async fn run(ctx: &CommandContext, profile: &str, options: EvaluateOptions) -> AppResult<()> {
    let definition = ctx.registry.get(profile)?;
    let targets = if options.targets.is_empty() {
        definition.targets.targets()
    } else {
        options.targets
    };

    let mut config = ctx.config.engine.evaluation.clone();
    if let Some(trials) = options.trials {
        config.trials = trials;
    }
    if let Some(tolerance) = options.tolerance {
        config.tolerance_kcal = tolerance;
    }

    let recommender = ctx.recommender().await?;
    let harness = EvaluationHarness::new(&recommender, config)?;
    let mut rng = rng_from(options.seed);

    if options.baseline {
        let comparison = harness
            .compare_with_random(profile, &targets, &mut rng)
            .await?;
        if ctx.json {
            return print_json(&comparison);
        }
        display_evaluation(&comparison.policy);
        display_baseline(&comparison);
        return Ok(());
    }

    let report = harness.evaluate_with_rng(profile, &targets, &mut rng).await?;
    if ctx.json {
        print_json(&report)
    } else {
        display_evaluation(&report);
        Ok(())
    }
}
