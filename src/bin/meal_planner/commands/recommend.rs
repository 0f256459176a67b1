// ABOUTME: Recommend command for the meal-planner CLI
// ABOUTME: Serves a four-meal plan for an allowed target or the nearest trained one
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{rng_from, CommandContext};
use crate::helpers::display::{display_recommendation, print_json};
use meal_planner_core::errors::AppResult;

/// Recommend a plan and print it
pub async fn run(
    ctx: &CommandContext,
    profile: &str,
    target: u32,
    nearest: bool,
    seed: Option<u64>,
) -> AppResult<()> {
    let recommender = ctx.recommender().await?;
    let mut rng = rng_from(seed);

    let plan = if nearest {
        recommender
            .recommend_nearest(profile, target, &mut rng)
            .await?
    } else {
        recommender
            .recommend_with_rng(profile, target, &mut rng)
            .await?
    };

    if ctx.json {
        print_json(&plan)
    } else {
        display_recommendation(&plan);
        Ok(())
    }
}
