// ABOUTME: Profiles command for the meal-planner CLI
// ABOUTME: Lists registered dietary profiles, their allowed targets, and whether a Q-table exists
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::CommandContext;
use crate::helpers::display::{display_profile, print_json};
use meal_planner_core::errors::AppResult;
use meal_planner_rl::store::ArtifactStore;
use serde_json::{json, Value};

/// List dietary profiles
pub fn run(ctx: &CommandContext) -> AppResult<()> {
    let store = ctx.store();

    if ctx.json {
        let listing: Vec<Value> = ctx
            .registry
            .iter()
            .map(|profile| {
                json!({
                    "profile": profile,
                    "trained": store.exists(&profile.name),
                    "location": store.location(&profile.name),
                })
            })
            .collect();
        return print_json(&listing);
    }

    for profile in ctx.registry.iter() {
        display_profile(profile, store.exists(&profile.name));
    }
    Ok(())
}
