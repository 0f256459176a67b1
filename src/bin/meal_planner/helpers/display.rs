// ABOUTME: Output formatting helpers for the meal-planner CLI
// ABOUTME: Renders plans, training outcomes, evaluation reports, and profile listings as text or JSON
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use meal_planner::pipeline::TrainingOutcome;
use meal_planner_core::config::DietaryProfile;
use meal_planner_core::errors::AppResult;
use meal_planner_rl::{BaselineComparison, EvaluationReport, Recommendation};
use serde::Serialize;

/// Print any serializable value as pretty JSON
pub fn print_json<T: Serialize>(value: &T) -> AppResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Display a recommended plan
pub fn display_recommendation(plan: &Recommendation) {
    println!("\nMeal plan for '{}'", plan.profile);
    println!("{}", "=".repeat(60));
    if plan.bucket_target == plan.requested_target {
        println!("   Target: {} kcal", plan.requested_target);
    } else {
        println!(
            "   Target: {} kcal (served from trained {} kcal)",
            plan.requested_target, plan.bucket_target
        );
    }

    for (position, meal) in plan.meals.iter().enumerate() {
        println!(
            "   {}. {:<36} {:>5} kcal  P {:>5.1}g  C {:>5.1}g  F {:>5.1}g",
            position + 1,
            meal.name,
            meal.calories,
            meal.macros.protein,
            meal.macros.carbs,
            meal.macros.fat
        );
    }

    println!("{}", "-".repeat(60));
    println!(
        "   Total: {} kcal (deviation {} kcal)",
        plan.total_calories,
        plan.deviation()
    );
    println!(
        "   Macros: protein {:.1}g, carbs {:.1}g, fat {:.1}g",
        plan.total_macros.protein, plan.total_macros.carbs, plan.total_macros.fat
    );
    if plan.fallback_steps > 0 {
        println!(
            "   Note: {} of {} picks were random (unseen states)",
            plan.fallback_steps,
            plan.meals.len()
        );
    }
}

/// Display the outcome of a training run
pub fn display_training_outcome(outcome: &TrainingOutcome) {
    match outcome {
        TrainingOutcome::Trained {
            profile,
            location,
            reports,
            entries,
            elapsed,
        } => {
            let episodes: u64 = reports.iter().map(|report| report.episodes).sum();
            println!(
                "Trained '{profile}': {} targets, {episodes} episodes, {entries} Q entries in {:.1}s",
                reports.len(),
                elapsed.as_secs_f64()
            );
            println!("   Saved to {location}");
        }
        TrainingOutcome::Skipped { profile, location } => {
            println!("Skipped '{profile}': Q-table already exists at {location} (use --force)");
        }
    }
}

/// Display evaluation statistics
pub fn display_evaluation(report: &EvaluationReport) {
    println!(
        "\nEvaluation for '{}' (success within {} kcal)",
        report.profile, report.tolerance_kcal
    );
    println!("{}", "=".repeat(60));
    println!(
        "   {:>7}  {:>10}  {:>10}  {:>8}",
        "Target", "Mean dev", "Std dev", "Success"
    );
    for stats in &report.targets {
        println!(
            "   {:>7}  {:>10.1}  {:>10.1}  {:>7.1}%",
            stats.target_calories,
            stats.mean_deviation,
            stats.variance.sqrt(),
            stats.success_rate * 100.0
        );
    }
    println!("{}", "-".repeat(60));
    println!(
        "   Achievement: {}/{} ({:.1}%)",
        report.total_successes,
        report.total_trials,
        report.achievement_ratio * 100.0
    );
    if !report.skipped.is_empty() {
        let skipped: Vec<String> = report.skipped.iter().map(ToString::to_string).collect();
        println!("   Skipped (not trained): {}", skipped.join(", "));
    }
}

/// Display the policy versus random comparison
pub fn display_baseline(comparison: &BaselineComparison) {
    println!("\nPolicy vs random for '{}'", comparison.profile);
    println!("{}", "=".repeat(60));
    println!("   {:>7}  {:>12}  {:>12}", "Target", "Policy dev", "Random dev");
    for target in &comparison.targets {
        println!(
            "   {:>7}  {:>12.1}  {:>12.1}",
            target.target_calories, target.policy_mean_deviation, target.random_mean_deviation
        );
    }
    println!("{}", "-".repeat(60));
    println!(
        "   Policy better on {:.1}% of targets",
        comparison.improved_fraction * 100.0
    );
}

/// Display one registry entry
pub fn display_profile(profile: &DietaryProfile, trained: bool) {
    let targets = profile.targets.to_string();
    println!(
        "{:<14} {:<42} targets {targets:<18} {}",
        profile.name,
        profile.description,
        if trained { "trained" } else { "not trained" }
    );
}
