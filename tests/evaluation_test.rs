// ABOUTME: Integration tests for the evaluation harness
// ABOUTME: Covers deviation statistics, skipped targets, error propagation, and the random baseline
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{open_profile, registry_with, six_meals, trained_recommender};
use meal_planner_core::config::ProfileRegistry;
use meal_planner_core::errors::PlannerError;
use meal_planner_rl::config::EvaluationConfig;
use meal_planner_rl::EvaluationHarness;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn config(trials: usize) -> EvaluationConfig {
    EvaluationConfig {
        trials,
        tolerance_kcal: 100,
    }
}

// ============================================================================
// Statistics
// ============================================================================

#[tokio::test]
async fn test_untrained_targets_are_skipped_not_fatal() {
    let recommender =
        trained_recommender(ProfileRegistry::builtin(), "omnivore", six_meals(), &[1800], 30_000);
    let harness = EvaluationHarness::new(&recommender, config(10)).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(2);

    let report = harness
        .evaluate_with_rng("omnivore", &[1700, 1800, 1900], &mut rng)
        .await
        .unwrap();

    assert_eq!(report.skipped, vec![1700, 1900]);
    assert_eq!(report.targets.len(), 1);
    assert_eq!(report.total_trials, 10);

    let stats = &report.targets[0];
    assert_eq!(stats.target_calories, 1800);
    assert!(stats.mean_deviation <= 100.0);
    // A converged greedy policy gives the same plan every trial
    assert!(stats.variance.abs() < f64::EPSILON);
    assert_eq!(stats.successes, 10);
    assert!((report.achievement_ratio - 1.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_nothing_trained_gives_zero_ratio() {
    let recommender =
        trained_recommender(ProfileRegistry::builtin(), "omnivore", six_meals(), &[1800], 200);
    let harness = EvaluationHarness::new(&recommender, config(5)).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(2);

    let report = harness
        .evaluate_with_rng("omnivore", &[1200, 1300], &mut rng)
        .await
        .unwrap();
    assert!(report.targets.is_empty());
    assert_eq!(report.total_trials, 0);
    assert!(report.achievement_ratio.abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_missing_model_is_not_skipped() {
    let recommender =
        trained_recommender(ProfileRegistry::builtin(), "omnivore", six_meals(), &[1800], 200);
    let harness = EvaluationHarness::new(&recommender, config(5)).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(2);

    let err = harness
        .evaluate_with_rng("vegan", &[1000], &mut rng)
        .await
        .unwrap_err();
    assert!(matches!(
        err.planner_error(),
        Some(PlannerError::ModelNotFound { .. })
    ));
}

#[test]
fn test_zero_trials_rejected() {
    let recommender =
        trained_recommender(ProfileRegistry::builtin(), "omnivore", six_meals(), &[1800], 10);
    assert!(EvaluationHarness::new(&recommender, config(0)).is_err());
}

// ============================================================================
// Random baseline
// ============================================================================

#[tokio::test]
async fn test_policy_beats_random_selection() {
    let targets = [1500, 1700, 1800, 1950];
    let registry = registry_with(open_profile("test-open", &targets));
    let recommender = trained_recommender(registry, "test-open", six_meals(), &targets, 30_000);
    let harness = EvaluationHarness::new(&recommender, config(50)).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(4);

    let comparison = harness
        .compare_with_random("test-open", &targets, &mut rng)
        .await
        .unwrap();

    assert_eq!(comparison.targets.len(), targets.len());
    assert!(comparison.policy.skipped.is_empty());
    assert!(
        comparison.improved_fraction >= 0.9,
        "policy improved on {:.2} of targets",
        comparison.improved_fraction
    );
}
