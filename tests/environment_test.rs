// ABOUTME: Integration tests for the meal selection environment
// ABOUTME: Validates state growth, distinct selections, invalid actions, and reward timing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{mixed_catalog, six_meals};
use meal_planner_core::constants::MEALS_PER_PLAN;
use meal_planner_core::errors::PlannerError;
use meal_planner_rl::reward::RewardPolicy;
use meal_planner_rl::SelectionEnv;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;

// ============================================================================
// Episode invariants
// ============================================================================

#[test]
fn test_random_episodes_grow_state_by_one_without_duplicates() {
    let mut env = SelectionEnv::new("omnivore", mixed_catalog(), 1800, RewardPolicy::TieredShaped)
        .unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(5);

    for _ in 0..200 {
        let observation = env.reset();
        assert!(observation.state.is_empty());
        assert_eq!(observation.available.len(), 12);

        let mut steps = 0;
        while !env.is_done() {
            let action = *env.available_actions().choose(&mut rng).unwrap();
            let transition = env.step(action).unwrap();
            steps += 1;
            assert_eq!(transition.state.len(), steps);
            assert!(!env.available_actions().contains(&action));
        }

        assert_eq!(env.state().len(), MEALS_PER_PLAN);
        let distinct: HashSet<usize> = env.state().iter().copied().collect();
        assert_eq!(distinct.len(), MEALS_PER_PLAN);
        assert_eq!(env.available_actions().len(), 12 - MEALS_PER_PLAN);
    }
}

#[test]
fn test_available_actions_keep_ascending_order() {
    let mut env =
        SelectionEnv::new("omnivore", six_meals(), 1800, RewardPolicy::SparseTerminal).unwrap();
    env.reset();
    env.step(3).unwrap();
    env.step(0).unwrap();
    assert_eq!(env.available_actions(), &[1, 2, 4, 5]);
}

// ============================================================================
// Invalid actions
// ============================================================================

#[test]
fn test_invalid_action_never_mutates_state() {
    let mut env =
        SelectionEnv::new("omnivore", six_meals(), 1800, RewardPolicy::SparseTerminal).unwrap();
    env.reset();
    env.step(2).unwrap();

    for action in [2, 6, 99] {
        let err = env.step(action).unwrap_err();
        assert!(matches!(err, PlannerError::InvalidAction { .. }));
        assert_eq!(env.state(), &[2]);
        assert_eq!(env.available_actions(), &[0, 1, 3, 4, 5]);
        assert_eq!(env.totals().calories, 500);
    }
}

#[test]
fn test_step_after_done_is_rejected() {
    let mut env =
        SelectionEnv::new("omnivore", six_meals(), 1800, RewardPolicy::SparseTerminal).unwrap();
    env.reset();
    for action in [0, 1, 2, 5] {
        env.step(action).unwrap();
    }
    assert!(env.is_done());
    assert!(matches!(
        env.step(3),
        Err(PlannerError::InvalidAction { action: 3 })
    ));
}

// ============================================================================
// Rewards and construction
// ============================================================================

#[test]
fn test_sparse_reward_arrives_on_terminal_step_only() {
    let mut env =
        SelectionEnv::new("omnivore", six_meals(), 1800, RewardPolicy::SparseTerminal).unwrap();
    env.reset();

    // 300 + 400 + 500 + 350 = 1550, 250 kcal short
    let rewards: Vec<f64> = [0, 1, 2, 3]
        .into_iter()
        .map(|action| env.step(action).unwrap().reward)
        .collect();
    assert!(rewards[..3].iter().all(|reward| reward.abs() < f64::EPSILON));
    assert!((rewards[3] + 500.0).abs() < f64::EPSILON);
    assert_eq!(env.calorie_deviation(), 250);
}

#[test]
fn test_too_small_universe_is_catalog_empty() {
    let meals = six_meals().into_iter().take(3).collect::<Vec<_>>();
    let err = SelectionEnv::new("tiny", meals, 1200, RewardPolicy::SparseTerminal).unwrap_err();
    assert!(matches!(
        err,
        PlannerError::CatalogEmpty {
            available: 3,
            required: 4,
            ..
        }
    ));
}
