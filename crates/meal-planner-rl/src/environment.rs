// ABOUTME: Meal selection environment modelled as a finite-horizon decision process
// ABOUTME: Tracks chosen meal indices, available actions, running totals, and step rewards
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Selection Environment
//!
//! An episode picks [`MEALS_PER_PLAN`] distinct meals from a filtered
//! universe. The state is the ordered list of chosen indices, actions are
//! indices that have not been chosen yet, and the episode ends once the plan
//! is full. The available set keeps ascending index order, so "first
//! maximum" tie-breaking downstream always means "lowest index".

use crate::reward::{RewardContext, RewardPolicy};
use meal_planner_core::constants::MEALS_PER_PLAN;
use meal_planner_core::errors::PlannerError;
use meal_planner_core::models::{Macros, Meal};
use serde::Serialize;
use std::sync::Arc;

/// Running sums over the selected meals
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RunningTotals {
    /// Total kcal
    pub calories: i64,
    /// Total macros
    pub macros: Macros,
}

impl RunningTotals {
    fn add(&mut self, meal: &Meal) {
        self.calories += i64::from(meal.calories);
        self.macros += meal.macros;
    }
}

/// Result of [`SelectionEnv::reset`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    /// Selected indices (empty after reset)
    pub state: Vec<usize>,
    /// Indices that may be chosen next
    pub available: Vec<usize>,
}

/// Result of [`SelectionEnv::step`]
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// State after the step
    pub state: Vec<usize>,
    /// Reward for the step
    pub reward: f64,
    /// Whether the plan is complete
    pub done: bool,
}

/// Environment bound to one profile universe and one calorie target
#[derive(Debug, Clone)]
pub struct SelectionEnv {
    profile: String,
    meals: Arc<[Meal]>,
    target_calories: u32,
    reward: RewardPolicy,
    state: Vec<usize>,
    available: Vec<usize>,
    totals: RunningTotals,
}

impl SelectionEnv {
    /// Create an environment over an already filtered universe
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::CatalogEmpty`] when fewer than
    /// [`MEALS_PER_PLAN`] meals are available
    pub fn new(
        profile: impl Into<String>,
        meals: impl Into<Arc<[Meal]>>,
        target_calories: u32,
        reward: RewardPolicy,
    ) -> Result<Self, PlannerError> {
        let profile = profile.into();
        let meals = meals.into();
        if meals.len() < MEALS_PER_PLAN {
            return Err(PlannerError::CatalogEmpty {
                profile,
                available: meals.len(),
                required: MEALS_PER_PLAN,
            });
        }
        let available = (0..meals.len()).collect();
        Ok(Self {
            profile,
            meals,
            target_calories,
            reward,
            state: Vec::with_capacity(MEALS_PER_PLAN),
            available,
            totals: RunningTotals::default(),
        })
    }

    /// Start a new episode
    pub fn reset(&mut self) -> Observation {
        self.state.clear();
        self.available.clear();
        self.available.extend(0..self.meals.len());
        self.totals = RunningTotals::default();
        Observation {
            state: Vec::new(),
            available: self.available.clone(),
        }
    }

    /// Select the meal at `action`
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::InvalidAction`] when `action` is not in the
    /// available set or the plan is already complete
    pub fn step(&mut self, action: usize) -> Result<Transition, PlannerError> {
        if self.is_done() {
            return Err(PlannerError::InvalidAction { action });
        }
        let position = self
            .available
            .binary_search(&action)
            .map_err(|_| PlannerError::InvalidAction { action })?;
        self.available.remove(position);
        self.state.push(action);
        if let Some(meal) = self.meals.get(action) {
            self.totals.add(meal);
        }

        let done = self.is_done();
        let reward = self.reward.reward(&RewardContext {
            target_calories: self.target_calories,
            total_calories: self.totals.calories,
            meals: &self.meals,
            state: &self.state,
            done,
        });
        Ok(Transition {
            state: self.state.clone(),
            reward,
            done,
        })
    }

    /// Whether the current plan is complete
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.state.len() >= MEALS_PER_PLAN
    }

    /// Selected indices
    #[must_use]
    pub fn state(&self) -> &[usize] {
        &self.state
    }

    /// Indices that may still be chosen, ascending
    #[must_use]
    pub fn available_actions(&self) -> &[usize] {
        &self.available
    }

    /// Running totals for the current episode
    #[must_use]
    pub const fn totals(&self) -> &RunningTotals {
        &self.totals
    }

    /// Absolute deviation of the running total from the target
    #[must_use]
    pub fn calorie_deviation(&self) -> u64 {
        (self.totals.calories - i64::from(self.target_calories)).unsigned_abs()
    }

    /// Target this environment trains for
    #[must_use]
    pub const fn target_calories(&self) -> u32 {
        self.target_calories
    }

    /// Filtered universe
    #[must_use]
    pub fn meals(&self) -> &[Meal] {
        &self.meals
    }

    /// Profile the universe was filtered for
    #[must_use]
    pub fn profile(&self) -> &str {
        &self.profile
    }

    /// Active reward policy
    #[must_use]
    pub const fn reward_policy(&self) -> &RewardPolicy {
        &self.reward
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn universe(calories: &[i32]) -> Vec<Meal> {
        calories
            .iter()
            .zip(1_i64..)
            .map(|(&kcal, id)| {
                Meal::new(id, format!("meal-{id}"), kcal, Macros::new(20.0, 30.0, 10.0), ["rice"])
            })
            .collect()
    }

    fn five_meal_env(target: u32) -> SelectionEnv {
        let meals = universe(&[300, 400, 500, 350, 450]);
        SelectionEnv::new("omnivore", meals, target, RewardPolicy::SparseTerminal).unwrap()
    }

    #[test]
    fn test_reset_restores_full_action_set() {
        let mut env = five_meal_env(1800);
        env.step(2).unwrap();
        let observation = env.reset();
        assert!(observation.state.is_empty());
        assert_eq!(observation.available, vec![0, 1, 2, 3, 4]);
        assert_eq!(env.totals().calories, 0);
    }

    #[test]
    fn test_step_removes_action_and_accumulates() {
        let mut env = five_meal_env(1800);
        env.reset();
        let transition = env.step(1).unwrap();
        assert_eq!(transition.state, vec![1]);
        assert!(!transition.done);
        assert_eq!(env.available_actions(), &[0, 2, 3, 4]);
        assert_eq!(env.totals().calories, 400);
        assert_eq!(
            env.step(1).unwrap_err(),
            PlannerError::InvalidAction { action: 1 }
        );
    }

    #[test]
    fn test_episode_terminates_after_plan_size() {
        let mut env = five_meal_env(1600);
        env.reset();
        for action in [0, 1, 2] {
            assert!(!env.step(action).unwrap().done);
        }
        let last = env.step(3).unwrap();
        assert!(last.done);
        // 300 + 400 + 500 + 350 = 1550, 50 kcal short
        assert!((last.reward + 50.0).abs() < f64::EPSILON);
        assert!(env.step(4).is_err());
    }

    #[test]
    fn test_small_universe_is_rejected() {
        let err = SelectionEnv::new(
            "vegan",
            universe(&[300, 400, 500]),
            1200,
            RewardPolicy::SparseTerminal,
        )
        .unwrap_err();
        assert_eq!(
            err,
            PlannerError::CatalogEmpty {
                profile: "vegan".to_owned(),
                available: 3,
                required: 4
            }
        );
    }
}
