// ABOUTME: Pluggable reward policies for the meal selection environment
// ABOUTME: Sparse terminal, tiered shaped, and macro-aware calorie rewards
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Reward Policies
//!
//! A reward policy maps the environment's running totals to a scalar after
//! every step. All policies are pure functions of [`RewardContext`].

use crate::config::ConfigError;
use meal_planner_core::constants::reward::{
    FAT_CEILING_G, OVERSHOOT_MULTIPLIER, PROTEIN_BONUS, PROTEIN_BONUS_THRESHOLD_G,
    PROTEIN_FLOOR_G, PROTEIN_SHORTFALL_WEIGHT, SPARSE_TOLERANCE_KCAL, TIERED_BONUS_BAND_KCAL,
    TIERED_LINEAR_BAND_KCAL, TIERED_MAX_REWARD, TOLERANCE_BONUS,
};
use meal_planner_core::models::Meal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Snapshot handed to a policy after a step
#[derive(Debug, Clone, Copy)]
pub struct RewardContext<'a> {
    /// Target the episode is trained for
    pub target_calories: u32,
    /// Sum of calories of the selected meals
    pub total_calories: i64,
    /// Filtered universe
    pub meals: &'a [Meal],
    /// Selected indices in order
    pub state: &'a [usize],
    /// Whether the plan is complete
    pub done: bool,
}

impl RewardContext<'_> {
    /// Absolute distance between the running total and the target
    #[must_use]
    pub fn deviation(&self) -> f64 {
        (self.total_calories - i64::from(self.target_calories)).unsigned_abs() as f64
    }

    /// Meal chosen by the step that produced this context
    #[must_use]
    pub fn last_meal(&self) -> Option<&Meal> {
        self.state.last().and_then(|&index| self.meals.get(index))
    }

    /// Every selected meal
    pub fn selected_meals(&self) -> impl Iterator<Item = &Meal> {
        self.state.iter().filter_map(|&index| self.meals.get(index))
    }
}

/// `-dev` inside the tolerance, `-2 * dev` outside it
fn banded_penalty(deviation: f64) -> f64 {
    if deviation <= SPARSE_TOLERANCE_KCAL {
        -deviation
    } else {
        -OVERSHOOT_MULTIPLIER * deviation
    }
}

fn tiered(deviation: f64) -> f64 {
    if deviation < TIERED_BONUS_BAND_KCAL {
        TIERED_MAX_REWARD - deviation
    } else if deviation < TIERED_LINEAR_BAND_KCAL {
        -deviation
    } else {
        -OVERSHOOT_MULTIPLIER * deviation
    }
}

/// Calorie component of a macro-aware reward
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeviationTerm {
    /// Banded penalty on the terminal step only
    SparseTerminal,
    /// Tiered reward on every step
    Tiered,
    /// `-dev` on every step
    Penalty,
    /// Flat bonus inside the tolerance, `-dev` outside it, on every step
    ToleranceBonus {
        /// Bonus paid inside the tolerance
        bonus: f64,
    },
}

impl DeviationTerm {
    fn score(self, ctx: &RewardContext<'_>) -> f64 {
        let deviation = ctx.deviation();
        match self {
            Self::SparseTerminal => {
                if ctx.done {
                    banded_penalty(deviation)
                } else {
                    0.0
                }
            }
            Self::Tiered => tiered(deviation),
            Self::Penalty => -deviation,
            Self::ToleranceBonus { bonus } => {
                if deviation <= SPARSE_TOLERANCE_KCAL {
                    bonus
                } else {
                    -deviation
                }
            }
        }
    }
}

/// Which selected meals a per-meal shaping term is scored on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapingScope {
    /// Only the meal chosen by the current step
    #[default]
    LastMeal,
    /// Every meal selected so far, re-scored on each step
    AllSelected,
}

/// Per-meal protein shortfall penalty and bonus
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProteinShaping {
    /// Grams below which a shortfall penalty applies
    pub floor_g: f64,
    /// Penalty per gram of shortfall
    pub shortfall_weight: f64,
    /// Grams at or above which the bonus applies
    pub bonus_threshold_g: f64,
    /// Bonus value
    pub bonus: f64,
    /// Meals the shaping is scored on
    #[serde(default)]
    pub scope: ShapingScope,
}

impl Default for ProteinShaping {
    fn default() -> Self {
        Self {
            floor_g: PROTEIN_FLOOR_G,
            shortfall_weight: PROTEIN_SHORTFALL_WEIGHT,
            bonus_threshold_g: PROTEIN_BONUS_THRESHOLD_G,
            bonus: PROTEIN_BONUS,
            scope: ShapingScope::LastMeal,
        }
    }
}

impl ProteinShaping {
    fn score(&self, ctx: &RewardContext<'_>) -> f64 {
        match self.scope {
            ShapingScope::LastMeal => ctx.last_meal().map_or(0.0, |meal| self.score_meal(meal)),
            ShapingScope::AllSelected => {
                ctx.selected_meals().map(|meal| self.score_meal(meal)).sum()
            }
        }
    }

    fn score_meal(&self, meal: &Meal) -> f64 {
        let protein = meal.macros.protein;
        let shortfall = (self.floor_g - protein).max(0.0);
        let bonus = if protein >= self.bonus_threshold_g {
            self.bonus
        } else {
            0.0
        };
        bonus - self.shortfall_weight * shortfall
    }
}

/// Penalty on fat above a per-meal ceiling, summed over the selection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FatShaping {
    /// Per-meal fat ceiling in grams
    pub ceiling_g: f64,
}

impl Default for FatShaping {
    fn default() -> Self {
        Self {
            ceiling_g: FAT_CEILING_G,
        }
    }
}

/// Calorie term plus optional macro shaping
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroAwareReward {
    /// Calorie component
    pub deviation: DeviationTerm,
    /// Protein shaping
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein: Option<ProteinShaping>,
    /// Fat penalty over all selected meals
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fat: Option<FatShaping>,
}

impl MacroAwareReward {
    /// Tolerance-bonus calorie term with default protein shaping
    #[must_use]
    pub fn protein_focused() -> Self {
        Self {
            deviation: DeviationTerm::ToleranceBonus {
                bonus: TOLERANCE_BONUS,
            },
            protein: Some(ProteinShaping::default()),
            fat: None,
        }
    }

    /// Plain deviation penalty with protein floor and fat ceiling, both
    /// summed over every selected meal on each step
    #[must_use]
    pub fn protein_and_fat() -> Self {
        Self {
            deviation: DeviationTerm::Penalty,
            protein: Some(ProteinShaping {
                bonus: 0.0,
                shortfall_weight: 1.0,
                scope: ShapingScope::AllSelected,
                ..ProteinShaping::default()
            }),
            fat: Some(FatShaping::default()),
        }
    }

    fn score(&self, ctx: &RewardContext<'_>) -> f64 {
        let mut reward = self.deviation.score(ctx);
        if let Some(protein) = self.protein.as_ref() {
            reward += protein.score(ctx);
        }
        if let Some(fat) = self.fat.as_ref() {
            let excess: f64 = ctx
                .selected_meals()
                .map(|meal| (meal.macros.fat - fat.ceiling_g).max(0.0))
                .sum();
            reward -= excess;
        }
        reward
    }
}

/// Reward variant used by an environment
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum RewardPolicy {
    /// Zero until the plan is complete, then the banded penalty
    #[default]
    SparseTerminal,
    /// Tiered reward computed on every step
    TieredShaped,
    /// Calorie term plus protein and fat shaping
    MacroAware(MacroAwareReward),
}

impl RewardPolicy {
    /// Score one step
    #[must_use]
    pub fn reward(&self, ctx: &RewardContext<'_>) -> f64 {
        match self {
            Self::SparseTerminal => DeviationTerm::SparseTerminal.score(ctx),
            Self::TieredShaped => DeviationTerm::Tiered.score(ctx),
            Self::MacroAware(shaping) => shaping.score(ctx),
        }
    }

    /// Short name for logs
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SparseTerminal => "sparse_terminal",
            Self::TieredShaped => "tiered_shaped",
            Self::MacroAware(_) => "macro_aware",
        }
    }
}

impl fmt::Display for RewardPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RewardPolicy {
    type Err = ConfigError;

    /// Accepts `sparse`, `tiered`, `protein` and `protein-fat` (plus the
    /// snake_case policy names)
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "sparse" | "sparse_terminal" => Ok(Self::SparseTerminal),
            "tiered" | "tiered_shaped" => Ok(Self::TieredShaped),
            "protein" | "macro_aware" => Ok(Self::MacroAware(MacroAwareReward::protein_focused())),
            "protein_fat" => Ok(Self::MacroAware(MacroAwareReward::protein_and_fat())),
            other => Err(ConfigError::Parse(format!(
                "unknown reward policy '{other}' (expected sparse, tiered, protein or protein-fat)"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meal_planner_core::models::Macros;

    fn meals() -> Vec<Meal> {
        vec![
            Meal::new(1, "a", 500, Macros::new(20.0, 50.0, 30.0), ["x"]),
            Meal::new(2, "b", 500, Macros::new(35.0, 40.0, 10.0), ["y"]),
        ]
    }

    fn ctx<'a>(meals: &'a [Meal], state: &'a [usize], total: i64, done: bool) -> RewardContext<'a> {
        RewardContext {
            target_calories: 1800,
            total_calories: total,
            meals,
            state,
            done,
        }
    }

    #[test]
    fn test_sparse_terminal_bands() {
        let meals = meals();
        let policy = RewardPolicy::SparseTerminal;
        assert!(policy.reward(&ctx(&meals, &[0], 500, false)).abs() < f64::EPSILON);
        assert!((policy.reward(&ctx(&meals, &[0], 1750, true)) + 50.0).abs() < f64::EPSILON);
        assert!((policy.reward(&ctx(&meals, &[0], 1900, true)) + 100.0).abs() < f64::EPSILON);
        assert!((policy.reward(&ctx(&meals, &[0], 2100, true)) + 600.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_tiered_bands() {
        let meals = meals();
        let policy = RewardPolicy::TieredShaped;
        assert!((policy.reward(&ctx(&meals, &[0], 1780, false)) - 80.0).abs() < f64::EPSILON);
        assert!((policy.reward(&ctx(&meals, &[0], 1900, true)) + 100.0).abs() < f64::EPSILON);
        assert!((policy.reward(&ctx(&meals, &[0], 2000, true)) + 400.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_protein_shaping_uses_last_meal() {
        let meals = meals();
        let policy = RewardPolicy::MacroAware(MacroAwareReward::protein_focused());
        // Meal a: 5 g short of the floor, inside tolerance
        let reward = policy.reward(&ctx(&meals, &[1, 0], 1750, false));
        assert!((reward - 0.0).abs() < f64::EPSILON);
        // Meal b: bonus, outside tolerance
        let reward = policy.reward(&ctx(&meals, &[0, 1], 1000, false));
        assert!((reward - (-800.0 + 10.0)).abs() < f64::EPSILON);
    }

    #[test]
    fn test_protein_and_fat_rescores_every_selected_meal() {
        let lean = vec![
            Meal::new(1, "a", 900, Macros::new(10.0, 80.0, 10.0), ["x"]),
            Meal::new(2, "b", 900, Macros::new(10.0, 80.0, 10.0), ["y"]),
        ];
        let policy = RewardPolicy::MacroAware(MacroAwareReward::protein_and_fat());
        // 15 g short on each meal, on target, no fat over the ceiling
        let reward = policy.reward(&ctx(&lean, &[0, 1], 1800, false));
        assert!((reward + 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shaping_scope_defaults_to_last_meal() {
        let shaping: ProteinShaping = serde_json::from_value(serde_json::json!({
            "floor_g": 25.0,
            "shortfall_weight": 2.0,
            "bonus_threshold_g": 30.0,
            "bonus": 10.0,
        }))
        .unwrap();
        assert_eq!(shaping.scope, ShapingScope::LastMeal);
    }

    #[test]
    fn test_fat_penalty_sums_selection() {
        let meals = meals();
        let policy = RewardPolicy::MacroAware(MacroAwareReward {
            deviation: DeviationTerm::Penalty,
            protein: None,
            fat: Some(FatShaping::default()),
        });
        let reward = policy.reward(&ctx(&meals, &[0, 1, 0], 1800, false));
        assert!((reward + 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_policy_names_parse() {
        assert_eq!("tiered".parse::<RewardPolicy>().unwrap(), RewardPolicy::TieredShaped);
        assert_eq!(
            "protein-fat".parse::<RewardPolicy>().unwrap(),
            RewardPolicy::MacroAware(MacroAwareReward::protein_and_fat())
        );
        assert!("greedy".parse::<RewardPolicy>().is_err());
    }

    #[test]
    fn test_policy_serde_tagging() {
        let policy = RewardPolicy::MacroAware(MacroAwareReward::protein_and_fat());
        let json = serde_json::to_value(policy).unwrap();
        assert_eq!(json["policy"], "macro_aware");
        assert_eq!(json["deviation"]["kind"], "penalty");
        assert_eq!(json["protein"]["scope"], "all_selected");
        let back: RewardPolicy = serde_json::from_value(json).unwrap();
        assert_eq!(back, RewardPolicy::MacroAware(MacroAwareReward::protein_and_fat()));
    }
}
