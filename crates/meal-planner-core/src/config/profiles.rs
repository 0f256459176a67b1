// ABOUTME: Dietary profile configuration and the built-in profile registry
// ABOUTME: Maps profile names to meal filters and allowed calorie target sweeps
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Dietary profiles restrict the meal universe and the calorie targets a
//! model is trained for.

use crate::constants::ingredients::{PESCATARIAN_BANNED, POULTRY_BANNED, VEGAN_BANNED};
use crate::errors::PlannerError;
use crate::models::Meal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Macronutrient a predicate is evaluated against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MacroField {
    /// Protein grams
    Protein,
    /// Carbohydrate grams
    Carbs,
    /// Fat grams
    Fat,
}

impl MacroField {
    /// Read this field from a meal
    #[must_use]
    pub const fn value(self, meal: &Meal) -> f64 {
        match self {
            Self::Protein => meal.macros.protein,
            Self::Carbs => meal.macros.carbs,
            Self::Fat => meal.macros.fat,
        }
    }
}

/// Comparison operator for macro predicates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    /// Strictly greater
    GreaterThan,
    /// Greater or equal
    GreaterOrEqual,
    /// Strictly less
    LessThan,
    /// Less or equal
    LessOrEqual,
}

impl Comparison {
    /// Apply the comparison
    #[must_use]
    pub fn holds(self, value: f64, threshold: f64) -> bool {
        match self {
            Self::GreaterThan => value > threshold,
            Self::GreaterOrEqual => value >= threshold,
            Self::LessThan => value < threshold,
            Self::LessOrEqual => value <= threshold,
        }
    }
}

/// Membership rule for a dietary profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProfileFilter {
    /// Reject meals containing any of these ingredients
    BannedIngredients {
        /// Banned canonical ingredient names
        banned: BTreeSet<String>,
    },
    /// Keep meals whose macro satisfies `field cmp threshold`
    MacroPredicate {
        /// Macro to inspect
        field: MacroField,
        /// Operator
        cmp: Comparison,
        /// Threshold in grams
        threshold: f64,
    },
    /// Keep every meal
    NoFilter,
}

impl ProfileFilter {
    /// Build a banned-ingredient filter from a static list
    #[must_use]
    pub fn banned(list: &[&str]) -> Self {
        Self::BannedIngredients {
            banned: list.iter().map(|&item| item.to_owned()).collect(),
        }
    }

    /// Whether `meal` belongs to this profile's universe
    #[must_use]
    pub fn admits(&self, meal: &Meal) -> bool {
        match self {
            Self::BannedIngredients { banned } => !meal.contains_any(banned),
            Self::MacroPredicate {
                field,
                cmp,
                threshold,
            } => cmp.holds(field.value(meal), *threshold),
            Self::NoFilter => true,
        }
    }

    /// Produce the filtered universe, preserving catalog order
    #[must_use]
    pub fn apply(&self, meals: &[Meal]) -> Vec<Meal> {
        meals
            .iter()
            .filter(|meal| self.admits(meal))
            .cloned()
            .collect()
    }
}

/// Allowed calorie targets for a profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetSweep {
    /// Inclusive arithmetic range
    Range {
        /// First target
        start: u32,
        /// Last target (inclusive)
        end: u32,
        /// Increment
        step: u32,
    },
    /// Explicit list
    List {
        /// Allowed targets
        targets: Vec<u32>,
    },
}

impl TargetSweep {
    /// Inclusive range helper
    #[must_use]
    pub const fn range(start: u32, end: u32, step: u32) -> Self {
        Self::Range { start, end, step }
    }

    /// Whether `target` is one of the allowed values
    #[must_use]
    pub fn contains(&self, target: u32) -> bool {
        match self {
            Self::Range { start, end, step } => {
                *step > 0 && target >= *start && target <= *end && (target - start) % step == 0
            }
            Self::List { targets } => targets.contains(&target),
        }
    }

    /// Every allowed target in ascending order
    #[must_use]
    pub fn targets(&self) -> Vec<u32> {
        match self {
            Self::Range { start, end, step } => {
                if *step == 0 {
                    return Vec::new();
                }
                (*start..=*end).step_by(*step as usize).collect()
            }
            Self::List { targets } => {
                let mut sorted = targets.clone();
                sorted.sort_unstable();
                sorted.dedup();
                sorted
            }
        }
    }
}

impl fmt::Display for TargetSweep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Range { start, end, step } => write!(f, "{start}-{end} step {step}"),
            Self::List { targets } => {
                let joined: Vec<String> = targets.iter().map(ToString::to_string).collect();
                write!(f, "{}", joined.join(", "))
            }
        }
    }
}

/// A named dietary profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DietaryProfile {
    /// Registry key (e.g. "vegan")
    pub name: String,
    /// Short description for listings
    pub description: String,
    /// Membership rule
    pub filter: ProfileFilter,
    /// Allowed calorie targets
    pub targets: TargetSweep,
}

impl DietaryProfile {
    /// Create a profile
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        filter: ProfileFilter,
        targets: TargetSweep,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            filter,
            targets,
        }
    }

    /// Filter the catalog down to this profile's universe
    #[must_use]
    pub fn filter_meals(&self, meals: &[Meal]) -> Vec<Meal> {
        self.filter.apply(meals)
    }

    /// Validate a requested target against the allowed sweep
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::InvalidTarget`] when the target is not allowed
    pub fn ensure_target(&self, target: u32) -> Result<(), PlannerError> {
        if self.targets.contains(target) {
            Ok(())
        } else {
            Err(PlannerError::InvalidTarget {
                profile: self.name.clone(),
                target,
                allowed: self.targets.to_string(),
            })
        }
    }
}

/// Registry of known dietary profiles
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileRegistry {
    profiles: BTreeMap<String, DietaryProfile>,
}

impl ProfileRegistry {
    /// Empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in profiles
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(DietaryProfile::new(
            "vegan",
            "No animal products",
            ProfileFilter::banned(VEGAN_BANNED),
            TargetSweep::range(800, 1400, 100),
        ));
        registry.register(DietaryProfile::new(
            "high-protein",
            "Every meal above 25 g protein",
            ProfileFilter::MacroPredicate {
                field: MacroField::Protein,
                cmp: Comparison::GreaterThan,
                threshold: 25.0,
            },
            TargetSweep::range(1200, 2600, 100),
        ));
        registry.register(DietaryProfile::new(
            "low-carb",
            "Every meal below 40 g carbohydrates",
            ProfileFilter::MacroPredicate {
                field: MacroField::Carbs,
                cmp: Comparison::LessThan,
                threshold: 40.0,
            },
            TargetSweep::range(1000, 1500, 100),
        ));
        registry.register(DietaryProfile::new(
            "pescatarian",
            "Seafood allowed, no meat or poultry",
            ProfileFilter::banned(PESCATARIAN_BANNED),
            TargetSweep::range(1200, 2600, 100),
        ));
        registry.register(DietaryProfile::new(
            "poultry",
            "Poultry allowed, no red meat or seafood",
            ProfileFilter::banned(POULTRY_BANNED),
            TargetSweep::range(1200, 2600, 100),
        ));
        registry.register(DietaryProfile::new(
            "omnivore",
            "No restrictions",
            ProfileFilter::NoFilter,
            TargetSweep::range(1200, 2600, 100),
        ));
        registry
    }

    /// Add or replace a profile
    pub fn register(&mut self, profile: DietaryProfile) {
        self.profiles.insert(profile.name.clone(), profile);
    }

    /// Look up a profile by name
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::InvalidProfile`] for unknown names
    pub fn get(&self, name: &str) -> Result<&DietaryProfile, PlannerError> {
        self.profiles
            .get(name)
            .ok_or_else(|| PlannerError::InvalidProfile {
                profile: name.to_owned(),
            })
    }

    /// Registered profile names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    /// Iterate over all profiles
    pub fn iter(&self) -> impl Iterator<Item = &DietaryProfile> {
        self.profiles.values()
    }
}
