// ABOUTME: Meal catalog models for plan recommendation
// ABOUTME: Meal and Macros definitions with macro arithmetic helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::constants::energy::{KCAL_PER_G_CARBS, KCAL_PER_G_FAT, KCAL_PER_G_PROTEIN};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Macronutrient content of a meal in grams
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Macros {
    /// Protein in grams
    pub protein: f64,
    /// Carbohydrates in grams
    pub carbs: f64,
    /// Fat in grams
    #[serde(alias = "fats")]
    pub fat: f64,
}

impl Macros {
    /// Create a macro breakdown
    #[must_use]
    pub const fn new(protein: f64, carbs: f64, fat: f64) -> Self {
        Self {
            protein,
            carbs,
            fat,
        }
    }

    /// Energy implied by the macros (4/4/9 kcal per gram)
    #[must_use]
    pub fn calories(&self) -> f64 {
        self.fat.mul_add(
            KCAL_PER_G_FAT,
            self.protein
                .mul_add(KCAL_PER_G_PROTEIN, self.carbs * KCAL_PER_G_CARBS),
        )
    }
}

impl Add for Macros {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            protein: self.protein + rhs.protein,
            carbs: self.carbs + rhs.carbs,
            fat: self.fat + rhs.fat,
        }
    }
}

impl AddAssign for Macros {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for Macros {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

/// Immutable meal catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    /// Catalog identifier
    pub id: i64,
    /// Display name
    pub name: String,
    /// Energy in kcal
    pub calories: i32,
    /// Macronutrient breakdown
    pub macros: Macros,
    /// Canonical ingredient names
    pub ingredients: BTreeSet<String>,
    /// Optional image reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

impl Meal {
    /// Create a meal without an image reference
    pub fn new<I, S>(
        id: i64,
        name: impl Into<String>,
        calories: i32,
        macros: Macros,
        ingredients: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id,
            name: name.into(),
            calories,
            macros,
            ingredients: ingredients.into_iter().map(Into::into).collect(),
            photo_url: None,
        }
    }

    /// Whether any ingredient of this meal appears in `banned`
    #[must_use]
    pub fn contains_any(&self, banned: &BTreeSet<String>) -> bool {
        !self.ingredients.is_disjoint(banned)
    }
}
