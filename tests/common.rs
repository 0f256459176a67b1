// ABOUTME: Shared test utilities and fixtures for integration tests
// ABOUTME: Provides synthetic catalogs, fast trainers, and helpers to train and serve profiles
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used
)]
//! Shared test utilities for `meal_planner`
//!
//! Fixtures are small enough that training finishes in well under a second
//! with the test profile's optimisation level.

use meal_planner::catalog::RecipeRecord;
use meal_planner_core::config::{DietaryProfile, ProfileFilter, ProfileRegistry, TargetSweep};
use meal_planner_core::models::{Macros, Meal};
use meal_planner_rl::config::{RecommenderConfig, TrainingConfig};
use meal_planner_rl::reward::RewardPolicy;
use meal_planner_rl::trainer::{train_sweep, QLearningTrainer};
use meal_planner_rl::{ArtifactStore, InMemoryArtifactStore, InMemoryCatalog, Recommender};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Calories of the six-meal convergence fixture
pub const SIX_MEAL_CALORIES: [i32; 6] = [300, 400, 500, 350, 450, 600];

/// Six plain meals with the fixture calories
pub fn six_meals() -> Vec<Meal> {
    SIX_MEAL_CALORIES
        .iter()
        .enumerate()
        .map(|(i, &calories)| {
            Meal::new(
                i as i64 + 1,
                format!("Meal {}", i + 1),
                calories,
                Macros::new(20.0, 40.0, 10.0),
                ["rice"],
            )
        })
        .collect()
}

/// Mixed catalog with vegan, meat, seafood, and high-protein meals
pub fn mixed_catalog() -> Vec<Meal> {
    let rows: [(&str, i32, f64, f64, f64, &[&str]); 12] = [
        ("Lentil Curry", 420, 22.0, 60.0, 8.0, &["lentils", "basmati rice", "onion"]),
        ("Chicken Bowl", 550, 45.0, 50.0, 12.0, &["chicken breast", "basmati rice"]),
        ("Tofu Stir Fry", 380, 28.0, 30.0, 14.0, &["tofu", "broccoli", "soy sauce"]),
        ("Beef Chili", 610, 40.0, 35.0, 25.0, &["ground beef", "beans", "tomato"]),
        ("Oat Porridge", 300, 10.0, 55.0, 6.0, &["oats", "banana"]),
        ("Salmon Plate", 520, 38.0, 20.0, 22.0, &["salmon fillet", "potato"]),
        ("Chickpea Salad", 350, 15.0, 40.0, 12.0, &["chickpeas", "cucumber"]),
        ("Omelette", 330, 26.0, 4.0, 22.0, &["eggs", "cheese", "spinach"]),
        ("Veggie Pasta", 480, 16.0, 80.0, 9.0, &["pasta", "tomato", "zucchini"]),
        ("Turkey Wrap", 450, 32.0, 42.0, 14.0, &["turkey slices", "tortilla"]),
        ("Bean Burrito", 510, 20.0, 70.0, 14.0, &["beans", "tortilla", "avocado"]),
        ("Steak Salad", 560, 48.0, 12.0, 30.0, &["steak", "lettuce"]),
    ];
    rows.iter()
        .enumerate()
        .map(|(i, (name, calories, protein, carbs, fat, ingredients))| {
            Meal::new(
                i as i64 + 1,
                *name,
                *calories,
                Macros::new(*protein, *carbs, *fat),
                ingredients.iter().copied(),
            )
        })
        .collect()
}

/// Catalog file records for a list of meals
pub fn records(meals: &[Meal]) -> Vec<RecipeRecord> {
    meals
        .iter()
        .map(|meal| RecipeRecord {
            id: Some(meal.id),
            name: meal.name.clone(),
            calories: f64::from(meal.calories),
            macros: meal.macros,
            ingredients: meal.ingredients.iter().cloned().collect(),
            photo_url: None,
        })
        .collect()
}

/// Write `meals` as a JSON catalog under `dir`
pub fn write_catalog(dir: &Path, meals: &[Meal]) -> PathBuf {
    let path = dir.join("recipes.json");
    fs::write(&path, serde_json::to_vec_pretty(&records(meals)).unwrap()).unwrap();
    path
}

/// Seeded trainer with progress sampling disabled
pub fn fast_trainer(episodes: u64, seed: u64) -> QLearningTrainer {
    QLearningTrainer::new(TrainingConfig {
        episodes,
        log_interval: 0,
        seed: Some(seed),
        ..TrainingConfig::default()
    })
    .unwrap()
}

/// Unrestricted profile with an explicit target list
pub fn open_profile(name: &str, targets: &[u32]) -> DietaryProfile {
    DietaryProfile::new(
        name,
        "Test profile",
        ProfileFilter::NoFilter,
        TargetSweep::List {
            targets: targets.to_vec(),
        },
    )
}

/// Registry holding the built-ins plus `extra`
pub fn registry_with(extra: DietaryProfile) -> ProfileRegistry {
    let mut registry = ProfileRegistry::builtin();
    registry.register(extra);
    registry
}

/// Train `profile` on `meals`, store the artifact in memory, and return a recommender
pub fn trained_recommender(
    registry: ProfileRegistry,
    profile: &str,
    meals: Vec<Meal>,
    targets: &[u32],
    episodes: u64,
) -> Recommender {
    let definition = registry.get(profile).unwrap().clone();
    let trainer = fast_trainer(episodes, 42);
    let (artifact, _) = train_sweep(
        &definition,
        &meals,
        &RewardPolicy::SparseTerminal,
        &trainer,
        Some(targets),
    )
    .unwrap();

    let store = InMemoryArtifactStore::new();
    store.save(&artifact).unwrap();
    Recommender::new(
        Arc::new(InMemoryCatalog::new(meals)),
        Arc::new(store),
        registry,
        RecommenderConfig::default(),
    )
}
