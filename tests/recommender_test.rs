// ABOUTME: Integration tests for trained recommendations across dietary profiles
// ABOUTME: Covers dietary filters, convergence, determinism, nearest-target fallback, and error paths
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{
    fast_trainer, mixed_catalog, open_profile, registry_with, six_meals, trained_recommender,
};
use meal_planner_core::config::{
    Comparison, DietaryProfile, MacroField, ProfileFilter, ProfileRegistry, TargetSweep,
};
use meal_planner_core::constants::ingredients::VEGAN_BANNED;
use meal_planner_core::constants::MEALS_PER_PLAN;
use meal_planner_core::errors::{AppError, PlannerError};
use meal_planner_rl::config::RecommenderConfig;
use meal_planner_rl::reward::RewardPolicy;
use meal_planner_rl::trainer::train_sweep;
use meal_planner_rl::{
    ArtifactStore, InMemoryArtifactStore, InMemoryCatalog, MealCatalog, Recommender,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;
use std::sync::Arc;

fn planner_error(error: &AppError) -> &PlannerError {
    error.planner_error().expect("expected a planner error")
}

// ============================================================================
// Dietary filters
// ============================================================================

#[tokio::test]
async fn test_vegan_plans_never_contain_banned_ingredients() {
    let recommender = trained_recommender(
        ProfileRegistry::builtin(),
        "vegan",
        mixed_catalog(),
        &[1300, 1400],
        3_000,
    );
    let banned: HashSet<&str> = VEGAN_BANNED.iter().copied().collect();

    for seed in 0..20 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let plan = recommender
            .recommend_with_rng("vegan", 1400, &mut rng)
            .await
            .unwrap();
        assert_eq!(plan.meals.len(), MEALS_PER_PLAN);
        for meal in &plan.meals {
            assert!(
                meal.ingredients.iter().all(|i| !banned.contains(i.as_str())),
                "{} is not vegan",
                meal.name
            );
        }
    }
}

#[tokio::test]
async fn test_high_protein_plans_only_use_protein_rich_meals() {
    let recommender = trained_recommender(
        ProfileRegistry::builtin(),
        "high-protein",
        mixed_catalog(),
        &[1800],
        3_000,
    );

    let plan = recommender.recommend("high-protein", 1800).await.unwrap();
    assert_eq!(plan.meals.len(), MEALS_PER_PLAN);
    assert!(plan.meals.iter().all(|meal| meal.macros.protein > 25.0));
}

#[tokio::test]
async fn test_plans_have_distinct_meals_from_the_catalog() {
    let catalog = mixed_catalog();
    let ids: HashSet<i64> = catalog.iter().map(|meal| meal.id).collect();
    let recommender =
        trained_recommender(ProfileRegistry::builtin(), "omnivore", catalog, &[2000], 3_000);

    let plan = recommender.recommend("omnivore", 2000).await.unwrap();
    let chosen: HashSet<i64> = plan.meals.iter().map(|meal| meal.id).collect();
    assert_eq!(chosen.len(), MEALS_PER_PLAN);
    assert!(chosen.is_subset(&ids));
    assert_eq!(
        plan.total_calories,
        plan.meals.iter().map(|meal| i64::from(meal.calories)).sum::<i64>()
    );
}

// ============================================================================
// Convergence and determinism
// ============================================================================

#[tokio::test]
async fn test_six_meal_catalog_converges_near_target() {
    let recommender =
        trained_recommender(ProfileRegistry::builtin(), "omnivore", six_meals(), &[1800], 30_000);

    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let plan = recommender
        .recommend_with_rng("omnivore", 1800, &mut rng)
        .await
        .unwrap();
    assert_eq!(plan.fallback_steps, 0);
    assert!(plan.deviation() <= 100, "deviation {}", plan.deviation());
}

#[tokio::test]
async fn test_repeated_requests_return_identical_plans() {
    let recommender =
        trained_recommender(ProfileRegistry::builtin(), "omnivore", six_meals(), &[1800], 30_000);

    let first = recommender.recommend("omnivore", 1800).await.unwrap();
    let second = recommender.recommend("omnivore", 1800).await.unwrap();
    assert_eq!(first.fallback_steps, 0);
    assert_eq!(first.meals, second.meals);
}

#[tokio::test]
async fn test_nearest_target_uses_closest_bucket() {
    let registry = registry_with(open_profile("test-open", &[1500, 1800]));
    let recommender = trained_recommender(registry, "test-open", six_meals(), &[1500, 1800], 2_000);
    let mut rng = ChaCha8Rng::seed_from_u64(9);

    let plan = recommender
        .recommend_nearest("test-open", 1700, &mut rng)
        .await
        .unwrap();
    assert_eq!(plan.requested_target, 1700);
    assert_eq!(plan.bucket_target, 1800);

    // Equidistant requests go to the lower bucket
    let plan = recommender
        .recommend_nearest("test-open", 1650, &mut rng)
        .await
        .unwrap();
    assert_eq!(plan.bucket_target, 1500);
}

// ============================================================================
// Error paths
// ============================================================================

#[tokio::test]
async fn test_request_validation_errors() {
    let recommender =
        trained_recommender(ProfileRegistry::builtin(), "omnivore", six_meals(), &[1800], 500);

    let err = recommender.recommend("keto", 1800).await.unwrap_err();
    assert!(matches!(planner_error(&err), PlannerError::InvalidProfile { .. }));

    let err = recommender.recommend("omnivore", 1850).await.unwrap_err();
    assert!(matches!(planner_error(&err), PlannerError::InvalidTarget { target: 1850, .. }));

    let err = recommender.recommend("omnivore", 1900).await.unwrap_err();
    assert!(matches!(planner_error(&err), PlannerError::BucketNotTrained { target: 1900, .. }));

    let err = recommender.recommend("vegan", 1000).await.unwrap_err();
    assert!(matches!(planner_error(&err), PlannerError::ModelNotFound { .. }));
}

#[test]
fn test_training_a_tiny_universe_is_catalog_empty() {
    let picky = DietaryProfile::new(
        "picky",
        "Almost nothing qualifies",
        ProfileFilter::MacroPredicate {
            field: MacroField::Protein,
            cmp: Comparison::GreaterThan,
            threshold: 40.0,
        },
        TargetSweep::List {
            targets: vec![1200],
        },
    );
    let err = train_sweep(
        &picky,
        &mixed_catalog(),
        &RewardPolicy::SparseTerminal,
        &fast_trainer(10, 1),
        None,
    )
    .unwrap_err();
    assert!(matches!(
        planner_error(&err),
        PlannerError::CatalogEmpty { available: 2, .. }
    ));
}

#[tokio::test]
async fn test_strict_catalog_check_detects_drift() {
    let registry = ProfileRegistry::builtin();
    let definition = registry.get("omnivore").unwrap().clone();
    let (artifact, _) = train_sweep(
        &definition,
        &six_meals(),
        &RewardPolicy::SparseTerminal,
        &fast_trainer(500, 3),
        Some(&[1800]),
    )
    .unwrap();
    let store = InMemoryArtifactStore::new();
    store.save(&artifact).unwrap();

    let catalog = Arc::new(InMemoryCatalog::new(six_meals()));
    let strict = Recommender::new(
        Arc::clone(&catalog) as Arc<dyn MealCatalog>,
        Arc::new(store),
        registry,
        RecommenderConfig {
            strict_catalog_check: true,
        },
    );
    assert!(strict.recommend("omnivore", 1800).await.is_ok());

    let mut edited = six_meals();
    edited[0].calories = 320;
    catalog.replace(edited).await;
    let err = strict.recommend("omnivore", 1800).await.unwrap_err();
    assert!(matches!(planner_error(&err), PlannerError::CatalogMismatch { .. }));
}

#[tokio::test]
async fn test_catalog_shrinking_below_plan_size_is_catalog_empty() {
    let registry = ProfileRegistry::builtin();
    let definition = registry.get("omnivore").unwrap().clone();
    let (artifact, _) = train_sweep(
        &definition,
        &six_meals(),
        &RewardPolicy::SparseTerminal,
        &fast_trainer(500, 3),
        Some(&[1800]),
    )
    .unwrap();
    let store = InMemoryArtifactStore::new();
    store.save(&artifact).unwrap();

    let catalog = Arc::new(InMemoryCatalog::new(six_meals()));
    let recommender = Recommender::new(
        Arc::clone(&catalog) as Arc<dyn MealCatalog>,
        Arc::new(store),
        registry,
        RecommenderConfig::default(),
    );
    assert!(recommender.recommend("omnivore", 1800).await.is_ok());

    catalog
        .replace(six_meals().into_iter().take(3).collect())
        .await;
    let err = recommender.recommend("omnivore", 1800).await.unwrap_err();
    assert!(matches!(
        planner_error(&err),
        PlannerError::CatalogEmpty {
            available: 3,
            required: MEALS_PER_PLAN,
            ..
        }
    ));
}
