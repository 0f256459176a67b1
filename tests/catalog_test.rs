// ABOUTME: Integration tests for the JSON file recipe catalog
// ABOUTME: Covers loading, ingredient normalization, reloading, and missing-file errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{mixed_catalog, six_meals, write_catalog};
use meal_planner::catalog::{CatalogLoadOptions, JsonFileCatalog};
use meal_planner_core::errors::ErrorCode;
use meal_planner_rl::MealCatalog;
use std::fs;
use tempfile::TempDir;

#[tokio::test]
async fn test_open_lists_meals_in_file_order() {
    let dir = TempDir::new().unwrap();
    let path = write_catalog(dir.path(), &mixed_catalog());
    let catalog = JsonFileCatalog::open(&path, CatalogLoadOptions::default())
        .await
        .unwrap();

    let meals = catalog.list_all_meals().await.unwrap();
    assert_eq!(meals.len(), 12);
    assert_eq!(meals[0].name, "Lentil Curry");
    assert_eq!(meals[11].id, 12);
    assert!(catalog.describe().contains("recipes.json"));
}

#[tokio::test]
async fn test_ingredients_are_normalized_on_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("recipes.json");
    fs::write(
        &path,
        r#"[{"name": "Breakfast", "calories": 410,
             "macros": {"protein": 20, "carbs": 30, "fat": 18},
             "ingredients": ["  Whole Milk ", "EGGS"]}]"#,
    )
    .unwrap();

    let normalized = JsonFileCatalog::open(&path, CatalogLoadOptions::default())
        .await
        .unwrap();
    let meal = &normalized.list_all_meals().await.unwrap()[0];
    assert_eq!(meal.id, 1);
    assert!(meal.ingredients.contains("eggs"));
    assert!(!meal.ingredients.contains("EGGS"));

    let raw = JsonFileCatalog::open(
        &path,
        CatalogLoadOptions {
            normalize_ingredients: false,
            ..CatalogLoadOptions::default()
        },
    )
    .await
    .unwrap();
    assert!(raw.list_all_meals().await.unwrap()[0]
        .ingredients
        .contains("EGGS"));
}

#[tokio::test]
async fn test_reload_picks_up_edits() {
    let dir = TempDir::new().unwrap();
    let path = write_catalog(dir.path(), &six_meals());
    let catalog = JsonFileCatalog::open(&path, CatalogLoadOptions::default())
        .await
        .unwrap();
    assert_eq!(catalog.len().await, 6);

    write_catalog(dir.path(), &mixed_catalog());
    assert_eq!(catalog.reload().await.unwrap(), 12);
    assert_eq!(catalog.list_all_meals().await.unwrap().len(), 12);
}

#[tokio::test]
async fn test_failed_reload_keeps_previous_meals() {
    let dir = TempDir::new().unwrap();
    let path = write_catalog(dir.path(), &six_meals());
    let catalog = JsonFileCatalog::open(&path, CatalogLoadOptions::default())
        .await
        .unwrap();

    fs::write(&path, b"not json").unwrap();
    let err = catalog.reload().await.unwrap_err();
    assert_eq!(err.code, ErrorCode::SerializationError);
    assert_eq!(catalog.len().await, 6);
}

#[tokio::test]
async fn test_missing_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let result =
        JsonFileCatalog::open(dir.path().join("absent.json"), CatalogLoadOptions::default()).await;
    assert!(result.is_err());
}
