// ABOUTME: Meal catalog abstraction consumed by training and inference
// ABOUTME: Async MealCatalog trait, an in-memory implementation, and universe fingerprinting
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;
use meal_planner_core::errors::AppResult;
use meal_planner_core::models::Meal;
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;

/// Source of the live meal catalog
#[async_trait]
pub trait MealCatalog: Send + Sync {
    /// Every meal in catalog order
    async fn list_all_meals(&self) -> AppResult<Vec<Meal>>;

    /// Human-readable source description for logs
    fn describe(&self) -> String {
        "catalog".to_owned()
    }
}

/// Catalog held in memory; contents can be swapped at runtime
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    meals: RwLock<Vec<Meal>>,
}

impl InMemoryCatalog {
    /// Catalog with the given meals
    #[must_use]
    pub fn new(meals: Vec<Meal>) -> Self {
        Self {
            meals: RwLock::new(meals),
        }
    }

    /// Replace the catalog contents
    pub async fn replace(&self, meals: Vec<Meal>) {
        *self.meals.write().await = meals;
    }
}

#[async_trait]
impl MealCatalog for InMemoryCatalog {
    async fn list_all_meals(&self) -> AppResult<Vec<Meal>> {
        Ok(self.meals.read().await.clone())
    }

    fn describe(&self) -> String {
        "in-memory catalog".to_owned()
    }
}

/// SHA-256 over the ids and calories of a filtered universe, in order
///
/// Two universes with the same fingerprint map meal indices to the same
/// meals, so a trained table stays meaningful across restarts.
#[must_use]
pub fn fingerprint(meals: &[Meal]) -> String {
    let mut hasher = Sha256::new();
    for meal in meals {
        hasher.update(meal.id.to_le_bytes());
        hasher.update(meal.calories.to_le_bytes());
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use meal_planner_core::models::Macros;

    fn meal(id: i64, calories: i32) -> Meal {
        Meal::new(id, "m", calories, Macros::default(), ["rice"])
    }

    #[test]
    fn test_fingerprint_is_order_sensitive() {
        let a = fingerprint(&[meal(1, 300), meal(2, 400)]);
        let b = fingerprint(&[meal(2, 400), meal(1, 300)]);
        assert_ne!(a, b);
        assert_eq!(a, fingerprint(&[meal(1, 300), meal(2, 400)]));
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_fingerprint_tracks_calorie_edits() {
        assert_ne!(
            fingerprint(&[meal(1, 300)]),
            fingerprint(&[meal(1, 310)])
        );
    }

    #[tokio::test]
    async fn test_in_memory_catalog_replace() {
        let catalog = InMemoryCatalog::new(vec![meal(1, 300)]);
        assert_eq!(catalog.list_all_meals().await.unwrap().len(), 1);
        catalog.replace(vec![meal(1, 300), meal(2, 500)]).await;
        assert_eq!(catalog.list_all_meals().await.unwrap().len(), 2);
    }
}
