// ABOUTME: Recipe catalog loaded from a JSON file with ingredient normalisation
// ABOUTME: Assigns positional ids, optionally recomputes calories from macros, and serves MealCatalog
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;
use meal_planner_core::constants::energy::{KCAL_PER_G_CARBS, KCAL_PER_G_FAT, KCAL_PER_G_PROTEIN};
use meal_planner_core::constants::ingredients::SYNONYMS;
use meal_planner_core::errors::{AppError, AppResult};
use meal_planner_core::models::{Macros, Meal};
use meal_planner_rl::catalog::MealCatalog;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// How raw recipes are turned into meals
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogLoadOptions {
    /// Collapse ingredient synonyms onto canonical names
    pub normalize_ingredients: bool,
    /// Replace stated calories with the macro estimate
    pub recompute_calories: bool,
    /// Keep only meals whose calories fall in this band
    pub calorie_band: Option<RangeInclusive<i32>>,
}

impl Default for CatalogLoadOptions {
    fn default() -> Self {
        Self {
            normalize_ingredients: true,
            recompute_calories: false,
            calorie_band: None,
        }
    }
}

/// One recipe as stored in the catalog file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeRecord {
    /// Stable id; assigned from the 1-based position when absent
    #[serde(default)]
    pub id: Option<i64>,
    /// Display name
    pub name: String,
    /// Stated calories, rounded on load
    pub calories: f64,
    /// Macronutrients in grams
    pub macros: Macros,
    /// Ingredient names
    #[serde(default)]
    pub ingredients: Vec<String>,
    /// Optional image reference
    #[serde(default)]
    pub photo_url: Option<String>,
}

/// Lowercase, trim, and map known synonyms onto their canonical name
#[must_use]
pub fn normalize_ingredient(raw: &str) -> String {
    let cleaned = raw.trim().to_lowercase();
    SYNONYMS
        .iter()
        .find(|(alias, _)| *alias == cleaned)
        .map_or(cleaned, |(_, canonical)| (*canonical).to_owned())
}

fn macro_calories(macros: &Macros) -> f64 {
    KCAL_PER_G_FAT.mul_add(
        macros.fat,
        KCAL_PER_G_PROTEIN.mul_add(macros.protein, KCAL_PER_G_CARBS * macros.carbs),
    )
}

fn into_meal(
    position: usize,
    record: RecipeRecord,
    options: &CatalogLoadOptions,
) -> AppResult<Meal> {
    let id = record.id.unwrap_or(position as i64 + 1);
    let stated = if options.recompute_calories {
        macro_calories(&record.macros)
    } else {
        record.calories
    };
    if !stated.is_finite() || stated < 0.0 {
        return Err(AppError::invalid_input(format!(
            "recipe '{}' has invalid calories {stated}",
            record.name
        ))
        .with_details(json!({ "id": id, "position": position })));
    }

    let ingredients: Vec<String> = if options.normalize_ingredients {
        record
            .ingredients
            .iter()
            .map(|ingredient| normalize_ingredient(ingredient))
            .collect()
    } else {
        record.ingredients
    };

    let mut meal = Meal::new(id, record.name, stated.round() as i32, record.macros, ingredients);
    meal.photo_url = record.photo_url;
    Ok(meal)
}

/// Parse catalog JSON into meals, in file order
///
/// # Errors
///
/// Returns a serialization error for malformed JSON or an invalid-input
/// error for a recipe with negative or non-finite calories
pub fn parse_catalog(bytes: &[u8], options: &CatalogLoadOptions) -> AppResult<Vec<Meal>> {
    let records: Vec<RecipeRecord> = serde_json::from_slice(bytes).map_err(|e| {
        AppError::serialization(format!("invalid recipe catalog: {e}")).with_source(e)
    })?;
    let total = records.len();

    let mut meals = Vec::with_capacity(total);
    for (position, record) in records.into_iter().enumerate() {
        let meal = into_meal(position, record, options)?;
        if options
            .calorie_band
            .as_ref()
            .is_none_or(|band| band.contains(&meal.calories))
        {
            meals.push(meal);
        }
    }

    if meals.len() < total {
        debug!(total, kept = meals.len(), "Calorie band dropped recipes");
    }
    Ok(meals)
}

/// Catalog read from a JSON recipe file and kept in memory
#[derive(Debug)]
pub struct JsonFileCatalog {
    path: PathBuf,
    options: CatalogLoadOptions,
    meals: RwLock<Arc<Vec<Meal>>>,
}

impl JsonFileCatalog {
    /// Read and parse the catalog at `path`
    ///
    /// # Errors
    ///
    /// Returns a storage error when the file cannot be read, or any error
    /// from [`parse_catalog`]
    pub async fn open(path: impl Into<PathBuf>, options: CatalogLoadOptions) -> AppResult<Self> {
        let path = path.into();
        let meals = Self::read(&path, &options).await?;
        Ok(Self {
            path,
            options,
            meals: RwLock::new(Arc::new(meals)),
        })
    }

    async fn read(path: &Path, options: &CatalogLoadOptions) -> AppResult<Vec<Meal>> {
        let bytes = fs::read(path).await.map_err(|e| {
            AppError::storage(format!("failed to read catalog {}: {e}", path.display()))
                .with_source(e)
        })?;
        let meals = parse_catalog(&bytes, options)?;
        info!(
            path = %path.display(),
            meals = meals.len(),
            normalize = options.normalize_ingredients,
            recompute_calories = options.recompute_calories,
            "Loaded recipe catalog"
        );
        Ok(meals)
    }

    /// Re-read the file, replacing the cached meals; returns the new count
    ///
    /// # Errors
    ///
    /// Same as [`JsonFileCatalog::open`]; the previous contents stay in place
    /// on failure
    pub async fn reload(&self) -> AppResult<usize> {
        let meals = Self::read(&self.path, &self.options).await?;
        let count = meals.len();
        *self.meals.write().await = Arc::new(meals);
        Ok(count)
    }

    /// Source file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Meals currently loaded
    pub async fn len(&self) -> usize {
        self.meals.read().await.len()
    }

    /// Whether the catalog has no meals
    pub async fn is_empty(&self) -> bool {
        self.meals.read().await.is_empty()
    }
}

#[async_trait]
impl MealCatalog for JsonFileCatalog {
    async fn list_all_meals(&self) -> AppResult<Vec<Meal>> {
        let meals = Arc::clone(&*self.meals.read().await);
        Ok(meals.as_ref().clone())
    }

    fn describe(&self) -> String {
        format!("json catalog {}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meal_planner_core::errors::ErrorCode;

    const RECIPES: &str = r#"[
        {"name": "Chicken Pasta", "calories": 612.6,
         "macros": {"protein": 40.0, "carbs": 60.0, "fat": 20.0},
         "ingredients": ["Chicken Thighs", " spaghetti ", "garlic"]},
        {"id": 42, "name": "Lentil Soup", "calories": 350.0,
         "macros": {"protein": 18.0, "carbs": 50.0, "fat": 6.0},
         "ingredients": ["lentils", "carrot"], "photo_url": "soup.png"},
        {"name": "Butter", "calories": 1200.0,
         "macros": {"protein": 0.0, "carbs": 0.0, "fat": 130.0}}
    ]"#;

    #[test]
    fn test_synonyms_are_collapsed() {
        assert_eq!(normalize_ingredient(" Chicken Thighs"), "chicken breast");
        assert_eq!(normalize_ingredient("spaghetti"), "pasta");
        assert_eq!(normalize_ingredient("Garlic"), "garlic");
    }

    #[test]
    fn test_positional_ids_and_rounding() {
        let meals = parse_catalog(RECIPES.as_bytes(), &CatalogLoadOptions::default()).unwrap();
        assert_eq!(meals.len(), 3);
        assert_eq!(meals[0].id, 1);
        assert_eq!(meals[0].calories, 613);
        assert!(meals[0].ingredients.contains("chicken breast"));
        assert!(meals[0].ingredients.contains("pasta"));
        assert_eq!(meals[1].id, 42);
        assert_eq!(meals[1].photo_url.as_deref(), Some("soup.png"));
        assert_eq!(meals[2].id, 3);
        assert!(meals[2].ingredients.is_empty());
    }

    #[test]
    fn test_recompute_and_band() {
        let options = CatalogLoadOptions {
            normalize_ingredients: false,
            recompute_calories: true,
            calorie_band: Some(100..=1000),
        };
        let meals = parse_catalog(RECIPES.as_bytes(), &options).unwrap();
        // Butter recomputes to 1170 kcal and falls outside the band
        assert_eq!(meals.len(), 2);
        assert_eq!(meals[0].calories, 580);
        assert!(meals[0].ingredients.contains("Chicken Thighs"));
        assert_eq!(meals[1].calories, 326);
    }

    #[test]
    fn test_malformed_json_is_serialization_error() {
        let err = parse_catalog(b"{not json", &CatalogLoadOptions::default()).unwrap_err();
        assert_eq!(err.code, ErrorCode::SerializationError);
    }
}
