// ABOUTME: Meal catalog providers backed by local recipe files
// ABOUTME: Re-exports the JSON catalog loader and its loading options
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// JSON recipe file catalog
pub mod json;

pub use json::{
    normalize_ingredient, parse_catalog, CatalogLoadOptions, JsonFileCatalog, RecipeRecord,
};
