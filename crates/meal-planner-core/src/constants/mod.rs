// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Plan size, training defaults, reward shaping, and dietary ingredient lists
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Constants module
//!
//! Constants are grouped into logical domains rather than being in a single
//! flat namespace.

/// Number of meals in every recommended plan (episode horizon)
pub const MEALS_PER_PLAN: usize = 4;

/// Q-learning defaults
pub mod training {
    /// Episodes per (profile, target) pair
    pub const DEFAULT_EPISODES: u64 = 200_000;
    /// Constant exploration rate
    pub const DEFAULT_EPSILON: f64 = 0.1;
    /// Learning rate
    pub const DEFAULT_ALPHA: f64 = 0.1;
    /// Episodes between recorded training samples
    pub const DEFAULT_LOG_INTERVAL: u64 = 10_000;
}

/// Reward shaping constants
pub mod reward {
    /// Deviation at or below which the sparse penalty is not doubled
    pub const SPARSE_TOLERANCE_KCAL: f64 = 100.0;
    /// Deviation below which the tiered policy pays a positive reward
    pub const TIERED_BONUS_BAND_KCAL: f64 = 50.0;
    /// Deviation below which the tiered policy applies a linear penalty
    pub const TIERED_LINEAR_BAND_KCAL: f64 = 150.0;
    /// Ceiling of the positive tiered reward
    pub const TIERED_MAX_REWARD: f64 = 100.0;
    /// Multiplier applied to large deviations
    pub const OVERSHOOT_MULTIPLIER: f64 = 2.0;
    /// Protein floor per meal (grams)
    pub const PROTEIN_FLOOR_G: f64 = 25.0;
    /// Weight applied to each gram below the protein floor
    pub const PROTEIN_SHORTFALL_WEIGHT: f64 = 2.0;
    /// Protein level per meal that earns the bonus (grams)
    pub const PROTEIN_BONUS_THRESHOLD_G: f64 = 30.0;
    /// Bonus paid for a high-protein meal
    pub const PROTEIN_BONUS: f64 = 10.0;
    /// Fat ceiling per meal (grams)
    pub const FAT_CEILING_G: f64 = 20.0;
    /// Bonus paid by the tolerance-bonus deviation term
    pub const TOLERANCE_BONUS: f64 = 10.0;
}

/// Evaluation defaults
pub mod evaluation {
    /// Deviation at or below which a trial counts as a success
    pub const DEFAULT_TOLERANCE_KCAL: u32 = 100;
    /// Trials per target
    pub const DEFAULT_TRIALS: usize = 100;
}

/// Energy density of macronutrients (kcal per gram)
pub mod energy {
    /// Protein
    pub const KCAL_PER_G_PROTEIN: f64 = 4.0;
    /// Carbohydrates
    pub const KCAL_PER_G_CARBS: f64 = 4.0;
    /// Fat
    pub const KCAL_PER_G_FAT: f64 = 9.0;
}

/// Ingredient lists backing the built-in dietary profiles
pub mod ingredients {
    /// Animal products excluded from vegan plans
    pub const VEGAN_BANNED: &[&str] = &[
        "bacon",
        "beef chunks",
        "beef strips",
        "butter",
        "cheddar cheese",
        "cheese",
        "chicken breast",
        "duck breast",
        "eggs",
        "fish fillet",
        "ground beef",
        "ground turkey",
        "honey",
        "lamb chops",
        "lamb chunks",
        "milk",
        "parmesan",
        "pork ribs",
        "pork strips",
        "pork tenderloin",
        "pulled pork",
        "salmon fillet",
        "shrimp",
        "sour cream",
        "steak",
        "trout fillet",
        "tuna",
        "tuna steak",
        "turkey breast",
        "turkey slices",
    ];

    /// Meat and poultry excluded from pescatarian plans
    pub const PESCATARIAN_BANNED: &[&str] = &[
        "bacon",
        "beef chunks",
        "beef strips",
        "chicken breast",
        "duck breast",
        "ground beef",
        "ground turkey",
        "lamb chops",
        "lamb chunks",
        "pork ribs",
        "pork strips",
        "pork tenderloin",
        "pulled pork",
        "steak",
        "turkey breast",
        "turkey slices",
    ];

    /// Red meat and seafood excluded from poultry plans
    pub const POULTRY_BANNED: &[&str] = &[
        "bacon",
        "beef chunks",
        "beef strips",
        "fish fillet",
        "ground beef",
        "lamb chops",
        "lamb chunks",
        "pork ribs",
        "pork strips",
        "pork tenderloin",
        "pulled pork",
        "salmon fillet",
        "shrimp",
        "steak",
        "trout fillet",
        "tuna",
        "tuna steak",
    ];

    /// Synonyms collapsed onto canonical ingredient names when loading a catalog
    pub const SYNONYMS: &[(&str, &str)] = &[
        ("chicken thighs", "chicken breast"),
        ("chicken drumsticks", "chicken breast"),
        ("chicken meat", "chicken breast"),
        ("chicken tenders", "chicken breast"),
        ("white rice", "basmati rice"),
        ("brown rice", "basmati rice"),
        ("wild rice", "basmati rice"),
        ("jasmine rice", "basmati rice"),
        ("arborio rice", "basmati rice"),
        ("spaghetti", "pasta"),
        ("fettuccine", "pasta"),
        ("linguine", "pasta"),
        ("macaroni", "pasta"),
        ("lasagna noodles", "pasta"),
        ("penne", "pasta"),
        ("farfalle", "pasta"),
        ("rotini", "pasta"),
        ("rigatoni", "pasta"),
        ("pasta shells", "pasta"),
        ("egg noodles", "noodles"),
        ("salmon fillet", "fish fillet"),
        ("tilapia fillet", "fish fillet"),
        ("cod fillet", "fish fillet"),
        ("mozzarella cheese", "cheese"),
        ("parmesan cheese", "cheese"),
        ("ricotta cheese", "cheese"),
        ("cheddar cheese", "cheese"),
        ("feta cheese", "cheese"),
        ("white bread", "whole grain bread"),
        ("ciabatta bread", "whole grain bread"),
        ("burger bun", "burger buns"),
    ];
}
