// ABOUTME: Core data models for the meal catalog
// ABOUTME: Re-exports Meal and Macros used by training and inference
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Meal catalog records
pub mod meal;

pub use meal::{Macros, Meal};
