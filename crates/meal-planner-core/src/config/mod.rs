// ABOUTME: Configuration module for dietary profiles
// ABOUTME: Re-exports profile filters, target sweeps, and the profile registry
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Dietary profile definitions and the built-in registry
pub mod profiles;

pub use profiles::{
    Comparison, DietaryProfile, MacroField, ProfileFilter, ProfileRegistry, TargetSweep,
};
