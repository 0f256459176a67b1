// ABOUTME: Configuration module for the meal planner application
// ABOUTME: Re-exports environment-driven planner, catalog, and engine settings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
//! Configuration for the meal planner
//!
//! - **Planner**: Storage paths, catalog loading options, reward policy, and
//!   engine hyperparameters loaded from environment variables

/// Environment-driven planner configuration
pub mod planner;

pub use planner::{CatalogConfig, PlannerConfig};
