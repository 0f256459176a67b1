// ABOUTME: Core types and constants for the reinforcement-learning meal planner
// ABOUTME: Foundation crate with error handling, meal models, dietary profiles, and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Meal Planner Core
//!
//! Foundation crate providing shared types for the meal planner workspace.
//! It changes infrequently so the training and inference crates can compile
//! incrementally on top of it.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError`, `ErrorCode`, and the domain `PlannerError`
//! - **models**: Immutable catalog records (`Meal`, `Macros`)
//! - **config**: Dietary profile registry (`ProfileFilter`, `DietaryProfile`, `TargetSweep`)
//! - **constants**: Plan size, default hyperparameters, reward shaping constants, ingredient lists

/// Unified error handling system with standard error codes
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Meal catalog data models
pub mod models;

/// Dietary profile configuration and registry
pub mod config;
