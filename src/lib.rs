// ABOUTME: Main library entry point for the reinforcement-learning meal planner
// ABOUTME: Wires the JSON catalog, file-backed Q-table store, training pipeline, config, and logging
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

// Crate-level attributes:
// - deny(unsafe_code): Zero-tolerance unsafe policy
#![deny(unsafe_code)]

//! # Meal Planner
//!
//! Recommends four-meal daily plans for a dietary profile and calorie target
//! using tabular Q-learning policies trained offline.
//!
//! ## Architecture
//!
//! - **meal-planner-core**: Domain models, dietary profiles, errors, constants
//! - **meal-planner-rl**: Environment, rewards, trainer, recommender, evaluation
//! - **This crate**: Recipe file catalog, on-disk artifact store with training
//!   locks, the training pipeline, environment configuration, and logging
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use meal_planner::catalog::JsonFileCatalog;
//! use meal_planner::config::PlannerConfig;
//! use meal_planner::store::FileArtifactStore;
//! use meal_planner_core::config::ProfileRegistry;
//! use meal_planner_core::errors::AppResult;
//! use meal_planner_rl::Recommender;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let config = PlannerConfig::from_env()?;
//!     let catalog =
//!         JsonFileCatalog::open(&config.catalog.path, config.catalog.load_options()).await?;
//!     let recommender = Recommender::new(
//!         Arc::new(catalog),
//!         Arc::new(FileArtifactStore::new(&config.tables_dir)),
//!         ProfileRegistry::builtin(),
//!         config.engine.recommender,
//!     );
//!
//!     let plan = recommender.recommend("vegan", 1200).await?;
//!     println!("{} kcal", plan.total_calories);
//!     Ok(())
//! }
//! ```

/// Recipe catalog providers
pub mod catalog;

/// Environment-driven configuration
pub mod config;

/// Structured logging setup
pub mod logging;

/// Offline training pipeline
pub mod pipeline;

/// Filesystem artifact storage
pub mod store;
