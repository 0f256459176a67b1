// ABOUTME: Configuration module for the reinforcement-learning engine
// ABOUTME: Re-exports training, recommender, and evaluation configuration types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Configuration error types
pub mod error;

/// Training, recommender, and evaluation settings
pub mod training;

pub use error::ConfigError;
pub use training::{EngineConfig, EvaluationConfig, RecommenderConfig, TrainingConfig};
