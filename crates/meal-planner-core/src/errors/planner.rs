// ABOUTME: Domain-specific errors for meal selection, training, and recommendation
// ABOUTME: Provides structured variants that convert into the unified AppError system
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Planner Error Types
//!
//! Typed failures raised by the selection environment, the trainer and the
//! recommender. Callers match on these directly; the API boundary converts
//! them into [`AppError`] with a stable [`ErrorCode`].

use super::{AppError, ErrorCode};
use serde_json::json;
use thiserror::Error;

/// Errors specific to the meal planning pipeline
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlannerError {
    /// Action is not part of the current available set
    #[error("meal index {action} is not available in the current state")]
    InvalidAction {
        /// Rejected meal index
        action: usize,
    },

    /// Profile name is not registered
    #[error("unknown dietary profile '{profile}'")]
    InvalidProfile {
        /// Requested profile name
        profile: String,
    },

    /// Target calories outside the profile's allowed set
    #[error("target {target} kcal is not allowed for profile '{profile}' (allowed: {allowed})")]
    InvalidTarget {
        /// Profile name
        profile: String,
        /// Requested target
        target: u32,
        /// Human-readable description of the allowed sweep
        allowed: String,
    },

    /// No persisted artifact for the profile
    #[error("no trained model found for profile '{profile}' at {location}")]
    ModelNotFound {
        /// Profile name
        profile: String,
        /// Where the artifact was expected
        location: String,
    },

    /// Artifact exists but lacks the requested target bucket
    #[error("no trained Q-values for {target} kcal in profile '{profile}'")]
    BucketNotTrained {
        /// Profile name
        profile: String,
        /// Requested target
        target: u32,
    },

    /// Filtered universe is smaller than the plan size
    #[error("profile '{profile}' has {available} meals, at least {required} are required")]
    CatalogEmpty {
        /// Profile name
        profile: String,
        /// Meals left after filtering
        available: usize,
        /// Meals needed for one plan
        required: usize,
    },

    /// Live catalog differs from the one the artifact was trained on
    #[error("catalog fingerprint for profile '{profile}' changed since training")]
    CatalogMismatch {
        /// Profile name
        profile: String,
        /// Fingerprint recorded in the artifact
        expected: String,
        /// Fingerprint of the live catalog
        actual: String,
    },

    /// Training stopped by a cancellation token or deadline
    #[error("training for profile '{profile}' at {target} kcal cancelled after {completed_episodes} episodes")]
    TrainingCancelled {
        /// Profile name
        profile: String,
        /// Target being trained
        target: u32,
        /// Episodes finished before cancellation
        completed_episodes: u64,
    },
}

impl PlannerError {
    /// Error code used when converting into [`AppError`]
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidAction { .. } => ErrorCode::InvalidAction,
            Self::InvalidProfile { .. } => ErrorCode::InvalidProfile,
            Self::InvalidTarget { .. } => ErrorCode::InvalidTarget,
            Self::ModelNotFound { .. } | Self::BucketNotTrained { .. } => ErrorCode::ModelNotFound,
            Self::CatalogEmpty { .. } => ErrorCode::CatalogEmpty,
            Self::CatalogMismatch { .. } => ErrorCode::CatalogMismatch,
            Self::TrainingCancelled { .. } => ErrorCode::OperationCancelled,
        }
    }

    /// Whether a sweep may log this error and continue with the next target
    #[must_use]
    pub const fn is_skippable(&self) -> bool {
        matches!(self, Self::BucketNotTrained { .. })
    }

    fn details(&self) -> serde_json::Value {
        match self {
            Self::InvalidAction { action } => json!({ "action": action }),
            Self::InvalidProfile { profile } => json!({ "profile": profile }),
            Self::InvalidTarget {
                profile,
                target,
                allowed,
            } => json!({ "profile": profile, "target": target, "allowed": allowed }),
            Self::ModelNotFound { profile, location } => {
                json!({ "profile": profile, "location": location })
            }
            Self::BucketNotTrained { profile, target } => {
                json!({ "profile": profile, "target": target })
            }
            Self::CatalogEmpty {
                profile,
                available,
                required,
            } => json!({ "profile": profile, "available": available, "required": required }),
            Self::CatalogMismatch {
                profile,
                expected,
                actual,
            } => json!({ "profile": profile, "expected": expected, "actual": actual }),
            Self::TrainingCancelled {
                profile,
                target,
                completed_episodes,
            } => json!({
                "profile": profile,
                "target": target,
                "completed_episodes": completed_episodes
            }),
        }
    }
}

impl From<PlannerError> for AppError {
    fn from(error: PlannerError) -> Self {
        Self::new(error.code(), error.to_string())
            .with_details(error.details())
            .with_source(error)
    }
}
