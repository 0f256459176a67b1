// ABOUTME: Unified error handling for the meal planner with standard error codes
// ABOUTME: Defines AppError, ErrorCode, and the AppResult alias shared by every crate
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Unified Error Handling System
//!
//! Every fallible operation in the workspace returns [`AppResult`]. Domain
//! failures are raised as [`PlannerError`] and converted into [`AppError`] so
//! the external recommendation service can translate them into user-facing
//! responses through [`ErrorCode::http_status`].

/// Domain errors raised by the environment, trainer, and recommender
pub mod planner;

pub use planner::PlannerError;

use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::io;
use thiserror::Error;

/// Standard error codes used throughout the workspace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    // Validation (3000-3999)
    /// Generic invalid input
    #[serde(rename = "INVALID_INPUT")]
    InvalidInput = 3000,
    /// Action is not in the environment's available set
    #[serde(rename = "INVALID_ACTION")]
    InvalidAction = 3001,
    /// Dietary profile is not registered
    #[serde(rename = "INVALID_PROFILE")]
    InvalidProfile = 3002,
    /// Target calories outside the profile's allowed set
    #[serde(rename = "INVALID_TARGET")]
    InvalidTarget = 3003,
    /// Numeric value outside its acceptable range
    #[serde(rename = "VALUE_OUT_OF_RANGE")]
    ValueOutOfRange = 3004,

    // Resource Management (4000-4999)
    /// Generic missing resource
    #[serde(rename = "RESOURCE_NOT_FOUND")]
    ResourceNotFound = 4000,
    /// No trained artifact or bucket for the request
    #[serde(rename = "MODEL_NOT_FOUND")]
    ModelNotFound = 4001,
    /// Another process holds the training lock
    #[serde(rename = "RESOURCE_LOCKED")]
    ResourceLocked = 4002,
    /// Operation stopped by a cancellation token or deadline
    #[serde(rename = "OPERATION_CANCELLED")]
    OperationCancelled = 4003,

    // Configuration (6000-6999)
    /// Generic configuration problem
    #[serde(rename = "CONFIG_ERROR")]
    ConfigError = 6000,
    /// Configuration value failed validation
    #[serde(rename = "CONFIG_INVALID")]
    ConfigInvalid = 6001,
    /// Filtered catalog is smaller than the plan size
    #[serde(rename = "CATALOG_EMPTY")]
    CatalogEmpty = 6002,
    /// Catalog changed since the artifact was trained
    #[serde(rename = "CATALOG_MISMATCH")]
    CatalogMismatch = 6003,

    // Internal Errors (9000-9999)
    /// Unexpected internal failure
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError = 9000,
    /// Filesystem or artifact storage failure
    #[serde(rename = "STORAGE_ERROR")]
    StorageError = 9002,
    /// Serialization or deserialization failure
    #[serde(rename = "SERIALIZATION_ERROR")]
    SerializationError = 9003,
}

impl ErrorCode {
    /// Get the HTTP status code the external API layer should use
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::InvalidInput
            | Self::InvalidProfile
            | Self::InvalidTarget
            | Self::ValueOutOfRange => 400,

            Self::ResourceNotFound | Self::ModelNotFound => 404,

            Self::ResourceLocked => 409,

            Self::OperationCancelled => 503,

            Self::InvalidAction
            | Self::ConfigError
            | Self::ConfigInvalid
            | Self::CatalogEmpty
            | Self::CatalogMismatch
            | Self::InternalError
            | Self::StorageError
            | Self::SerializationError => 500,
        }
    }

    /// Get a user-friendly description of this error
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::InvalidInput => "The provided input is invalid",
            Self::InvalidAction => "The selected meal is not available in the current state",
            Self::InvalidProfile => "The requested dietary profile is not known",
            Self::InvalidTarget => "The requested calorie target is not allowed for this profile",
            Self::ValueOutOfRange => "The provided value is outside the acceptable range",
            Self::ResourceNotFound => "The requested resource was not found",
            Self::ModelNotFound => "No trained model is available for this request",
            Self::ResourceLocked => "The resource is currently locked by another process",
            Self::OperationCancelled => "The operation was cancelled before completion",
            Self::ConfigError => "Configuration error encountered",
            Self::ConfigInvalid => "Configuration is invalid",
            Self::CatalogEmpty => "The filtered meal catalog is too small to build a plan",
            Self::CatalogMismatch => "The meal catalog changed since the model was trained",
            Self::InternalError => "An internal error occurred",
            Self::StorageError => "Storage operation failed",
            Self::SerializationError => "Data serialization/deserialization failed",
        }
    }
}

/// Unified error type for the workspace
#[derive(Debug, Error)]
#[error("{}: {}", .code.description(), .message)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Structured details for the caller (profile, target, paths)
    pub details: serde_json::Value,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn StdError + Send + Sync>>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: serde_json::Value::Null,
            source: None,
        }
    }

    /// Attach structured details
    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }

    /// Add a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        self.code.http_status()
    }

    /// Invalid input
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StorageError, message)
    }

    /// Serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::SerializationError, message)
    }

    /// Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Returns the domain error if this `AppError` was produced from one
    #[must_use]
    pub fn planner_error(&self) -> Option<&PlannerError> {
        self.source
            .as_deref()
            .and_then(|source| source.downcast_ref::<PlannerError>())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::serialization(error.to_string()).with_source(error)
    }
}

impl From<io::Error> for AppError {
    fn from(error: io::Error) -> Self {
        Self::storage(error.to_string()).with_source(error)
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// Error response body handed to the external API layer
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Structured details
    #[serde(skip_serializing_if = "serde_json::Value::is_null", default)]
    pub details: serde_json::Value,
}

impl From<AppError> for ErrorResponse {
    fn from(error: AppError) -> Self {
        Self {
            code: error.code,
            message: error.message,
            details: error.details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_http_status() {
        assert_eq!(ErrorCode::InvalidProfile.http_status(), 400);
        assert_eq!(ErrorCode::ModelNotFound.http_status(), 404);
        assert_eq!(ErrorCode::CatalogEmpty.http_status(), 500);
    }

    #[test]
    fn test_error_response_serialization() {
        let error = AppError::invalid_input("bad target")
            .with_details(serde_json::json!({ "target": 123 }));
        let response = ErrorResponse::from(error);

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("INVALID_INPUT"));
        assert!(json.contains("target"));
    }

    #[test]
    fn test_display_includes_description_and_message() {
        let error = AppError::storage("disk full");
        assert_eq!(error.to_string(), "Storage operation failed: disk full");
    }
}
