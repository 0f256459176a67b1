// ABOUTME: Persistence abstraction for trained profile Q-tables
// ABOUTME: ArtifactStore trait shared by file-backed storage and the in-memory store used in tests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::qtable::ProfileQTable;
use dashmap::DashMap;
use meal_planner_core::errors::{AppResult, PlannerError};

/// Storage for one artifact per profile
pub trait ArtifactStore: Send + Sync {
    /// Whether an artifact exists for `profile`
    fn exists(&self, profile: &str) -> bool;

    /// Load the artifact for `profile`
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::ModelNotFound`] when nothing was saved, or a
    /// storage/serialization error for unreadable artifacts
    fn load(&self, profile: &str) -> AppResult<ProfileQTable>;

    /// Persist `artifact`, replacing any previous one for the same profile
    ///
    /// # Errors
    ///
    /// Returns a storage/serialization error when writing fails
    fn save(&self, artifact: &ProfileQTable) -> AppResult<()>;

    /// Where the artifact for `profile` lives, for messages
    fn location(&self, profile: &str) -> String;
}

/// Store backed by a concurrent map
#[derive(Debug, Default)]
pub struct InMemoryArtifactStore {
    artifacts: DashMap<String, ProfileQTable>,
}

impl InMemoryArtifactStore {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored artifacts
    #[must_use]
    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    /// Whether the store is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}

impl ArtifactStore for InMemoryArtifactStore {
    fn exists(&self, profile: &str) -> bool {
        self.artifacts.contains_key(profile)
    }

    fn load(&self, profile: &str) -> AppResult<ProfileQTable> {
        self.artifacts
            .get(profile)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| {
                PlannerError::ModelNotFound {
                    profile: profile.to_owned(),
                    location: self.location(profile),
                }
                .into()
            })
    }

    fn save(&self, artifact: &ProfileQTable) -> AppResult<()> {
        self.artifacts
            .insert(artifact.profile.clone(), artifact.clone());
        Ok(())
    }

    fn location(&self, profile: &str) -> String {
        format!("memory://{profile}")
    }
}
