// ABOUTME: File-backed ArtifactStore writing q_table_<profile>.json under a tables directory
// ABOUTME: Saves through a temp file and atomic rename so readers never see a partial artifact
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::lock::TrainingLock;
use meal_planner_core::errors::{AppError, AppResult, PlannerError};
use meal_planner_rl::qtable::{decode_artifact, ProfileQTable};
use meal_planner_rl::store::ArtifactStore;
use serde_json::json;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

const ARTIFACT_PREFIX: &str = "q_table_";
const ARTIFACT_EXTENSION: &str = "json";
const LOCK_EXTENSION: &str = "lock";

fn validate_profile_name(profile: &str) -> AppResult<()> {
    let valid = !profile.is_empty()
        && profile
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(AppError::invalid_input(format!(
            "profile name '{profile}' cannot be used as a file name"
        )))
    }
}

/// Artifact store rooted at a tables directory
#[derive(Debug, Clone)]
pub struct FileArtifactStore {
    dir: PathBuf,
}

impl FileArtifactStore {
    /// Store rooted at `dir`; the directory is created on first save
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Tables directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Artifact path for `profile`
    #[must_use]
    pub fn artifact_path(&self, profile: &str) -> PathBuf {
        self.dir
            .join(format!("{ARTIFACT_PREFIX}{profile}.{ARTIFACT_EXTENSION}"))
    }

    /// Lock file path for `profile`
    #[must_use]
    pub fn lock_path(&self, profile: &str) -> PathBuf {
        self.dir
            .join(format!("{ARTIFACT_PREFIX}{profile}.{LOCK_EXTENSION}"))
    }

    /// Take the training lock for `profile`, creating the directory if needed
    ///
    /// # Errors
    ///
    /// Returns a resource-locked error when another run holds the lock, or a
    /// storage error
    pub fn lock(&self, profile: &str) -> AppResult<TrainingLock> {
        validate_profile_name(profile)?;
        self.ensure_dir()?;
        TrainingLock::acquire(profile, self.lock_path(profile))
    }

    /// Delete the artifact for `profile`; returns whether one existed
    ///
    /// # Errors
    ///
    /// Returns a storage error when the file exists but cannot be removed
    pub fn remove(&self, profile: &str) -> AppResult<bool> {
        validate_profile_name(profile)?;
        let path = self.artifact_path(profile);
        match fs::remove_file(&path) {
            Ok(()) => {
                info!(profile, path = %path.display(), "Removed Q-table");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AppError::storage(format!(
                "failed to remove {}: {e}",
                path.display()
            ))
            .with_source(e)),
        }
    }

    /// Profiles with a saved artifact, sorted
    ///
    /// # Errors
    ///
    /// Returns a storage error when the directory cannot be listed
    pub fn profiles(&self) -> AppResult<Vec<String>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(AppError::storage(format!(
                    "failed to list {}: {e}",
                    self.dir.display()
                ))
                .with_source(e))
            }
        };

        let mut profiles: Vec<String> = entries
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let path = entry.path();
                if path.extension()? != ARTIFACT_EXTENSION {
                    return None;
                }
                path.file_stem()?
                    .to_str()?
                    .strip_prefix(ARTIFACT_PREFIX)
                    .map(str::to_owned)
            })
            .collect();
        profiles.sort();
        Ok(profiles)
    }

    fn ensure_dir(&self) -> AppResult<()> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            AppError::storage(format!(
                "failed to create tables directory {}: {e}",
                self.dir.display()
            ))
            .with_source(e)
        })
    }
}

impl ArtifactStore for FileArtifactStore {
    fn exists(&self, profile: &str) -> bool {
        validate_profile_name(profile).is_ok() && self.artifact_path(profile).is_file()
    }

    fn load(&self, profile: &str) -> AppResult<ProfileQTable> {
        validate_profile_name(profile)?;
        let path = self.artifact_path(profile);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(PlannerError::ModelNotFound {
                    profile: profile.to_owned(),
                    location: path.display().to_string(),
                }
                .into());
            }
            Err(e) => {
                return Err(
                    AppError::storage(format!("failed to read {}: {e}", path.display()))
                        .with_source(e),
                );
            }
        };

        let artifact = decode_artifact(&bytes).map_err(|e| {
            AppError::serialization(format!("corrupt Q-table {}: {e}", path.display()))
                .with_source(e)
        })?;
        if artifact.profile != profile {
            return Err(AppError::serialization(format!(
                "Q-table {} belongs to profile '{}'",
                path.display(),
                artifact.profile
            ))
            .with_details(json!({ "expected": profile, "actual": artifact.profile })));
        }

        debug!(profile, path = %path.display(), bytes = bytes.len(), "Read Q-table");
        Ok(artifact)
    }

    fn save(&self, artifact: &ProfileQTable) -> AppResult<()> {
        validate_profile_name(&artifact.profile)?;
        self.ensure_dir()?;

        let bytes = serde_json::to_vec(artifact).map_err(|e| {
            AppError::serialization(format!("failed to encode Q-table: {e}")).with_source(e)
        })?;
        let target = self.artifact_path(&artifact.profile);
        let staging = self.dir.join(format!(".tmp-{}", Uuid::new_v4()));

        if let Err(e) = fs::write(&staging, &bytes).and_then(|()| fs::rename(&staging, &target)) {
            if let Err(cleanup) = fs::remove_file(&staging) {
                if cleanup.kind() != ErrorKind::NotFound {
                    warn!(
                        path = %staging.display(),
                        error = %cleanup,
                        "Failed to remove staging file"
                    );
                }
            }
            return Err(
                AppError::storage(format!("failed to write {}: {e}", target.display()))
                    .with_source(e),
            );
        }

        info!(
            profile = %artifact.profile,
            path = %target.display(),
            bytes = bytes.len(),
            targets = artifact.targets().count(),
            "Saved Q-table"
        );
        Ok(())
    }

    fn location(&self, profile: &str) -> String {
        self.artifact_path(profile).display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meal_planner_core::errors::ErrorCode;
    use meal_planner_rl::config::TrainingConfig;
    use meal_planner_rl::reward::RewardPolicy;
    use tempfile::TempDir;

    fn artifact(profile: &str) -> ProfileQTable {
        ProfileQTable::new(
            profile,
            "fingerprint",
            6,
            RewardPolicy::SparseTerminal,
            TrainingConfig::default(),
        )
    }

    #[test]
    fn test_paths_follow_naming_scheme() {
        let store = FileArtifactStore::new("/tmp/tables");
        assert_eq!(
            store.artifact_path("low-carb"),
            PathBuf::from("/tmp/tables/q_table_low-carb.json")
        );
        assert_eq!(
            store.lock_path("low-carb"),
            PathBuf::from("/tmp/tables/q_table_low-carb.lock")
        );
    }

    #[test]
    fn test_rejects_path_like_profile_names() {
        let store = FileArtifactStore::new("/tmp/tables");
        let err = store.load("../etc").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
        assert!(!store.exists("a/b"));
    }

    #[test]
    fn test_save_leaves_no_staging_files() {
        let dir = TempDir::new().unwrap();
        let store = FileArtifactStore::new(dir.path().join("nested"));
        store.save(&artifact("vegan")).unwrap();
        store.save(&artifact("omnivore")).unwrap();

        let names: Vec<String> = fs::read_dir(store.dir())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 2);
        assert!(names.iter().all(|name| !name.starts_with(".tmp-")));
        assert_eq!(store.profiles().unwrap(), vec!["omnivore", "vegan"]);
    }
}
