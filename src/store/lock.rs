// ABOUTME: Exclusive lock file preventing two processes from training the same profile
// ABOUTME: Created with create_new semantics and removed when the guard is dropped
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::Utc;
use meal_planner_core::errors::{AppError, AppResult, ErrorCode};
use serde_json::json;
use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process;
use tracing::{debug, warn};

/// Held while a profile is being trained
#[derive(Debug)]
pub struct TrainingLock {
    profile: String,
    path: PathBuf,
}

impl TrainingLock {
    /// Create the lock file at `path`
    ///
    /// # Errors
    ///
    /// Returns [`ErrorCode::ResourceLocked`] when a live process holds the
    /// lock, or a storage error when it cannot be created. A lock whose
    /// recorded owner is no longer running is removed and taken over.
    pub fn acquire(profile: &str, path: impl Into<PathBuf>) -> AppResult<Self> {
        let path = path.into();
        let mut file = match create(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                let owner = read_owner(&path);
                if owner.is_some_and(|pid| process_alive(pid) == Some(false)) {
                    warn!(profile, lock = %path.display(), owner, "Removing stale training lock");
                    reclaim(profile, &path, owner)?
                } else {
                    return Err(locked(profile, &path, owner));
                }
            }
            Err(e) => return Err(create_failed(&path, e)),
        };

        let owner = format!("pid={} started={}", process::id(), Utc::now().to_rfc3339());
        if let Err(e) = writeln!(file, "{owner}") {
            warn!(lock = %path.display(), error = %e, "Failed to record lock owner");
        }
        debug!(profile, lock = %path.display(), "Acquired training lock");

        Ok(Self {
            profile: profile.to_owned(),
            path,
        })
    }

    /// Lock file location
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Profile this lock guards
    #[must_use]
    pub fn profile(&self) -> &str {
        &self.profile
    }
}

impl Drop for TrainingLock {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => debug!(profile = %self.profile, "Released training lock"),
            Err(e) => warn!(
                profile = %self.profile,
                lock = %self.path.display(),
                error = %e,
                "Failed to remove training lock"
            ),
        }
    }
}

fn create(path: &Path) -> io::Result<File> {
    OpenOptions::new().write(true).create_new(true).open(path)
}

fn reclaim(profile: &str, path: &Path, owner: Option<u32>) -> AppResult<File> {
    match fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(create_failed(path, e)),
    }
    // Another run may have reclaimed it first
    create(path).map_err(|e| {
        if e.kind() == ErrorKind::AlreadyExists {
            locked(profile, path, owner)
        } else {
            create_failed(path, e)
        }
    })
}

fn locked(profile: &str, path: &Path, owner: Option<u32>) -> AppError {
    let holder = owner.map_or_else(|| "unknown process".to_owned(), |pid| format!("pid {pid}"));
    AppError::new(
        ErrorCode::ResourceLocked,
        format!(
            "profile '{profile}' is already being trained by {holder}; \
             delete {} if that run is gone",
            path.display()
        ),
    )
    .with_details(json!({
        "profile": profile,
        "lock": path.display().to_string(),
        "owner_pid": owner,
    }))
}

fn create_failed(path: &Path, e: io::Error) -> AppError {
    AppError::storage(format!("failed to create lock {}: {e}", path.display())).with_source(e)
}

/// Pid recorded in an existing lock file
fn read_owner(path: &Path) -> Option<u32> {
    let contents = fs::read_to_string(path).ok()?;
    contents
        .split_whitespace()
        .find_map(|field| field.strip_prefix("pid="))
        .and_then(|pid| pid.parse().ok())
}

/// Whether `pid` is running, when the platform can tell
#[cfg(target_os = "linux")]
fn process_alive(pid: u32) -> Option<bool> {
    Some(Path::new("/proc").join(pid.to_string()).exists())
}

#[cfg(not(target_os = "linux"))]
fn process_alive(_pid: u32) -> Option<bool> {
    None
}
