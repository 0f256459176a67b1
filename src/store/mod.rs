// ABOUTME: Filesystem persistence for trained profile Q-tables
// ABOUTME: Re-exports the file-backed artifact store and the per-profile training lock
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// One JSON artifact per profile with atomic replacement
pub mod file;
/// Lock file guarding concurrent training of a profile
pub mod lock;

pub use file::FileArtifactStore;
pub use lock::TrainingLock;
