// ABOUTME: Q-table data structures keyed by selection state and calorie target
// ABOUTME: Lazily initialized action values, per-target fragments, and the persisted profile artifact
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Q-Tables
//!
//! Training produces one [`QTable`] fragment per calorie target. Fragments
//! are merged into a [`ProfileQTable`], the artifact persisted per profile
//! and keyed by `(target_calories, state)`.
//!
//! On disk the artifact is JSON with nested objects:
//! `buckets -> target -> state signature -> action -> value`, where a state
//! signature is the comma-joined list of selected indices (`"3,7,1"`, empty
//! string for the initial state).

use crate::config::TrainingConfig;
use crate::reward::RewardPolicy;
use chrono::{DateTime, Utc};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Current artifact layout version
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Ordered tuple of selected meal indices
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateKey(Vec<usize>);

impl StateKey {
    /// Initial state with nothing selected
    #[must_use]
    pub const fn empty() -> Self {
        Self(Vec::new())
    }

    /// Selected indices
    #[must_use]
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// Number of selected meals
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing has been selected
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append a selection
    pub fn push(&mut self, action: usize) {
        self.0.push(action);
    }
}

impl From<Vec<usize>> for StateKey {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

impl From<&[usize]> for StateKey {
    fn from(indices: &[usize]) -> Self {
        Self(indices.to_vec())
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, index) in self.0.iter().enumerate() {
            if position > 0 {
                f.write_str(",")?;
            }
            write!(f, "{index}")?;
        }
        Ok(())
    }
}

impl FromStr for StateKey {
    type Err = ParseIntError;

    fn from_str(signature: &str) -> Result<Self, Self::Err> {
        if signature.is_empty() {
            return Ok(Self::empty());
        }
        signature
            .split(',')
            .map(|part| part.trim().parse::<usize>())
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

/// Action values for one state, in insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionValues {
    entries: Vec<(usize, f64)>,
}

impl ActionValues {
    /// Every action initialized to zero
    #[must_use]
    pub fn zeroed(actions: &[usize]) -> Self {
        Self {
            entries: actions.iter().map(|&action| (action, 0.0)).collect(),
        }
    }

    fn position(&self, action: usize) -> Option<usize> {
        // Entries are ascending when produced by the environment
        self.entries
            .binary_search_by_key(&action, |&(candidate, _)| candidate)
            .ok()
            .or_else(|| {
                self.entries
                    .iter()
                    .position(|&(candidate, _)| candidate == action)
            })
    }

    /// Value of `action`, if present
    #[must_use]
    pub fn get(&self, action: usize) -> Option<f64> {
        self.position(action).map(|position| self.entries[position].1)
    }

    /// Overwrite the value of an existing action, returning whether it existed
    pub fn set(&mut self, action: usize, value: f64) -> bool {
        match self.position(action) {
            Some(position) => {
                self.entries[position].1 = value;
                true
            }
            None => false,
        }
    }

    /// Set an action's value, appending it when absent
    pub fn insert(&mut self, action: usize, value: f64) {
        if !self.set(action, value) {
            self.entries.push((action, value));
        }
    }

    /// Action with the highest value; ties go to the first in insertion order
    #[must_use]
    pub fn best_action(&self) -> Option<usize> {
        self.best_among(|_| true)
    }

    /// Highest-valued action accepted by `allowed`; first maximum wins
    pub fn best_among(&self, allowed: impl Fn(usize) -> bool) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for &(action, value) in &self.entries {
            if !allowed(action) {
                continue;
            }
            match best {
                Some((_, best_value)) if value <= best_value => {}
                _ => best = Some((action, value)),
            }
        }
        best.map(|(action, _)| action)
    }

    /// Maximum value, 0 when empty
    #[must_use]
    pub fn max_value(&self) -> f64 {
        self.entries
            .iter()
            .map(|&(_, value)| value)
            .reduce(f64::max)
            .unwrap_or(0.0)
    }

    /// Iterate `(action, value)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.entries.iter().copied()
    }

    /// Number of actions
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no actions are stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for ActionValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (action, value) in &self.entries {
            map.serialize_entry(action, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ActionValues {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ActionValuesVisitor;

        impl<'de> Visitor<'de> for ActionValuesVisitor {
            type Value = ActionValues;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a map of action index to value")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut values = ActionValues {
                    entries: Vec::with_capacity(access.size_hint().unwrap_or(0)),
                };
                while let Some((action, value)) = access.next_entry::<usize, f64>()? {
                    values.entries.push((action, value));
                }
                Ok(values)
            }
        }

        deserializer.deserialize_map(ActionValuesVisitor)
    }
}

/// Q-values learned for a single calorie target
#[derive(Debug, Clone, PartialEq)]
pub struct QTable {
    target_calories: u32,
    states: HashMap<StateKey, ActionValues>,
}

impl QTable {
    /// Empty table for a target
    #[must_use]
    pub fn new(target_calories: u32) -> Self {
        Self {
            target_calories,
            states: HashMap::new(),
        }
    }

    /// Target this table was trained for
    #[must_use]
    pub const fn target_calories(&self) -> u32 {
        self.target_calories
    }

    /// Initialize `state` with zeroed values for `available` if unseen
    ///
    /// Returns `true` when the state was inserted by this call.
    pub fn ensure_state(&mut self, state: &StateKey, available: &[usize]) -> bool {
        if self.states.contains_key(state) {
            return false;
        }
        self.states
            .insert(state.clone(), ActionValues::zeroed(available));
        true
    }

    /// Values for `state`
    #[must_use]
    pub fn get(&self, state: &StateKey) -> Option<&ActionValues> {
        self.states.get(state)
    }

    /// Mutable values for `state`
    pub fn get_mut(&mut self, state: &StateKey) -> Option<&mut ActionValues> {
        self.states.get_mut(state)
    }

    /// Number of visited states
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether no state was visited
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Iterate visited states
    pub fn iter(&self) -> impl Iterator<Item = (&StateKey, &ActionValues)> {
        self.states.iter()
    }
}

/// Composite key of the persisted artifact
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QKey {
    /// Calorie target bucket
    pub target_calories: u32,
    /// Selection state
    pub state: StateKey,
}

/// Persisted Q-table for one dietary profile
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "ArtifactWire")]
pub struct ProfileQTable {
    /// Profile the table was trained for
    pub profile: String,
    /// Fingerprint of the filtered universe used for training
    pub catalog_fingerprint: String,
    /// Size of the filtered universe used for training
    pub universe_size: usize,
    /// Reward policy used during training
    pub reward: RewardPolicy,
    /// Hyperparameters used during training
    pub training: TrainingConfig,
    /// Completion time of the training run
    pub trained_at: DateTime<Utc>,
    targets: BTreeSet<u32>,
    entries: HashMap<QKey, ActionValues>,
}

impl ProfileQTable {
    /// Empty artifact
    pub fn new(
        profile: impl Into<String>,
        catalog_fingerprint: impl Into<String>,
        universe_size: usize,
        reward: RewardPolicy,
        training: TrainingConfig,
    ) -> Self {
        Self {
            profile: profile.into(),
            catalog_fingerprint: catalog_fingerprint.into(),
            universe_size,
            reward,
            training,
            trained_at: Utc::now(),
            targets: BTreeSet::new(),
            entries: HashMap::new(),
        }
    }

    /// Merge a trained fragment, replacing any previous bucket for its target
    pub fn insert_fragment(&mut self, fragment: QTable) {
        let target = fragment.target_calories;
        self.entries.retain(|key, _| key.target_calories != target);
        self.targets.insert(target);
        self.entries.extend(fragment.states.into_iter().map(|(state, values)| {
            (
                QKey {
                    target_calories: target,
                    state,
                },
                values,
            )
        }));
    }

    /// Take every bucket of `newer`, keeping this artifact's other targets
    ///
    /// Metadata (training config, timestamp) follows `newer`; callers check
    /// that both artifacts share a catalog fingerprint and reward policy.
    pub fn merge(&mut self, newer: Self) {
        self.entries
            .retain(|key, _| !newer.targets.contains(&key.target_calories));
        self.targets.extend(newer.targets.iter().copied());
        self.entries.extend(newer.entries);
        self.training = newer.training;
        self.trained_at = newer.trained_at;
    }

    /// Values for `(target, state)`
    #[must_use]
    pub fn lookup(&self, target_calories: u32, state: &StateKey) -> Option<&ActionValues> {
        self.entries.get(&QKey {
            target_calories,
            state: state.clone(),
        })
    }

    /// Whether a bucket was trained for `target`
    #[must_use]
    pub fn has_target(&self, target_calories: u32) -> bool {
        self.targets.contains(&target_calories)
    }

    /// Trained targets, ascending
    pub fn targets(&self) -> impl Iterator<Item = u32> + '_ {
        self.targets.iter().copied()
    }

    /// Trained target closest to `requested`; ties go to the lower target
    #[must_use]
    pub fn nearest_target(&self, requested: u32) -> Option<u32> {
        self.targets
            .iter()
            .copied()
            .min_by_key(|&target| (target.abs_diff(requested), target))
    }

    /// Number of states stored for `target`
    #[must_use]
    pub fn state_count(&self, target_calories: u32) -> usize {
        self.entries
            .keys()
            .filter(|key| key.target_calories == target_calories)
            .count()
    }

    /// Total number of stored `(target, state)` keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the artifact holds no values
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Serialize)]
struct ArtifactWireRef<'a> {
    format_version: u32,
    profile: &'a str,
    catalog_fingerprint: &'a str,
    universe_size: usize,
    reward: &'a RewardPolicy,
    training: &'a TrainingConfig,
    trained_at: &'a DateTime<Utc>,
    buckets: BTreeMap<u32, BTreeMap<String, &'a ActionValues>>,
}

#[derive(Deserialize)]
struct ArtifactWire {
    format_version: u32,
    profile: String,
    catalog_fingerprint: String,
    universe_size: usize,
    reward: RewardPolicy,
    training: TrainingConfig,
    trained_at: DateTime<Utc>,
    buckets: BTreeMap<u32, HashMap<String, ActionValues>>,
}

impl Serialize for ProfileQTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut buckets: BTreeMap<u32, BTreeMap<String, &ActionValues>> = self
            .targets
            .iter()
            .map(|&target| (target, BTreeMap::new()))
            .collect();
        for (key, values) in &self.entries {
            buckets
                .entry(key.target_calories)
                .or_default()
                .insert(key.state.to_string(), values);
        }
        ArtifactWireRef {
            format_version: ARTIFACT_FORMAT_VERSION,
            profile: &self.profile,
            catalog_fingerprint: &self.catalog_fingerprint,
            universe_size: self.universe_size,
            reward: &self.reward,
            training: &self.training,
            trained_at: &self.trained_at,
            buckets,
        }
        .serialize(serializer)
    }
}

impl TryFrom<ArtifactWire> for ProfileQTable {
    type Error = String;

    fn try_from(wire: ArtifactWire) -> Result<Self, Self::Error> {
        if wire.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(format!(
                "unsupported artifact format version {} (expected {ARTIFACT_FORMAT_VERSION})",
                wire.format_version
            ));
        }
        let mut targets = BTreeSet::new();
        let mut entries = HashMap::new();
        for (target, states) in wire.buckets {
            targets.insert(target);
            for (signature, values) in states {
                let state = signature
                    .parse::<StateKey>()
                    .map_err(|e| format!("invalid state signature '{signature}': {e}"))?;
                entries.insert(
                    QKey {
                        target_calories: target,
                        state,
                    },
                    values,
                );
            }
        }
        Ok(Self {
            profile: wire.profile,
            catalog_fingerprint: wire.catalog_fingerprint,
            universe_size: wire.universe_size,
            reward: wire.reward,
            training: wire.training,
            trained_at: wire.trained_at,
            targets,
            entries,
        })
    }
}

/// Decode a persisted artifact
///
/// # Errors
///
/// Returns a deserialization error for malformed input or an unsupported
/// format version
pub fn decode_artifact(bytes: &[u8]) -> Result<ProfileQTable, serde_json::Error> {
    serde_json::from_slice(bytes)
}
