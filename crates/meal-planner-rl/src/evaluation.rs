// ABOUTME: Offline evaluation of trained policies against calorie targets
// ABOUTME: Repeated recommendations per target with deviation statistics and a random baseline
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Evaluation Harness
//!
//! Samples `trials` recommendations for each target and reports the mean
//! and population variance of the absolute calorie deviation, plus the share
//! of plans within the tolerance band. Targets without a trained bucket are
//! skipped and listed in the report.

use crate::config::EvaluationConfig;
use crate::recommender::Recommender;
use meal_planner_core::constants::MEALS_PER_PLAN;
use meal_planner_core::errors::{AppError, AppResult, PlannerError};
use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{info, warn};

/// Statistics for one target
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetEvaluation {
    /// Target evaluated
    pub target_calories: u32,
    /// Recommendations sampled
    pub trials: usize,
    /// Mean absolute deviation in kcal
    pub mean_deviation: f64,
    /// Population variance of the deviation
    pub variance: f64,
    /// Plans within the tolerance
    pub successes: usize,
    /// `successes / trials`
    pub success_rate: f64,
}

/// Aggregate evaluation result for a profile
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    /// Profile evaluated
    pub profile: String,
    /// Success band in kcal
    pub tolerance_kcal: u32,
    /// Per-target statistics, in request order
    pub targets: Vec<TargetEvaluation>,
    /// Targets without a trained bucket
    pub skipped: Vec<u32>,
    /// Trials over all evaluated targets
    pub total_trials: usize,
    /// Successes over all evaluated targets
    pub total_successes: usize,
    /// `total_successes / total_trials`, 0 when nothing was evaluated
    pub achievement_ratio: f64,
}

/// Policy versus uniformly random plans for one target
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaselineTarget {
    /// Target evaluated
    pub target_calories: u32,
    /// Mean deviation of the learned policy
    pub policy_mean_deviation: f64,
    /// Mean deviation of random plans
    pub random_mean_deviation: f64,
}

/// Policy versus random comparison for a profile
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaselineComparison {
    /// Profile evaluated
    pub profile: String,
    /// Policy statistics the comparison was computed from
    pub policy: EvaluationReport,
    /// Per-target comparison
    pub targets: Vec<BaselineTarget>,
    /// Share of targets where the policy beat random
    pub improved_fraction: f64,
}

/// `(mean, population variance)`; zeros for an empty sample
#[must_use]
pub fn mean_and_variance(samples: &[f64]) -> (f64, f64) {
    if samples.is_empty() {
        return (0.0, 0.0);
    }
    let count = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / count;
    let variance = samples
        .iter()
        .map(|value| (value - mean).powi(2))
        .sum::<f64>()
        / count;
    (mean, variance)
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn is_skippable(error: &AppError) -> bool {
    error.planner_error().is_some_and(PlannerError::is_skippable)
}

/// Evaluates trained policies through a [`Recommender`]
pub struct EvaluationHarness<'a> {
    recommender: &'a Recommender,
    config: EvaluationConfig,
}

impl<'a> EvaluationHarness<'a> {
    /// Create a harness
    ///
    /// # Errors
    ///
    /// Returns a configuration error when no trials are requested
    pub fn new(recommender: &'a Recommender, config: EvaluationConfig) -> AppResult<Self> {
        config.validate()?;
        Ok(Self {
            recommender,
            config,
        })
    }

    /// Evaluate using OS entropy for fallbacks
    ///
    /// # Errors
    ///
    /// See [`EvaluationHarness::evaluate_with_rng`]
    pub async fn evaluate(&self, profile: &str, targets: &[u32]) -> AppResult<EvaluationReport> {
        let mut rng = StdRng::from_entropy();
        self.evaluate_with_rng(profile, targets, &mut rng).await
    }

    /// Evaluate each target with `trials` recommendations
    ///
    /// # Errors
    ///
    /// Propagates every recommender error except a missing bucket, which
    /// skips the target
    pub async fn evaluate_with_rng<R: Rng + Send>(
        &self,
        profile: &str,
        targets: &[u32],
        rng: &mut R,
    ) -> AppResult<EvaluationReport> {
        let tolerance = u64::from(self.config.tolerance_kcal);
        let mut evaluated = Vec::with_capacity(targets.len());
        let mut skipped = Vec::new();

        'targets: for &target in targets {
            let mut deviations = Vec::with_capacity(self.config.trials);
            let mut successes = 0;
            for _ in 0..self.config.trials {
                match self
                    .recommender
                    .recommend_from_bucket(profile, target, rng)
                    .await
                {
                    Ok(plan) => {
                        let deviation = plan.deviation();
                        if deviation <= tolerance {
                            successes += 1;
                        }
                        deviations.push(deviation as f64);
                    }
                    Err(error) if is_skippable(&error) => {
                        warn!(profile, target, error = %error, "Skipping target");
                        skipped.push(target);
                        continue 'targets;
                    }
                    Err(error) => return Err(error),
                }
            }

            let (mean_deviation, variance) = mean_and_variance(&deviations);
            info!(
                profile,
                target,
                mean_deviation,
                variance,
                successes,
                trials = self.config.trials,
                "Evaluated target"
            );
            evaluated.push(TargetEvaluation {
                target_calories: target,
                trials: self.config.trials,
                mean_deviation,
                variance,
                successes,
                success_rate: ratio(successes, self.config.trials),
            });
        }

        let total_trials = evaluated.iter().map(|stats| stats.trials).sum();
        let total_successes = evaluated.iter().map(|stats| stats.successes).sum();
        Ok(EvaluationReport {
            profile: profile.to_owned(),
            tolerance_kcal: self.config.tolerance_kcal,
            targets: evaluated,
            skipped,
            total_trials,
            total_successes,
            achievement_ratio: ratio(total_successes, total_trials),
        })
    }

    /// Compare the learned policy against uniformly random plans
    ///
    /// # Errors
    ///
    /// Propagates recommender and catalog errors except missing buckets
    pub async fn compare_with_random<R: Rng + Send>(
        &self,
        profile: &str,
        targets: &[u32],
        rng: &mut R,
    ) -> AppResult<BaselineComparison> {
        let policy = self.evaluate_with_rng(profile, targets, rng).await?;
        let universe = self.recommender.universe(profile).await?;
        if universe.len() < MEALS_PER_PLAN {
            return Err(PlannerError::CatalogEmpty {
                profile: profile.to_owned(),
                available: universe.len(),
                required: MEALS_PER_PLAN,
            }
            .into());
        }

        let mut compared = Vec::with_capacity(policy.targets.len());
        for stats in &policy.targets {
            let deviations: Vec<f64> = (0..self.config.trials)
                .map(|_| {
                    let total: i64 = index::sample(&mut *rng, universe.len(), MEALS_PER_PLAN)
                        .iter()
                        .filter_map(|position| universe.get(position))
                        .map(|meal| i64::from(meal.calories))
                        .sum();
                    (total - i64::from(stats.target_calories)).unsigned_abs() as f64
                })
                .collect();
            let (random_mean_deviation, _) = mean_and_variance(&deviations);
            compared.push(BaselineTarget {
                target_calories: stats.target_calories,
                policy_mean_deviation: stats.mean_deviation,
                random_mean_deviation,
            });
        }

        let improved = compared
            .iter()
            .filter(|target| target.policy_mean_deviation < target.random_mean_deviation)
            .count();
        Ok(BaselineComparison {
            profile: profile.to_owned(),
            improved_fraction: ratio(improved, compared.len()),
            targets: compared,
            policy,
        })
    }
}
