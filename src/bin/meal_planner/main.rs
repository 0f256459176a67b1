// ABOUTME: meal-planner CLI for training, querying, and evaluating meal plan policies
// ABOUTME: Parses subcommands, initializes logging and configuration, and dispatches to command modules
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
//!
//! Usage:
//! ```bash
//! # Train every profile that has no saved Q-table yet
//! meal-planner train --all
//!
//! # Retrain one profile with a fixed seed and a shaped reward
//! meal-planner train --profile vegan --seed 7 --reward tiered --force
//!
//! # Recommend four meals for an allowed target
//! meal-planner recommend --profile high-protein --target 1800
//!
//! # Use the closest trained target for an arbitrary request
//! meal-planner recommend --profile low-carb --target 1234 --nearest
//!
//! # Evaluate against a random baseline
//! meal-planner evaluate --profile vegan --targets 800,1000,1200 --baseline
//!
//! # List dietary profiles and their allowed targets
//! meal-planner profiles
//! ```

mod commands;
mod helpers;

use clap::{Parser, Subcommand};
use commands::CommandContext;
use meal_planner::config::PlannerConfig;
use meal_planner::logging::LoggingConfig;
use meal_planner_core::config::ProfileRegistry;
use meal_planner_rl::reward::RewardPolicy;
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser)]
#[command(
    name = "meal-planner",
    about = "Reinforcement-learning meal plan recommender",
    long_about = "Trains per-profile Q-learning policies over a recipe catalog and recommends four-meal daily plans close to a calorie target."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Q-table directory override (MEAL_PLANNER_TABLES_DIR)
    #[arg(long, global = true)]
    tables_dir: Option<PathBuf>,

    /// Recipe catalog override (MEAL_PLANNER_CATALOG_PATH)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// Train and save Q-tables
    Train {
        /// Profile to train
        #[arg(long, required_unless_present = "all", conflicts_with = "all")]
        profile: Option<String>,

        /// Train every registered profile
        #[arg(long)]
        all: bool,

        /// Episodes per target
        #[arg(long)]
        episodes: Option<u64>,

        /// Seed for reproducible training
        #[arg(long)]
        seed: Option<u64>,

        /// Retrain even when a Q-table exists
        #[arg(long)]
        force: bool,

        /// Reward policy (sparse, tiered, protein, protein_fat)
        #[arg(long)]
        reward: Option<RewardPolicy>,

        /// Train only these targets (comma-separated)
        #[arg(long, value_delimiter = ',')]
        targets: Vec<u32>,

        /// Stop training after this many seconds
        #[arg(long)]
        time_limit_secs: Option<u64>,
    },

    /// Recommend a four-meal plan
    Recommend {
        /// Dietary profile
        #[arg(long)]
        profile: String,

        /// Target calories
        #[arg(long)]
        target: u32,

        /// Use the closest trained target instead of requiring an allowed one
        #[arg(long)]
        nearest: bool,

        /// Seed for the random fallback
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Evaluate a trained profile
    Evaluate {
        /// Dietary profile
        #[arg(long)]
        profile: String,

        /// Targets to evaluate (comma-separated, defaults to the profile sweep)
        #[arg(long, value_delimiter = ',')]
        targets: Vec<u32>,

        /// Recommendations per target
        #[arg(long)]
        trials: Option<usize>,

        /// Success band in kcal
        #[arg(long)]
        tolerance: Option<u32>,

        /// Also compare against uniformly random plans
        #[arg(long)]
        baseline: bool,

        /// Seed for fallbacks and baseline sampling
        #[arg(long)]
        seed: Option<u64>,
    },

    /// List dietary profiles
    Profiles,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logging = LoggingConfig::from_env();
    let logging = if cli.verbose {
        logging.with_level("debug")
    } else {
        logging
    };
    logging.init()?;

    let mut config = PlannerConfig::from_env()?;
    if let Some(dir) = cli.tables_dir {
        config.tables_dir = dir;
    }
    if let Some(path) = cli.catalog {
        config.catalog.path = path;
    }
    debug!(
        tables_dir = %config.tables_dir.display(),
        catalog = %config.catalog.path.display(),
        reward = config.reward.name(),
        "Configuration loaded"
    );

    let ctx = CommandContext::new(config, ProfileRegistry::builtin(), cli.json);

    match cli.command {
        Command::Train {
            profile,
            all,
            episodes,
            seed,
            force,
            reward,
            targets,
            time_limit_secs,
        } => {
            let options = commands::train::TrainOptions {
                profile: if all { None } else { profile },
                episodes,
                seed,
                force,
                reward,
                targets,
                time_limit_secs,
            };
            commands::train::run(&ctx, options).await?;
        }
        Command::Recommend {
            profile,
            target,
            nearest,
            seed,
        } => {
            commands::recommend::run(&ctx, &profile, target, nearest, seed).await?;
        }
        Command::Evaluate {
            profile,
            targets,
            trials,
            tolerance,
            baseline,
            seed,
        } => {
            let options = commands::evaluate::EvaluateOptions {
                targets,
                trials,
                tolerance,
                baseline,
                seed,
            };
            commands::evaluate::run(&ctx, &profile, options).await?;
        }
        Command::Profiles => commands::profiles::run(&ctx)?,
    }

    Ok(())
}
