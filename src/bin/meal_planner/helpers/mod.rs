// ABOUTME: Helper modules for the meal-planner CLI
// ABOUTME: Provides display formatting for plans, training outcomes, and evaluation reports
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub mod display;
