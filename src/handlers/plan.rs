//! Plan command handler
//!
//! Shows the jobs a sync would run, without touching anything.

use anyhow::{Context, Result};
use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use std::path::Path;

use crate::job::SyncJob;
use crate::matching::InquireChooser;
use crate::pick::{apply_pick_mode, LocationArg};
use crate::planner::Plan;
use crate::sync::{plan_locations, RunOptions};
use crate::tools::SystemFileSystem;

use super::load_config;

/// Output format of the plan command
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum PlanFormat {
    #[default]
    Text,
    Json,
}

#[derive(Serialize)]
struct PlanOutput<'a> {
    source: String,
    destination: String,
    jobs: &'a [SyncJob],
    warnings: &'a [String],
}

/// Handle plan command
pub fn handle_plan(
    config_path: Option<&Path>,
    source: &LocationArg,
    destination: &LocationArg,
    options: RunOptions,
    format: PlanFormat,
) -> Result<()> {
    let (_, config) = load_config(config_path)?;
    let config = apply_pick_mode(&config, source, destination, options.encrypt_on_pick)?;

    let plan = plan_locations(
        &config,
        &source.location,
        &destination.location,
        &options,
        &SystemFileSystem,
        &mut InquireChooser,
    )
    .context("Failed to plan synchronization")?;

    match format {
        PlanFormat::Json => {
            let output = PlanOutput {
                source: source.to_string(),
                destination: destination.to_string(),
                jobs: &plan.jobs,
                warnings: &plan.warnings,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        PlanFormat::Text => print_plan(source, destination, &plan),
    }

    Ok(())
}

fn print_plan(source: &LocationArg, destination: &LocationArg, plan: &Plan) {
    println!(
        "{} {} {} {}",
        "Plan:".cyan().bold(),
        source.to_string().bold(),
        "->".dimmed(),
        destination.to_string().bold()
    );
    println!("{}", "=".repeat(80).cyan());

    if plan.jobs.is_empty() {
        println!("{}", "Nothing to synchronize.".yellow());
    }

    for (idx, job) in plan.jobs.iter().enumerate() {
        println!("\n{} {}", format!("{}.", idx + 1).bold(), job.describe());
        if !job.excludes.is_empty() {
            println!("   {} {}", "Excludes:".dimmed(), job.excludes.join(", "));
        }
        if job.encrypt {
            println!("   {} {}", "Encryption:".dimmed(), job.encryption_mode);
        }
    }

    if !plan.warnings.is_empty() {
        println!("\n{}", "Warnings:".yellow().bold());
        for warning in &plan.warnings {
            println!("  {} {}", "!".yellow(), warning);
        }
    }
}
