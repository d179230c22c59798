//! Job review before execution.
//!
//! The operator sees the planned jobs, narrows them down with a short
//! selection expression and confirms the run settings.

use colored::Colorize;
use inquire::validator::Validation;
use inquire::{Confirm, CustomUserError, Text};

use crate::error::{Result, SyncError};
use crate::job::SyncJob;
use crate::sync::RunOptions;

/// Parsed selection expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    All,
    Quit,
    /// Zero-based job indices in the order given
    Indices(Vec<usize>),
}

/// Parse `all`, `q`/`quit`, `X`, `X:Y` or `X,Y,Z` against `job_count` jobs.
///
/// Numbers are one-based. A range needs `1 <= X < Y <= job_count` and
/// includes both ends. Repeated list entries are dropped.
pub fn parse_selection(input: &str, job_count: usize) -> std::result::Result<Selection, String> {
    let input = input.trim().to_lowercase();

    match input.as_str() {
        "q" | "quit" => return Ok(Selection::Quit),
        "all" => return Ok(Selection::All),
        _ => {}
    }

    if let Some((start, end)) = input.split_once(':') {
        let (Ok(start), Ok(end)) = (start.trim().parse::<usize>(), end.trim().parse::<usize>())
        else {
            return Err("Invalid format. Use X:Y with numeric values.".to_string());
        };
        if !(1 <= start && start < end && end <= job_count) {
            return Err(format!(
                "Invalid range: start must be < end and both in 1-{job_count}."
            ));
        }
        return Ok(Selection::Indices((start - 1..end).collect()));
    }

    if input.contains(',') {
        let numbers: std::result::Result<Vec<usize>, _> =
            input.split(',').map(|n| n.trim().parse::<usize>()).collect();
        let Ok(numbers) = numbers else {
            return Err("Invalid format. Use digits separated by commas, like 1,3,5.".to_string());
        };
        if !numbers.iter().all(|n| (1..=job_count).contains(n)) {
            return Err(format!("Invalid input: numbers must be in 1-{job_count}."));
        }

        let mut indices = Vec::with_capacity(numbers.len());
        for n in numbers {
            if !indices.contains(&(n - 1)) {
                indices.push(n - 1);
            }
        }
        return Ok(Selection::Indices(indices));
    }

    if !input.is_empty() && input.chars().all(|c| c.is_ascii_digit()) {
        return match input.parse::<usize>() {
            Ok(n) if (1..=job_count).contains(&n) => Ok(Selection::Indices(vec![n - 1])),
            _ => Err(format!("Invalid number: must be between 1 and {job_count}.")),
        };
    }

    Err("Unrecognized input. Try again.".to_string())
}

/// Decides which planned jobs actually run.
pub trait JobSelector {
    /// The jobs to execute; empty aborts the run.
    fn select(&mut self, jobs: &[SyncJob], options: &RunOptions) -> Result<Vec<SyncJob>>;
}

/// Runs every job without asking (`--yes`, non-interactive use)
#[derive(Debug, Default)]
pub struct SelectAll;

impl JobSelector for SelectAll {
    fn select(&mut self, jobs: &[SyncJob], _options: &RunOptions) -> Result<Vec<SyncJob>> {
        Ok(jobs.to_vec())
    }
}

/// Prompts on the terminal
#[derive(Debug, Default)]
pub struct InteractiveSelector;

impl JobSelector for InteractiveSelector {
    fn select(&mut self, jobs: &[SyncJob], options: &RunOptions) -> Result<Vec<SyncJob>> {
        if jobs.is_empty() {
            println!("{}", "No synchronization jobs scheduled.".yellow());
            return Ok(Vec::new());
        }

        let indices = if jobs.len() > 1 {
            println!("\n{}\n", "The following synchronization jobs are scheduled:".bold());
            print_jobs(jobs, 0..jobs.len());

            match prompt_selection(jobs.len())? {
                Selection::Quit => {
                    println!("{}", "Selection canceled. No jobs selected.".yellow());
                    return Ok(Vec::new());
                }
                Selection::All => (0..jobs.len()).collect(),
                Selection::Indices(indices) => indices,
            }
        } else {
            vec![0]
        };

        println!("\n{}\n", "Please confirm the following synchronization jobs:".bold());
        print_jobs(jobs, indices.iter().copied());
        print_settings(options);

        let proceed = Confirm::new("Do you want to continue?")
            .with_default(false)
            .prompt()
            .map_err(|e| SyncError::Prompt(e.to_string()))?;

        if !proceed {
            println!("\n{}", "Synchronization cancelled.".yellow());
            return Ok(Vec::new());
        }

        Ok(indices.into_iter().map(|i| jobs[i].clone()).collect())
    }
}

/// Both stdin and stdout are attached to a terminal
pub fn is_interactive() -> bool {
    atty::is(atty::Stream::Stdin) && atty::is(atty::Stream::Stdout)
}

fn prompt_selection(job_count: usize) -> Result<Selection> {
    let answer = Text::new("Select jobs to execute:")
        .with_default("all")
        .with_help_message("[all], [X], [X:Y], [X,Y,Z], or [q] to quit")
        .with_validator(move |input: &str| {
            let validation = match parse_selection(input, job_count) {
                Ok(_) => Validation::Valid,
                Err(message) => Validation::Invalid(message.into()),
            };
            Ok::<_, CustomUserError>(validation)
        })
        .prompt()
        .map_err(|e| SyncError::Prompt(e.to_string()))?;

    parse_selection(&answer, job_count).map_err(SyncError::Prompt)
}

fn print_jobs(jobs: &[SyncJob], indices: impl IntoIterator<Item = usize>) {
    for i in indices {
        println!("  {}. {}", (i + 1).to_string().cyan(), jobs[i].describe());
    }
}

fn print_settings(options: &RunOptions) {
    println!("\n{}", "Settings:".bold());
    println!("  • Dry Run:                         {}", yes_no(options.dry_run));
    println!(
        "  • Remove files at destination:     {}",
        yes_no(options.delete_extraneous)
    );
}

fn yes_no(flag: bool) -> String {
    if flag {
        "Yes".green().to_string()
    } else {
        "No".normal().to_string()
    }
}
