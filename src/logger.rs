use anyhow::{Context, Result};
use log::LevelFilter;
use std::fs::OpenOptions;
use std::io::Write;

use crate::config::ConfigManager;
use crate::executor::RunReport;

const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024; // 10MB

/// Initialize the logging system
///
/// Sets up logging to the console and records the start of a run in a log
/// file in the config directory.
///
/// **Console logging** defaults to `info`, or `debug` with `--verbose`. The
/// `RUST_LOG` environment variable takes precedence over both:
/// - `RUST_LOG=error` - Only errors
/// - `RUST_LOG=warn` - Warnings and errors
/// - `RUST_LOG=debug` - Every command that is run
///
/// **File logging** is stored at:
/// - Linux: ~/.config/syncbuddy/syncbuddy.log or $XDG_CONFIG_HOME/syncbuddy/syncbuddy.log
/// - macOS: ~/Library/Application Support/syncbuddy/syncbuddy.log
/// - Windows: %APPDATA%\syncbuddy\syncbuddy.log
///
/// ## Examples
///
/// ```bash
/// # Show the rsync, gpg and ssh commands being run
/// syncbuddy --verbose sync --src laptop --dst usb
///
/// # Only show errors on console
/// RUST_LOG=error syncbuddy sync --src laptop --dst usb --yes
/// ```
pub fn init_logger(verbose: bool) -> Result<()> {
    ConfigManager::ensure_config_dir()?;

    let fallback = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|s| s.parse::<LevelFilter>().ok())
        .unwrap_or(fallback);

    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{:5}] {}",
                chrono::Local::now().format("%H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter_level(level)
        .target(env_logger::Target::Stdout)
        .try_init()
        .ok(); // already initialized in tests

    rotate_log_if_needed()?;
    log_to_file(&format!("Logger initialized with level: {level:?}"))?;

    Ok(())
}

/// Append a timestamped line to the log file
pub fn log_to_file(message: &str) -> Result<()> {
    let log_path = ConfigManager::log_file_path()?;

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file: {}", log_path.display()))?;

    writeln!(
        file,
        "[{}] {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        message
    )?;

    Ok(())
}

/// Record the outcome of a run in the log file
pub fn log_run_summary(source: &str, destination: &str, report: &RunReport) -> Result<()> {
    log_to_file(&format!(
        "Synchronized {source} -> {destination}: {} of {} job(s) succeeded, {} error(s)",
        report.succeeded, report.attempted, report.errors
    ))
}

/// Rotate the log file once it exceeds 10MB
pub fn rotate_log_if_needed() -> Result<()> {
    let log_path = ConfigManager::log_file_path()?;

    if log_path.exists() && std::fs::metadata(&log_path)?.len() > MAX_LOG_SIZE {
        let old_log_path = log_path.with_extension("log.old");

        if old_log_path.exists() {
            std::fs::remove_file(&old_log_path)?;
        }
        std::fs::rename(&log_path, &old_log_path)?;

        log::info!("Log file rotated to {}", old_log_path.display());
    }

    Ok(())
}
