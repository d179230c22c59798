//! # syncbuddy
//!
//! A command-line tool that mirrors directories between named locations
//! (local disks, USB drives, SSH hosts) with `rsync`, encrypting sensitive
//! data with `gpg` before it reaches a location that is not trusted.
//!
//! ## Overview
//!
//! Locations are declared in a YAML (or TOML) configuration file. Each one
//! has a root directory, a trust flag, optional SSH settings and a list of
//! directories. Directories, or sub-directories of them, may be marked
//! sensitive. A run pairs the directories of a source location with those
//! of a destination location, derives a list of synchronization jobs and
//! executes them one after another.
//!
//! ## Key Features
//!
//! - **Trust-aware encryption**: sensitive data is encrypted before it is
//!   sent to an untrusted location and decrypted on arrival at a trusted one
//! - **Two encryption modes**: one ciphertext per file, or one encrypted
//!   archive per directory
//! - **Pick mode**: synchronize a single file or directory ad hoc
//! - **Job review**: select and confirm the planned jobs before anything runs
//! - **Remote locations**: everything works over SSH
//!
//! ## Architecture
//!
//! - Configuration and logging ([`config`], [`logger`], [`error`])
//! - Path and directory model ([`path`], [`directory`], [`security`])
//! - Planning ([`preprocess`], [`matching`], [`job`], [`planner`], [`pick`])
//! - Execution ([`executor`], [`tools`], [`selection`])
//! - Orchestration and CLI ([`sync`], [`handlers`])

/// Platform-agnostic configuration directory management and the
/// configuration file model.
///
/// Locates configuration files (working directory, XDG/Application
/// Support/AppData, `/etc/syncbuddy`) and parses them into an immutable
/// [`config::SyncConfig`].
pub mod config;

/// Directory descriptors built from configured directory entries.
///
/// A descriptor carries the absolute root of a directory, its sensitivity,
/// its encryption mode and the exclude and sensitive sub-paths below it.
pub mod directory;

/// Typed error taxonomy shared by the library.
pub mod error;

/// Sequential execution of synchronization jobs.
///
/// Each job ensures its destination exists, encrypts when required,
/// transfers, and decrypts ciphertexts at trusted destinations. Failures are
/// counted per job and never stop the run.
pub mod executor;

/// Command handlers behind the CLI subcommands.
pub mod handlers;

/// The unit of work produced by the planner.
pub mod job;

/// Logging configuration and utilities.
///
/// Sets up console logging (configurable via `RUST_LOG` or `--verbose`) and
/// a persistent log file in the config directory, with automatic rotation
/// when the file exceeds its size limit.
pub mod logger;

/// Pairing of source and destination directories, by position or
/// interactively.
pub mod matching;

/// Path model distinguishing local and remote (SSH) paths.
pub mod path;

/// Ad-hoc `location:path` picks that override a location's directories.
pub mod pick;

/// Job planning.
///
/// Turns matched directory pairs into an ordered job list and splits
/// sensitive sub-directories into dedicated encrypted jobs when the
/// destination is untrusted.
pub mod planner;

/// Conversion of configured locations into directory descriptors.
pub mod preprocess;

/// Encrypt/decrypt decision from sensitivity, ciphertext state and trust.
pub mod security;

/// Interactive review and selection of planned jobs.
pub mod selection;

/// Run orchestration: preprocess, match, plan, select, execute.
pub mod sync;

/// External tools (rsync, gpg, tar, ssh) behind small traits.
pub mod tools;
