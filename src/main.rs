use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;

use syncbuddy::handlers::{self, PlanFormat};
use syncbuddy::logger;
use syncbuddy::pick::LocationArg;
use syncbuddy::sync::RunOptions;

#[derive(Parser)]
#[command(name = "syncbuddy")]
#[command(about = "Synchronize directories between locations, encrypting sensitive data on the way", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the configuration file (default: ./config.yaml, then the config directory, then /etc/syncbuddy)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Show debug output, including every external command
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Synchronize a source location with a destination location
    Sync {
        /// Source location, optionally with a picked path (e.g. laptop or laptop:docs/report.pdf)
        #[arg(long)]
        src: Option<LocationArg>,

        /// Destination location, optionally with a picked path (e.g. usb or usb:backup)
        #[arg(long)]
        dst: Option<LocationArg>,

        /// Make a dry (test) run
        #[arg(long)]
        dry: bool,

        /// Remove files from the destination that do not exist on the source
        #[arg(long)]
        remove: bool,

        /// Encrypt the source (pick mode with a picked destination only)
        #[arg(long)]
        encrypt: bool,

        /// Manually pair source and destination directories
        #[arg(long = "match")]
        manual_matching: bool,

        /// Run all planned jobs without asking for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Show the jobs a sync would run without executing them
    Plan {
        /// Source location, optionally with a picked path
        #[arg(long)]
        src: LocationArg,

        /// Destination location, optionally with a picked path
        #[arg(long)]
        dst: LocationArg,

        /// Encrypt the source (pick mode with a picked destination only)
        #[arg(long)]
        encrypt: bool,

        /// Manually pair source and destination directories
        #[arg(long = "match")]
        manual_matching: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = PlanFormat::Text)]
        format: PlanFormat,
    },

    /// List the configured locations
    Locations,

    /// Check that rsync, ssh, gpg and tar are installed
    Check,
}

fn run(cli: Cli) -> Result<bool> {
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Sync {
            src,
            dst,
            dry,
            remove,
            encrypt,
            manual_matching,
            yes,
        } => {
            let options = RunOptions {
                dry_run: dry,
                delete_extraneous: remove,
                manual_matching,
                encrypt_on_pick: encrypt,
                assume_yes: yes,
            };
            let report = handlers::handle_sync(config, src, dst, options)?;
            return Ok(report.is_success());
        }
        Commands::Plan {
            src,
            dst,
            encrypt,
            manual_matching,
            format,
        } => {
            let options = RunOptions {
                manual_matching,
                encrypt_on_pick: encrypt,
                ..Default::default()
            };
            handlers::handle_plan(config, &src, &dst, options, format)?;
        }
        Commands::Locations => handlers::handle_locations(config)?,
        Commands::Check => handlers::handle_check()?,
    }

    Ok(true)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logger::init_logger(cli.verbose) {
        eprintln!("Warning: failed to initialize logging: {e:#}");
    }

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{} {e:#}", "Error:".red().bold());
            ExitCode::FAILURE
        }
    }
}
