//! Command-line interface for scurry.
//!
//! Uses clap for argument parsing. Command flags override values from the
//! configuration file, which overrides the embedded defaults.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};

use crate::config::ScurryConfig;

mod commands;
mod output;

pub use output::Output;

/// Scurry - adaptive worker-pool HTTP probe scanner
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<String>,

    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Enable quiet output (minimal)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Probe a list of target hosts through the worker pool
    Scan {
        /// Targets file with one `host[,extra]` line per entry
        #[arg(short, long, value_name = "FILE")]
        targets: String,

        /// Append results to this file (overrides config)
        #[arg(short, long, value_name = "FILE")]
        output: Option<String>,

        /// Initial worker count (overrides config; 0 = auto-detect)
        #[arg(short, long)]
        workers: Option<usize>,

        /// Capacity bound: queue length and worker ceiling (overrides config)
        #[arg(long)]
        capacity: Option<usize>,

        /// Enable the throughput feedback controller
        #[arg(long)]
        feedback: bool,
    },
    /// Show version information
    Version,
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        init_tracing(self.verbose);
        let output = Output::new(self.verbose > 0, self.quiet);

        match self.command {
            Some(Commands::Scan {
                targets,
                output: result_file,
                workers,
                capacity,
                feedback,
            }) => {
                let config = ScurryConfig::load(self.config.as_deref())?;
                let args = commands::scan::ScanArgs {
                    targets,
                    output: result_file,
                    workers,
                    capacity,
                    feedback,
                };
                commands::scan::execute(args, config, &output)
            }
            Some(Commands::Version) => commands::version::execute(&output),
            None => {
                // Show help when no command is provided
                let mut cmd = Cli::command();
                cmd.print_help()?;
                Ok(())
            }
        }
    }
}

fn init_tracing(verbose: u8) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        match verbose {
            0 => tracing_subscriber::EnvFilter::new("warn"),
            1 => tracing_subscriber::EnvFilter::new("info"),
            2 => tracing_subscriber::EnvFilter::new("debug"),
            _ => tracing_subscriber::EnvFilter::new("trace"),
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
