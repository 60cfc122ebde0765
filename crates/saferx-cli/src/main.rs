//! saferx CLI - check regexes, replacement templates and address globs.

mod commands;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "saferx")]
#[command(about = "Reject regexes that can backtrack catastrophically before they ever run", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Configuration file path (defaults to ~/.saferx/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Output JSON instead of human-readable text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Check a pattern against safety limits
    ///
    /// Limits not given on the command line come from the config file.
    /// Exits with status 1 when the pattern is rejected.
    Check {
        /// Regular expression to check
        pattern: String,

        /// Maximum nesting of unbounded quantifiers
        #[arg(long, value_name = "N")]
        max_star_height: Option<u32>,

        /// Maximum product of nested finite repetition bounds
        #[arg(long, value_name = "N")]
        max_repetitions: Option<u64>,

        /// Accept patterns containing backreferences
        #[arg(long)]
        allow_backreferences: bool,
    },

    /// Validate a replacement template against a pattern's groups
    Template {
        /// Regular expression the template will be used with
        pattern: String,

        /// Replacement template ($1, ${name}, \ escapes)
        template: String,
    },

    /// Translate an address glob into a regular expression
    Glob {
        /// Glob to translate (*, ?, [..], {a,b})
        glob: String,
    },

    /// Compare two addresses, either of which may be a glob
    ///
    /// Exits with status 1 when they do not match.
    Match {
        /// First address
        a: String,

        /// Second address
        b: String,
    },

    /// Manage saferx configuration
    Config {
        #[command(subcommand)]
        command: commands::ConfigCommand,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let output = commands::Output { json: cli.json };
    let config_path = cli.config.as_deref();

    let passed = match cli.command {
        Command::Check {
            pattern,
            max_star_height,
            max_repetitions,
            allow_backreferences,
        } => {
            let overrides = commands::LimitOverrides {
                max_star_height,
                max_repetitions,
                allow_backreferences,
            };
            commands::run_check(config_path, &pattern, overrides, output)?
        }
        Command::Template { pattern, template } => {
            commands::run_template(config_path, &pattern, &template, output)?
        }
        Command::Glob { glob } => commands::run_glob(config_path, &glob, output)?,
        Command::Match { a, b } => commands::run_match(config_path, &a, &b, output)?,
        Command::Config { command } => {
            commands::handle_config_command(command, config_path, output)?;
            true
        }
    };

    Ok(if passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
