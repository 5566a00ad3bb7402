// SPDX-License-Identifier: PMPL-1.0-or-later
//!
//! clearance: inspect the permission catalog and role tables, and evaluate
//! permission checks from the shell.
//!
//! `clearance check` exits 0 when the check is granted and 1 when denied,
//! so it composes with shell conditionals.

mod commands;
mod formatter;

use clap::{Parser, Subcommand};
use clearance_core::{Role, UnknownPermissionPolicy};
use colored::Colorize;
use std::process::ExitCode;

use commands::CheckRequest;
use formatter::{format_value, OutputFormat};

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ---------------------------------------------------------------------------
// CLI argument parsing
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "clearance", version = VERSION, about = "Inspect and evaluate Clearance permissions")]
struct Cli {
    /// Output format (table or json).
    #[arg(long, global = true, default_value = "table")]
    format: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List catalogued permission keys with descriptions.
    Permissions {
        /// Only keys in this namespace (e.g. `invoices`).
        #[arg(long)]
        namespace: Option<String>,
    },
    /// Summarise every role, or list one role's permissions.
    Roles {
        role: Option<String>,
    },
    /// Show which roles hold each permission.
    Matrix,
    /// Evaluate a permission check for a role.
    Check {
        /// Role string; unrecognised roles hold no catalogued keys.
        #[arg(long)]
        role: String,

        /// Grant the per-user job-complete override.
        #[arg(long)]
        can_set_job_complete: bool,

        /// Require every key instead of any one.
        #[arg(long)]
        all: bool,

        /// Treatment of keys missing from the catalog (allow or deny).
        #[arg(long, default_value = "allow")]
        policy: String,

        /// Permission keys to check.
        #[arg(required = true)]
        keys: Vec<String>,
    },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {e:#}", "error:".red().bold());
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let format: OutputFormat = cli.format.parse().map_err(anyhow::Error::msg)?;

    match cli.command {
        Command::Permissions { namespace } => {
            println!("{}", format_value(&commands::permissions(namespace.as_deref()), format));
        }
        Command::Roles { role } => {
            let role = role.as_deref().map(str::parse::<Role>).transpose()?;
            println!("{}", format_value(&commands::roles(role), format));
        }
        Command::Matrix => match format {
            OutputFormat::Table => println!("{}", commands::matrix_table()),
            OutputFormat::Json => println!("{}", format_value(&commands::matrix_json(), format)),
        },
        Command::Check {
            role,
            can_set_job_complete,
            all,
            policy,
            keys,
        } => {
            let request = CheckRequest {
                role,
                can_set_job_complete,
                require_all: all,
                policy: policy.parse::<UnknownPermissionPolicy>()?,
                keys,
            };
            let report = commands::check(&request);
            match format {
                OutputFormat::Table => println!("{}", report.render(&request)),
                OutputFormat::Json => println!("{}", format_value(&report.to_json(), format)),
            }
            return Ok(if report.granted { ExitCode::SUCCESS } else { ExitCode::FAILURE });
        }
    }

    Ok(ExitCode::SUCCESS)
}
