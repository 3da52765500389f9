//! CLI command implementations
//!
//! Each subcommand has its own module with:
//! - Args struct for command-line arguments
//! - `run()` function to execute the command

use crate::app::AppContext;
use crate::cli::Commands;
use crate::error::{CmError, Result};

pub mod assess;
pub mod employee;
pub mod init;
pub mod learn;
pub mod promote;
pub mod question;
pub mod role;
pub mod skill;
pub mod stats;

/// Dispatch a command to its handler
pub fn run(ctx: &AppContext, command: &Commands) -> Result<()> {
    match command {
        Commands::Init(args) => init::run(ctx, args),
        Commands::Employee(args) => employee::run(ctx, args),
        Commands::Role(args) => role::run(ctx, args),
        Commands::Skill(args) => skill::run(ctx, args),
        Commands::Question(args) => question::run(ctx, args),
        Commands::Assess(args) => assess::run(ctx, args),
        Commands::Learn(args) => learn::run(ctx, args),
        Commands::Test(args) => test::run(ctx, args),
        Commands::Promote(args) => promote::run(ctx, args),
        Commands::Stats(args) => stats::run(ctx, args),
    }
}

/// Split a `key=value` argument.
pub(crate) fn parse_pair(raw: &str) -> Result<(String, String)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| CmError::InvalidInput(format!("expected KEY=VALUE, got '{raw}'")))?;
    let (key, value) = (key.trim(), value.trim());
    if key.is_empty() || value.is_empty() {
        return Err(CmError::InvalidInput(format!("expected KEY=VALUE, got '{raw}'")));
    }
    Ok((key.to_string(), value.to_string()))
}
