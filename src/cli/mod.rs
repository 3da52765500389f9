//! CLI module - Command-line interface definitions and handlers
//!
//! Uses clap v4 with derive macros for argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod commands;
pub mod output;

/// Competency - skill assessments, tests, learning paths and promotions
#[derive(Parser, Debug)]
#[command(name = "competency")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Emit machine-readable JSON on stdout
    #[arg(long, global = true)]
    pub robot: bool,

    /// Shorthand for --robot
    #[arg(long, short = 'm', global = true)]
    pub machine: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file path (default: ~/.config/competency/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Database path, overriding the configured one
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Whether robot output was requested on the command line.
    #[must_use]
    pub const fn robot_mode(&self) -> bool {
        self.robot || self.machine
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the database and apply migrations
    Init(commands::init::InitArgs),

    /// Manage employees
    Employee(commands::employee::EmployeeArgs),

    /// Manage job roles and their skill requirements
    Role(commands::role::RoleArgs),

    /// Manage the skill catalog
    Skill(commands::skill::SkillArgs),

    /// Manage skill test questions
    Question(commands::question::QuestionArgs),

    /// Self-assessment against the next role
    Assess(commands::assess::AssessArgs),

    /// Learning path progress
    Learn(commands::learn::LearnArgs),

    /// Skill tests
    Test(commands::test::TestArgs),

    /// Promotion requests and reviews
    Promote(commands::promote::PromoteArgs),

    /// Dashboard counts
    Stats(commands::stats::StatsArgs),
}
