//! competency - skill assessments, tests, learning paths and promotions

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use competency::app::AppContext;
use competency::cli::Cli;
use competency::cli::output::report_error;
use competency::config::RobotConfig;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    let config = match AppContext::load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            // No config to consult: only the flag decides the format
            let fallback = RobotConfig::default();
            report_error(&e, cli.robot_mode().then_some(&fallback));
            return ExitCode::FAILURE;
        }
    };
    let robot = AppContext::robot_settings(&cli, &config).cloned();

    let result = AppContext::open(&cli, config)
        .and_then(|ctx| competency::cli::commands::run(&ctx, &cli.command));
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e, robot.as_ref());
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(cli: &Cli) {
    if cli.quiet {
        return;
    }

    let filter = match cli.verbose {
        0 => "warn,competency=info",
        1 => "info,competency=debug",
        2 => "debug,competency=trace",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if cli.robot_mode() {
        // JSON logging for robot mode
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
