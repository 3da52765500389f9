//! competency stats - Dashboard counts

use clap::Args;
use serde_json::json;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human};
use crate::error::Result;

#[derive(Args, Debug)]
pub struct StatsArgs {}

pub fn run(ctx: &AppContext, _args: &StatsArgs) -> Result<()> {
    let stats = ctx.db.stats()?;
    if ctx.robot_mode {
        return ctx.emit_ok(json!({ "stats": stats }));
    }

    let mut layout = HumanLayout::new();
    layout
        .title("Dashboard")
        .kv("Employees", &stats.employees.to_string())
        .kv("Roles", &stats.roles.to_string())
        .kv("Pending promotions", &stats.pending_promotions.to_string())
        .kv("Passed tests", &stats.passed_tests.to_string());
    emit_human(layout);
    Ok(())
}
