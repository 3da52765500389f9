//! competency learn - Learning path progress

use clap::{Args, Subcommand};
use colored::Colorize;
use serde_json::json;

use crate::app::AppContext;
use crate::error::Result;
use crate::service::LearningPathView;

#[derive(Args, Debug)]
pub struct LearnArgs {
    #[command(subcommand)]
    pub command: LearnCommand,
}

#[derive(Subcommand, Debug)]
pub enum LearnCommand {
    /// Show the active learning path
    Show { employee: String },

    /// Check off a learning item
    Done { employee: String, item: String },

    /// Uncheck a learning item
    Undo { employee: String, item: String },

    /// Finish the path once every item is checked off
    Complete { employee: String },
}

pub fn run(ctx: &AppContext, args: &LearnArgs) -> Result<()> {
    match &args.command {
        LearnCommand::Show { employee } => {
            ctx.db.require_employee(employee)?;
            let view = ctx.service().learning_path(employee)?;
            render(ctx, &view)
        }
        LearnCommand::Done { employee, item } => toggle(ctx, employee, item, true),
        LearnCommand::Undo { employee, item } => toggle(ctx, employee, item, false),
        LearnCommand::Complete { employee } => {
            ctx.db.require_employee(employee)?;
            let outcome = ctx.service().complete_learning_path(employee, ctx.now())?;
            if ctx.robot_mode {
                return ctx.emit_ok(json!({ "completion": outcome }));
            }
            println!(
                "{} Learning path completed ({} items). The self-assessment is open again.",
                "✓".green(),
                outcome.items_completed
            );
            Ok(())
        }
    }
}

fn toggle(ctx: &AppContext, employee_id: &str, item_id: &str, completed: bool) -> Result<()> {
    ctx.db.require_employee(employee_id)?;
    let view = ctx
        .service()
        .set_learning_item_completed(employee_id, item_id, completed)?;
    render(ctx, &view)
}

fn render(ctx: &AppContext, view: &LearningPathView) -> Result<()> {
    if ctx.robot_mode {
        return ctx.emit_ok(json!({ "learning_path": view }));
    }
    if view.items.is_empty() {
        println!("{}", "No active learning path".dimmed());
        return Ok(());
    }

    for item in &view.items {
        let mark = if item.completed { "[x]".green() } else { "[ ]".normal() };
        println!("{mark} {} ({})", item.title, item.id.dimmed());
        println!("    {}", item.resource_url);
    }
    if view.all_completed {
        println!();
        println!("All items done. Finish with: competency learn complete <employee>");
    }
    Ok(())
}
