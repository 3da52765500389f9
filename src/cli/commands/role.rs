//! competency role - Manage job roles and their skill requirements

use clap::{Args, Subcommand};
use colored::Colorize;
use serde_json::json;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human};
use crate::core::model::RoleLevel;
use crate::core::progression::{resolve_next_role, role_family};
use crate::error::Result;
use crate::storage::CompetencyRepository;

#[derive(Args, Debug)]
pub struct RoleArgs {
    #[command(subcommand)]
    pub command: RoleCommand,
}

#[derive(Subcommand, Debug)]
pub enum RoleCommand {
    /// Create a role
    Add {
        /// Title, e.g. "Junior Backend Engineer"
        #[arg(long)]
        title: String,

        /// junior, mid, senior, lead or manager
        #[arg(long)]
        level: String,

        #[arg(long, default_value = "")]
        description: String,

        /// Explicit id (default: generated UUID)
        #[arg(long)]
        id: Option<String>,
    },

    /// List roles
    List,

    /// Show a role, its requirements and the role it leads to
    Show { role: String },

    /// Require a skill for a role at a level (1-5)
    Require {
        role: String,
        skill: String,

        #[arg(long)]
        level: u8,
    },

    /// Remove a skill requirement from a role
    Unrequire { role: String, skill: String },
}

pub fn run(ctx: &AppContext, args: &RoleArgs) -> Result<()> {
    match &args.command {
        RoleCommand::Add {
            title,
            level,
            description,
            id,
        } => {
            let level: RoleLevel = level.parse()?;
            let role = ctx.db.add_role(id.as_deref(), title, level, description)?;
            if ctx.robot_mode {
                return ctx.emit_ok(json!({ "role": role }));
            }
            println!("{} Added {} [{}] ({})", "✓".green(), role.title.bold(), role.level, role.id);
            Ok(())
        }
        RoleCommand::List => list(ctx),
        RoleCommand::Show { role } => show(ctx, role),
        RoleCommand::Require { role, skill, level } => {
            ctx.db.set_requirement(role, skill, *level)?;
            if ctx.robot_mode {
                return ctx.emit_ok(json!({ "role_id": role, "skill_id": skill, "required_level": level }));
            }
            println!("{} {} requires {} at level {}", "✓".green(), role, skill.bold(), level);
            Ok(())
        }
        RoleCommand::Unrequire { role, skill } => {
            let removed = ctx.db.remove_requirement(role, skill)?;
            if ctx.robot_mode {
                return ctx.emit_ok(json!({ "role_id": role, "skill_id": skill, "removed": removed }));
            }
            if removed {
                println!("{} {} no longer requires {}", "✓".green(), role, skill.bold());
            } else {
                println!("{} {} did not require {}", "!".yellow(), role, skill);
            }
            Ok(())
        }
    }
}

fn list(ctx: &AppContext) -> Result<()> {
    let roles = ctx.db.fetch_roles()?;
    if ctx.robot_mode {
        return ctx.emit_ok(json!({ "count": roles.len(), "roles": roles }));
    }
    if roles.is_empty() {
        println!("{}", "No roles found".dimmed());
        return Ok(());
    }

    println!("{:38} {:10} {}", "ID".bold(), "LEVEL".bold(), "TITLE".bold());
    println!("{}", "─".repeat(72).dimmed());
    for role in &roles {
        println!("{:38} {:10} {}", role.id, role.level.as_str(), role.title);
    }
    Ok(())
}

fn show(ctx: &AppContext, role_id: &str) -> Result<()> {
    let role = ctx.db.require_role(role_id)?;
    let requirements = ctx.db.fetch_role_requirements(&role.id)?;
    let next = resolve_next_role(&role, &ctx.db.fetch_roles()?);

    if ctx.robot_mode {
        return ctx.emit_ok(json!({
            "role": role,
            "family": role_family(&role.title),
            "next_role": next,
            "requirements": requirements,
        }));
    }

    let mut layout = HumanLayout::new();
    layout
        .title(&role.title)
        .kv("Id", &role.id)
        .kv("Level", role.level.as_str())
        .kv("Family", role_family(&role.title).trim())
        .kv(
            "Next role",
            &next.map_or_else(|| "none".to_string(), |r| format!("{} ({})", r.title, r.id)),
        );
    if !role.description.is_empty() {
        layout.kv("Description", &role.description);
    }
    layout.blank().section("Requirements");
    if requirements.is_empty() {
        layout.push_line("none");
    }
    for req in &requirements {
        let testable = if req.testable { "testable" } else { "no questions" };
        layout.bullet(&format!(
            "{} [{}] level {} ({testable})",
            req.skill_name, req.category, req.required_level
        ));
    }
    emit_human(layout);
    Ok(())
}
