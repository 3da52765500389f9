//! competency skill - Manage the skill catalog

use clap::{Args, Subcommand};
use colored::Colorize;
use serde_json::json;

use crate::app::AppContext;
use crate::core::model::SkillCategory;
use crate::error::Result;

#[derive(Args, Debug)]
pub struct SkillArgs {
    #[command(subcommand)]
    pub command: SkillCommand,
}

#[derive(Subcommand, Debug)]
pub enum SkillCommand {
    /// Add a skill
    Add {
        #[arg(long)]
        name: String,

        /// technical or soft
        #[arg(long, default_value = "technical")]
        category: String,

        /// Explicit id (default: generated UUID)
        #[arg(long)]
        id: Option<String>,
    },

    /// List skills
    List,
}

pub fn run(ctx: &AppContext, args: &SkillArgs) -> Result<()> {
    match &args.command {
        SkillCommand::Add { name, category, id } => {
            let category: SkillCategory = category.parse()?;
            let skill = ctx.db.add_skill(id.as_deref(), name, category)?;
            if ctx.robot_mode {
                return ctx.emit_ok(json!({ "skill": skill }));
            }
            println!("{} Added {} [{}] ({})", "✓".green(), skill.name.bold(), skill.category, skill.id);
            Ok(())
        }
        SkillCommand::List => {
            let skills = ctx.db.list_skills()?;
            if ctx.robot_mode {
                return ctx.emit_ok(json!({ "count": skills.len(), "skills": skills }));
            }
            if skills.is_empty() {
                println!("{}", "No skills found".dimmed());
                return Ok(());
            }
            println!("{:38} {:10} {}", "ID".bold(), "CATEGORY".bold(), "NAME".bold());
            println!("{}", "─".repeat(72).dimmed());
            for skill in &skills {
                println!("{:38} {:10} {}", skill.id, skill.category.as_str(), skill.name);
            }
            Ok(())
        }
    }
}
