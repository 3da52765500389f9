//! competency assess - Self-assessment against the next role

use clap::{Args, Subcommand};
use colored::Colorize;
use serde_json::json;

use crate::app::AppContext;
use crate::cli::commands::parse_pair;
use crate::cli::output::{HumanLayout, emit_human};
use crate::core::eligibility::{AssessmentStatus, SkillGap};
use crate::core::gates::Gate;
use crate::core::learning::PathStatus;
use crate::error::{CmError, Result};
use crate::service::SkillRating;

#[derive(Args, Debug)]
pub struct AssessArgs {
    #[command(subcommand)]
    pub command: AssessCommand,
}

#[derive(Subcommand, Debug)]
pub enum AssessCommand {
    /// Requirements of the next role with current ratings
    Status { employee: String },

    /// Submit self-ratings, one per required skill
    Submit {
        employee: String,

        /// SKILL_ID=RATING (1-5); repeat for every required skill
        #[arg(long = "rating", required = true)]
        ratings: Vec<String>,
    },

    /// Strengths and development areas from the latest ratings
    Results { employee: String },
}

pub fn run(ctx: &AppContext, args: &AssessArgs) -> Result<()> {
    match &args.command {
        AssessCommand::Status { employee } => status(ctx, employee),
        AssessCommand::Submit { employee, ratings } => submit(ctx, employee, ratings),
        AssessCommand::Results { employee } => results(ctx, employee),
    }
}

fn status(ctx: &AppContext, employee_id: &str) -> Result<()> {
    ctx.db.require_employee(employee_id)?;
    let overview = ctx.service().assessment_overview(employee_id)?;
    if ctx.robot_mode {
        return ctx.emit_ok(json!({ "assessment": overview }));
    }

    let mut layout = HumanLayout::new();
    layout
        .title("Self-assessment")
        .kv("Current role", &overview.current_role.title);
    let Some(target) = &overview.target else {
        layout.kv("Target role", "none (top of track)");
        emit_human(layout);
        return Ok(());
    };
    layout
        .kv("Target role", &target.title)
        .kv(
            "Status",
            overview
                .evaluation
                .as_ref()
                .map_or("none", |e| status_label(e.status)),
        )
        .kv("Learning path", path_label(overview.learning))
        .kv("Submission", &gate_label(overview.gate));

    layout.blank().section("Requirements");
    for rated in &overview.requirements {
        let req = &rated.requirement;
        layout.bullet(&format!(
            "{} ({}): required {}, current {}",
            req.skill_name, req.skill_id, req.required_level, rated.current_rating
        ));
    }
    emit_human(layout);
    Ok(())
}

fn submit(ctx: &AppContext, employee_id: &str, raw: &[String]) -> Result<()> {
    ctx.db.require_employee(employee_id)?;
    let ratings = raw
        .iter()
        .map(|pair| parse_rating(pair))
        .collect::<Result<Vec<_>>>()?;

    let outcome = ctx
        .service()
        .submit_self_assessment(employee_id, &ratings, ctx.now())?;
    if ctx.robot_mode {
        return ctx.emit_ok(json!({ "submission": outcome }));
    }

    let passed = outcome.evaluation.status == AssessmentStatus::Passed;
    if passed {
        println!(
            "{} Self-assessment passed for {}. Skill tests are now open.",
            "✓".green(),
            outcome.target.title.bold()
        );
    } else {
        println!(
            "{} Self-assessment not passed for {}.",
            "✗".red(),
            outcome.target.title.bold()
        );
        println!();
        println!("Learning path:");
        for item in &outcome.learning_items {
            println!("  - {} ({})  {}", item.title, item.id, item.resource_url.dimmed());
        }
    }
    Ok(())
}

fn results(ctx: &AppContext, employee_id: &str) -> Result<()> {
    ctx.db.require_employee(employee_id)?;
    let results = ctx.service().assessment_results(employee_id)?;
    if ctx.robot_mode {
        return ctx.emit_ok(json!({ "results": results }));
    }

    let mut layout = HumanLayout::new();
    layout.title("Assessment results").kv(
        "Target role",
        results.target.as_ref().map_or("none", |r| r.title.as_str()),
    );
    layout.kv("Status", status_label(results.status));
    layout.blank().section("Strengths");
    push_gaps(&mut layout, &results.strengths);
    layout.blank().section("Development areas");
    push_gaps(&mut layout, &results.development_areas);
    emit_human(layout);
    Ok(())
}

fn push_gaps(layout: &mut HumanLayout, gaps: &[SkillGap]) {
    if gaps.is_empty() {
        layout.push_line("none");
    }
    for gap in gaps {
        layout.bullet(&format!(
            "{} [{}]: rated {}, required {}",
            gap.skill_name, gap.category, gap.actual, gap.required
        ));
    }
}

fn parse_rating(raw: &str) -> Result<SkillRating> {
    let (skill_id, value) = parse_pair(raw)?;
    let rating = value
        .parse::<u8>()
        .map_err(|_| CmError::InvalidInput(format!("rating for '{skill_id}' must be 1-5, got '{value}'")))?;
    Ok(SkillRating { skill_id, rating })
}

const fn status_label(status: AssessmentStatus) -> &'static str {
    match status {
        AssessmentStatus::None => "not submitted",
        AssessmentStatus::Passed => "passed",
        AssessmentStatus::Failed => "failed",
    }
}

const fn path_label(status: PathStatus) -> &'static str {
    match status {
        PathStatus::None => "none",
        PathStatus::Active => "active",
        PathStatus::Completed => "completed",
    }
}

fn gate_label(gate: Gate) -> String {
    match gate {
        Gate::Open => "open".to_string(),
        Gate::Locked(reason) => format!("locked ({reason})"),
    }
}
