//! competency promote - Promotion requests and reviews

use clap::{Args, Subcommand};
use colored::Colorize;
use serde_json::json;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, format_time};
use crate::core::eligibility::TestSkillOutcome;
use crate::core::promotion::{PromotionEligibility, ReviewDecision};
use crate::error::Result;

#[derive(Args, Debug)]
pub struct PromoteArgs {
    #[command(subcommand)]
    pub command: PromoteCommand,
}

#[derive(Subcommand, Debug)]
pub enum PromoteCommand {
    /// Test-based eligibility and the latest request
    Status { employee: String },

    /// File a promotion request
    Request { employee: String, role: String },

    /// List pending requests, oldest first
    Pending,

    /// Per-skill breakdown for a request
    Review { request: String },

    /// Approve a pending request and move the employee to the new role
    Approve { request: String },

    /// Reject a pending request
    Reject { request: String },
}

pub fn run(ctx: &AppContext, args: &PromoteArgs) -> Result<()> {
    match &args.command {
        PromoteCommand::Status { employee } => status(ctx, employee),
        PromoteCommand::Request { employee, role } => {
            ctx.db.require_employee(employee)?;
            let request = ctx.service().request_promotion(employee, role, ctx.now())?;
            if ctx.robot_mode {
                return ctx.emit_ok(json!({ "request": request }));
            }
            println!("{} Promotion request {} filed", "✓".green(), request.id.bold());
            Ok(())
        }
        PromoteCommand::Pending => pending(ctx),
        PromoteCommand::Review { request } => review(ctx, request),
        PromoteCommand::Approve { request } => decide(ctx, request, ReviewDecision::Approve),
        PromoteCommand::Reject { request } => decide(ctx, request, ReviewDecision::Reject),
    }
}

fn status(ctx: &AppContext, employee_id: &str) -> Result<()> {
    ctx.db.require_employee(employee_id)?;
    let overview = ctx.service().promotion_status(employee_id)?;
    if ctx.robot_mode {
        return ctx.emit_ok(json!({ "promotion": overview }));
    }

    let mut layout = HumanLayout::new();
    layout
        .title("Promotion")
        .kv("Current role", &overview.current_role.title);
    push_eligibility(&mut layout, &overview.eligibility);
    layout.blank();
    match &overview.latest_request {
        Some(request) => layout.kv(
            "Latest request",
            &format!(
                "{} ({}, {})",
                request.id,
                request.status.as_str(),
                format_time(&request.requested_at)
            ),
        ),
        None => layout.kv("Latest request", "none"),
    };
    emit_human(layout);
    Ok(())
}

fn pending(ctx: &AppContext) -> Result<()> {
    let requests = ctx.db.list_pending_promotions()?;
    if ctx.robot_mode {
        return ctx.emit_ok(json!({ "count": requests.len(), "requests": requests }));
    }
    if requests.is_empty() {
        println!("{}", "No pending promotion requests".dimmed());
        return Ok(());
    }
    for request in &requests {
        println!(
            "{}  {} -> {}  employee {}  {}",
            request.id.bold(),
            request.current_role_id,
            request.requested_role_id,
            request.employee_id,
            format_time(&request.requested_at).dimmed()
        );
    }
    Ok(())
}

fn review(ctx: &AppContext, request_id: &str) -> Result<()> {
    let details = ctx.service().review_details(request_id)?;
    if ctx.robot_mode {
        return ctx.emit_ok(json!({ "review": details }));
    }

    let mut layout = HumanLayout::new();
    layout
        .title("Promotion review")
        .kv("Request", &details.request.id)
        .kv("Employee", &details.request.employee_id)
        .kv("Status", details.request.status.as_str())
        .kv("From", &details.current_role.title)
        .kv("To", &details.requested_role.title);
    push_eligibility(&mut layout, &details.eligibility);
    emit_human(layout);
    Ok(())
}

fn decide(ctx: &AppContext, request_id: &str, decision: ReviewDecision) -> Result<()> {
    let plan = ctx.service().review_promotion(request_id, decision, ctx.now())?;
    if ctx.robot_mode {
        return ctx.emit_ok(json!({ "review": plan }));
    }
    match &plan.assignment {
        Some(assignment) => println!(
            "{} Approved {}; {} now holds role {}",
            "✓".green(),
            request_id,
            assignment.employee_id,
            assignment.role_id.bold()
        ),
        None => println!("{} Rejected {request_id}", "✓".green()),
    }
    Ok(())
}

fn push_eligibility(layout: &mut HumanLayout, eligibility: &PromotionEligibility) {
    let eval = &eligibility.evaluation;
    let basis = if eligibility.target.is_fallback() {
        " (current role)"
    } else {
        ""
    };
    layout
        .kv(
            "Evaluated for",
            &format!("{}{basis}", eligibility.target.role().title),
        )
        .kv(
            "Eligible",
            &format!(
                "{} ({} of {} testable skills passed)",
                if eval.eligible { "yes" } else { "no" },
                eval.passed_count,
                eval.total_count
            ),
        );
    layout.blank().section("Skill tests");
    if eval.skills.is_empty() {
        layout.push_line("no testable skills");
    }
    for skill in &eval.skills {
        layout.bullet(&skill_line(skill));
    }
}

fn skill_line(skill: &TestSkillOutcome) -> String {
    let best = skill
        .best_score
        .map_or_else(|| "no attempts".to_string(), |score| format!("best {score}%"));
    let verdict = if skill.passed { "passed" } else { "not passed" };
    format!(
        "{} (level {}): {best}, {verdict}",
        skill.skill_name, skill.required_level
    )
}
