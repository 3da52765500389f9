//! competency employee - Manage employees

use clap::{Args, Subcommand};
use colored::Colorize;
use serde_json::json;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human};
use crate::error::Result;

#[derive(Args, Debug)]
pub struct EmployeeArgs {
    #[command(subcommand)]
    pub command: EmployeeCommand,
}

#[derive(Subcommand, Debug)]
pub enum EmployeeCommand {
    /// Register an employee
    Add {
        /// Full name
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        /// Explicit id (default: generated UUID)
        #[arg(long)]
        id: Option<String>,
    },

    /// List employees with their active role
    List,

    /// Make a role the employee's only active role
    Assign {
        employee: String,
        role: String,
    },
}

pub fn run(ctx: &AppContext, args: &EmployeeArgs) -> Result<()> {
    match &args.command {
        EmployeeCommand::Add { name, email, id } => {
            let employee = ctx.db.add_employee(id.as_deref(), name, email, ctx.now())?;
            if ctx.robot_mode {
                return ctx.emit_ok(json!({ "employee": employee }));
            }
            println!("{} Added {} ({})", "✓".green(), employee.full_name.bold(), employee.id);
            Ok(())
        }
        EmployeeCommand::List => list(ctx),
        EmployeeCommand::Assign { employee, role } => {
            let assignment = ctx.db.assign_role(employee, role, ctx.now())?;
            if ctx.robot_mode {
                return ctx.emit_ok(json!({ "assignment": assignment }));
            }
            let role = ctx.db.require_role(role)?;
            println!("{} {} is now {}", "✓".green(), employee, role.title.bold());
            Ok(())
        }
    }
}

fn list(ctx: &AppContext) -> Result<()> {
    let employees = ctx.db.list_employees()?;
    if ctx.robot_mode {
        return ctx.emit_ok(json!({ "count": employees.len(), "employees": employees }));
    }

    if employees.is_empty() {
        println!("{}", "No employees found".dimmed());
        println!();
        println!("Add one with: competency employee add --name NAME --email EMAIL");
        return Ok(());
    }

    let mut layout = HumanLayout::new();
    layout.title("Employees");
    for summary in &employees {
        let role = summary
            .role
            .as_ref()
            .map_or_else(|| "no active role".to_string(), |r| r.title.clone());
        layout.kv(&summary.employee.id, &format!(
            "{} <{}>  {}",
            summary.employee.full_name, summary.employee.email, role
        ));
    }
    emit_human(layout);
    Ok(())
}
