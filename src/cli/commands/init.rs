//! competency init - Create the database and apply migrations

use clap::Args;
use colored::Colorize;
use serde_json::json;

use crate::app::AppContext;
use crate::error::{CmError, Result};

#[derive(Args, Debug)]
pub struct InitArgs {}

pub fn run(ctx: &AppContext, _args: &InitArgs) -> Result<()> {
    // Opening the context already created the file and ran migrations.
    if !ctx.db.integrity_check()? {
        return Err(CmError::TransactionFailed(format!(
            "integrity check failed for {}",
            ctx.db_path.display()
        )));
    }

    if ctx.robot_mode {
        return ctx.emit_ok(json!({
            "database": ctx.db_path.display().to_string(),
            "schema_version": ctx.db.schema_version(),
        }));
    }

    println!("{} Database ready", "✓".green());
    println!("  path:           {}", ctx.db_path.display());
    println!("  schema version: {}", ctx.db.schema_version());
    println!();
    println!("Next: competency role add --title \"Junior Backend Engineer\" --level junior");
    Ok(())
}
