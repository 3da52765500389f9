//! competency question - Manage skill test questions

use clap::{Args, Subcommand};
use colored::Colorize;
use serde_json::json;

use crate::app::AppContext;
use crate::error::{CmError, Result};
use crate::storage::NewOption;

#[derive(Args, Debug)]
pub struct QuestionArgs {
    #[command(subcommand)]
    pub command: QuestionCommand,
}

#[derive(Subcommand, Debug)]
pub enum QuestionCommand {
    /// Add a multiple-choice question to a skill
    Add {
        skill: String,

        #[arg(long)]
        text: String,

        /// Option text; repeat for each option
        #[arg(long = "option", required = true)]
        options: Vec<String>,

        /// 1-based position of the correct option
        #[arg(long)]
        correct: usize,

        /// easy, medium or hard
        #[arg(long, default_value = "medium")]
        difficulty: String,
    },
}

pub fn run(ctx: &AppContext, args: &QuestionArgs) -> Result<()> {
    match &args.command {
        QuestionCommand::Add {
            skill,
            text,
            options,
            correct,
            difficulty,
        } => {
            if *correct == 0 || *correct > options.len() {
                return Err(CmError::InvalidInput(format!(
                    "--correct must be between 1 and {}",
                    options.len()
                )));
            }
            let options: Vec<NewOption> = options
                .iter()
                .enumerate()
                .map(|(idx, text)| NewOption {
                    text: text.clone(),
                    is_correct: idx + 1 == *correct,
                })
                .collect();

            let question = ctx.db.add_question(skill, text, difficulty, &options, ctx.now())?;
            if ctx.robot_mode {
                return ctx.emit_ok(json!({ "question": question }));
            }
            println!(
                "{} Added question {} to {} ({} options)",
                "✓".green(),
                question.id,
                skill.bold(),
                question.options.len()
            );
            Ok(())
        }
    }
}
