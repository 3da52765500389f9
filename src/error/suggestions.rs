//! Context-aware error suggestions.
//!
//! Complements the static suggestions in the `codes` module when the error
//! carries identifiers worth echoing back.

use serde_json::Value;

use super::codes::ErrorCode;

/// Generate a context-aware suggestion for an error.
pub fn suggest_for_error(code: ErrorCode, context: Option<&Value>) -> String {
    match code {
        ErrorCode::EmployeeNotFound => suggest_employee_not_found(context),
        ErrorCode::NoActiveRole => suggest_no_active_role(context),
        ErrorCode::IncompleteSubmission => suggest_incomplete_submission(context),
        ErrorCode::WorkflowLocked => suggest_workflow_locked(context),
        ErrorCode::ConfigMissingRequired => suggest_config_missing_required(context),
        _ => code.suggestion().to_string(),
    }
}

fn context_str<'a>(context: Option<&'a Value>, key: &str) -> Option<&'a str> {
    context.and_then(|c| c.get(key)).and_then(Value::as_str)
}

fn suggest_employee_not_found(context: Option<&Value>) -> String {
    match context_str(context, "employee_id") {
        Some(id) => format!(
            "Employee '{id}' not found. Run `competency employee list` to see known ids"
        ),
        None => ErrorCode::EmployeeNotFound.suggestion().to_string(),
    }
}

fn suggest_no_active_role(context: Option<&Value>) -> String {
    match context_str(context, "employee_id") {
        Some(id) => format!(
            "Employee '{id}' has no active role. Assign one with `competency employee assign {id} <role>`"
        ),
        None => ErrorCode::NoActiveRole.suggestion().to_string(),
    }
}

fn suggest_incomplete_submission(context: Option<&Value>) -> String {
    let answered = context.and_then(|c| c.get("answered")).and_then(Value::as_u64);
    let expected = context.and_then(|c| c.get("expected")).and_then(Value::as_u64);
    match (answered, expected) {
        (Some(answered), Some(expected)) if expected > answered => format!(
            "{} question(s) left unanswered. Answer all {expected} before submitting",
            expected - answered
        ),
        _ => ErrorCode::IncompleteSubmission.suggestion().to_string(),
    }
}

fn suggest_workflow_locked(context: Option<&Value>) -> String {
    let reason = context_str(context, "reason").unwrap_or_default();
    if reason.contains("learning path") {
        "Complete every item of the active learning path with `competency learn complete <employee>`"
            .to_string()
    } else if reason.contains("self-assessment") {
        "Pass the self-assessment for the target role first with `competency assess submit`"
            .to_string()
    } else {
        ErrorCode::WorkflowLocked.suggestion().to_string()
    }
}

fn suggest_config_missing_required(context: Option<&Value>) -> String {
    match context_str(context, "config_key") {
        Some(key) => format!("Set `{key}` in config.toml or through its COMPETENCY_* variable"),
        None => ErrorCode::ConfigMissingRequired.suggestion().to_string(),
    }
}
