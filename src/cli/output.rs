use chrono::{DateTime, Utc};
use console::style;
use serde::Serialize;

use crate::config::RobotConfig;
use crate::error::{CmError, ErrorCode, Result, StructuredError};

#[derive(Serialize)]
pub struct RobotResponse<T> {
    pub status: RobotStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub data: T,
}

impl<T> RobotResponse<T> {
    /// Drop the timestamp and version envelope.
    #[must_use]
    pub fn without_metadata(mut self) -> Self {
        self.timestamp = None;
        self.version = None;
        self
    }
}

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RobotStatus {
    Ok,
    /// Rich error with structured information
    #[serde(rename = "error")]
    StructuredError {
        /// Error code enum value (e.g., "NO_ACTIVE_ROLE")
        code: ErrorCode,
        /// Numeric error code (e.g., 104)
        numeric_code: u16,
        message: String,
        /// Actionable suggestion for recovery
        suggestion: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        context: Option<serde_json::Value>,
        recoverable: bool,
        /// Error category (e.g., "workflow", "storage")
        category: String,
    },
}

pub fn robot_ok<T: Serialize>(data: T) -> RobotResponse<T> {
    RobotResponse {
        status: RobotStatus::Ok,
        timestamp: Some(Utc::now()),
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
        data,
    }
}

/// Create a robot error response from a [`CmError`] with structured information.
pub fn robot_error_structured(err: &CmError) -> RobotResponse<serde_json::Value> {
    robot_error_from_structured(err.to_structured())
}

pub fn robot_error_from_structured(err: StructuredError) -> RobotResponse<serde_json::Value> {
    RobotResponse {
        status: err.into(),
        timestamp: Some(Utc::now()),
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
        data: serde_json::Value::Null,
    }
}

impl From<StructuredError> for RobotStatus {
    fn from(err: StructuredError) -> Self {
        Self::StructuredError {
            code: err.code,
            numeric_code: err.numeric_code,
            message: err.message,
            suggestion: err.suggestion,
            context: err.context,
            recoverable: err.recoverable,
            category: err.category,
        }
    }
}

/// Report a failed invocation: a structured response on stdout when `robot`
/// settings are given, otherwise message and suggestion on stderr.
pub fn report_error(err: &CmError, robot: Option<&RobotConfig>) {
    match robot {
        Some(settings) => {
            let mut response = robot_error_structured(err);
            if !settings.include_metadata {
                response = response.without_metadata();
            }
            if emit_robot(&response, settings.compact()).is_err() {
                eprintln!("Error: {err}");
            }
        }
        None => {
            eprintln!("Error: {err}");
            eprintln!("  {}", err.to_structured().suggestion);
        }
    }
}

pub fn emit_robot<T: Serialize>(response: &RobotResponse<T>, compact: bool) -> Result<()> {
    if compact {
        println!("{}", serde_json::to_string(response)?);
        Ok(())
    } else {
        emit_json(response)
    }
}

pub fn emit_json<T: Serialize>(value: &T) -> Result<()> {
    let payload = serde_json::to_string_pretty(value)?;
    println!("{payload}");
    Ok(())
}

pub struct HumanLayout {
    lines: Vec<String>,
    key_width: usize,
}

impl Default for HumanLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl HumanLayout {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            lines: Vec::new(),
            key_width: 18,
        }
    }

    pub fn title(&mut self, text: &str) -> &mut Self {
        self.lines.push(style(text).bold().to_string());
        self.lines.push(String::new());
        self
    }

    pub fn section(&mut self, text: &str) -> &mut Self {
        self.lines.push(style(text).bold().to_string());
        self.lines.push("-".repeat(text.len().max(3)));
        self
    }

    pub fn kv(&mut self, key: &str, value: &str) -> &mut Self {
        let padded = format!("{key:width$}", width = self.key_width);
        self.lines.push(format!("{} {value}", style(padded).dim()));
        self
    }

    pub fn bullet(&mut self, text: &str) -> &mut Self {
        self.lines.push(format!("- {text}"));
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.lines.push(String::new());
        self
    }

    pub fn push_line(&mut self, line: impl Into<String>) -> &mut Self {
        self.lines.push(line.into());
        self
    }

    #[must_use]
    pub fn build(self) -> String {
        self.lines.join("\n")
    }
}

pub fn emit_human(layout: HumanLayout) {
    println!("{}", layout.build());
}

/// `"2025-06-02T09:00:00Z"` becomes `"2025-06-02 09:00 UTC"`.
#[must_use]
pub fn format_time(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M UTC").to_string()
}
