//! Error handling for competency.
//!
//! This module provides:
//! - [`CmError`]: The main error enum for all competency operations
//! - [`ErrorCode`]: Standardized error codes for machine parsing
//! - [`StructuredError`]: Rich error type with suggestions and context

mod codes;
mod suggestions;

use std::io;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub use codes::ErrorCode;
pub use suggestions::suggest_for_error;

/// Main error type for competency operations.
#[derive(Error, Debug)]
pub enum CmError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Employee not found: {0}")]
    EmployeeNotFound(String),

    #[error("Role not found: {0}")]
    RoleNotFound(String),

    #[error("Skill not found: {0}")]
    SkillNotFound(String),

    #[error("Employee {0} has no active role")]
    NoActiveRole(String),

    #[error("Incomplete submission: {answered} of {expected} answered")]
    IncompleteSubmission { answered: usize, expected: usize },

    #[error("Attempt not allowed: {state}")]
    AttemptNotAllowed { state: String },

    #[error("Locked: {0}")]
    Locked(String),

    #[error(
        "Inconsistent learning state: retired {retired} of {expected_retired}, inserted {inserted} of {expected_inserted}"
    )]
    InconsistentLearningState {
        expected_retired: usize,
        retired: usize,
        expected_inserted: usize,
        inserted: usize,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Persist failed: {0}")]
    Persist(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Missing required config: {0}")]
    MissingConfig(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl CmError {
    /// Get the error code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Database(_) => ErrorCode::DatabaseError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::SerializationError,
            Self::EmployeeNotFound(_) => ErrorCode::EmployeeNotFound,
            Self::RoleNotFound(_) => ErrorCode::RoleNotFound,
            Self::SkillNotFound(_) => ErrorCode::SkillNotFound,
            Self::NoActiveRole(_) => ErrorCode::NoActiveRole,
            Self::IncompleteSubmission { .. } => ErrorCode::IncompleteSubmission,
            Self::AttemptNotAllowed { .. } => ErrorCode::AttemptNotAllowed,
            Self::Locked(_) => ErrorCode::WorkflowLocked,
            Self::InconsistentLearningState { .. } => ErrorCode::InconsistentLearningState,
            Self::InvalidInput(_) => ErrorCode::InvalidInput,
            Self::ValidationFailed(_) => ErrorCode::ValidationFailed,
            Self::Persist(_) => ErrorCode::PersistFailed,
            Self::TransactionFailed(_) => ErrorCode::TransactionFailed,
            Self::Config(_) => ErrorCode::ConfigInvalid,
            Self::MissingConfig(_) => ErrorCode::ConfigMissingRequired,
            Self::NotFound(_) => ErrorCode::NotFound,
        }
    }

    /// Get context information for this error as JSON.
    #[must_use]
    pub fn context(&self) -> Option<Value> {
        match self {
            Self::EmployeeNotFound(id) | Self::NoActiveRole(id) => {
                Some(serde_json::json!({ "employee_id": id }))
            }
            Self::RoleNotFound(id) => Some(serde_json::json!({ "role_id": id })),
            Self::SkillNotFound(id) => Some(serde_json::json!({ "skill_id": id })),
            Self::IncompleteSubmission { answered, expected } => {
                Some(serde_json::json!({ "answered": answered, "expected": expected }))
            }
            Self::AttemptNotAllowed { state } => Some(serde_json::json!({ "state": state })),
            Self::Locked(reason) => Some(serde_json::json!({ "reason": reason })),
            Self::InconsistentLearningState {
                expected_retired,
                retired,
                expected_inserted,
                inserted,
            } => Some(serde_json::json!({
                "expected_retired": expected_retired,
                "retired": retired,
                "expected_inserted": expected_inserted,
                "inserted": inserted,
            })),
            Self::MissingConfig(key) => Some(serde_json::json!({ "config_key": key })),
            _ => None,
        }
    }

    /// Convert this error to a structured error.
    #[must_use]
    pub fn to_structured(&self) -> StructuredError {
        StructuredError::from_cm_error(self)
    }
}

/// A structured error with machine-readable code, suggestion, and context.
///
/// Emitted in robot mode so scripts can branch on `code` instead of parsing
/// the message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// The error code (e.g., "NO_ACTIVE_ROLE")
    pub code: ErrorCode,

    /// The numeric error code (e.g., 104)
    pub numeric_code: u16,

    /// Human-readable error message
    pub message: String,

    /// Actionable suggestion for recovery
    pub suggestion: String,

    /// Additional context for debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,

    /// Whether this error is potentially recoverable by the user
    pub recoverable: bool,

    /// Error category (e.g., "directory", "workflow", "storage")
    pub category: String,
}

impl StructuredError {
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            numeric_code: code.numeric(),
            suggestion: code.suggestion().to_string(),
            context: None,
            recoverable: code.is_recoverable(),
            category: code.category().to_string(),
            code,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn from_cm_error(err: &CmError) -> Self {
        let code = err.code();
        let context = err.context();
        let suggestion = suggest_for_error(code, context.as_ref());

        Self {
            code,
            numeric_code: code.numeric(),
            message: err.to_string(),
            suggestion,
            context,
            recoverable: code.is_recoverable(),
            category: code.category().to_string(),
        }
    }

    /// Add context and regenerate the suggestion from it.
    #[must_use]
    pub fn with_context(mut self, context: Value) -> Self {
        self.context = Some(context);
        self.suggestion = suggest_for_error(self.code, self.context.as_ref());
        self
    }
}

impl std::fmt::Display for StructuredError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl From<CmError> for StructuredError {
    fn from(err: CmError) -> Self {
        Self::from_cm_error(&err)
    }
}

impl From<&CmError> for StructuredError {
    fn from(err: &CmError) -> Self {
        Self::from_cm_error(err)
    }
}

/// Result type alias using CmError.
pub type Result<T> = std::result::Result<T, CmError>;
