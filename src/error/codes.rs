//! Standardized error codes for machine-parseable output.
//!
//! Error codes follow a numeric taxonomy:
//! - 1xx: Directory errors (employees, roles, skills)
//! - 2xx: Workflow errors
//! - 3xx: Config errors
//! - 6xx: Storage errors
//! - 8xx: Validation errors
//! - 9xx: Internal errors

use serde::{Deserialize, Serialize};

/// Standardized error codes for robot mode output.
///
/// Each variant maps to a numeric code (e.g., `EmployeeNotFound` -> E101).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================
    // Directory errors (1xx)
    // ========================================
    /// E101: No employee with the given id
    EmployeeNotFound,
    /// E102: No role with the given id
    RoleNotFound,
    /// E103: No skill with the given id
    SkillNotFound,
    /// E104: Employee has no active role assignment
    NoActiveRole,

    // ========================================
    // Workflow errors (2xx)
    // ========================================
    /// E201: Not every question was answered exactly once
    IncompleteSubmission,
    /// E202: Test is in cooldown or already passed
    AttemptNotAllowed,
    /// E203: A workflow gate is closed
    WorkflowLocked,
    /// E204: A learning path write was only partly applied
    InconsistentLearningState,

    // ========================================
    // Config errors (3xx)
    // ========================================
    /// E301: Config file has invalid syntax or values
    ConfigInvalid,
    /// E302: Required config value is missing
    ConfigMissingRequired,

    // ========================================
    // Storage errors (6xx)
    // ========================================
    /// E601: Database operation failed
    DatabaseError,
    /// E602: Serialization/deserialization failed
    SerializationError,
    /// E603: A store rejected a write batch
    PersistFailed,
    /// E604: Transaction operation failed
    TransactionFailed,

    // ========================================
    // Validation errors (8xx)
    // ========================================
    /// E801: Malformed input value
    InvalidInput,
    /// E802: A business rule rejected the request
    ValidationFailed,

    // ========================================
    // Internal errors (9xx)
    // ========================================
    /// E901: Generic not found (catch-all)
    NotFound,
    /// E902: IO operation failed
    IoError,
}

impl ErrorCode {
    #[must_use]
    pub const fn numeric(&self) -> u16 {
        match self {
            Self::EmployeeNotFound => 101,
            Self::RoleNotFound => 102,
            Self::SkillNotFound => 103,
            Self::NoActiveRole => 104,

            Self::IncompleteSubmission => 201,
            Self::AttemptNotAllowed => 202,
            Self::WorkflowLocked => 203,
            Self::InconsistentLearningState => 204,

            Self::ConfigInvalid => 301,
            Self::ConfigMissingRequired => 302,

            Self::DatabaseError => 601,
            Self::SerializationError => 602,
            Self::PersistFailed => 603,
            Self::TransactionFailed => 604,

            Self::InvalidInput => 801,
            Self::ValidationFailed => 802,

            Self::NotFound => 901,
            Self::IoError => 902,
        }
    }

    /// Get the error code as a formatted string (e.g., "E101").
    #[must_use]
    pub fn code_string(&self) -> String {
        format!("E{}", self.numeric())
    }

    /// Get the default suggestion for this error code.
    #[must_use]
    pub const fn suggestion(&self) -> &'static str {
        match self {
            Self::EmployeeNotFound => "Run `competency employee list` to see known employees",
            Self::RoleNotFound => "Run `competency role list` to see available roles",
            Self::SkillNotFound => "Run `competency skill list` to see available skills",
            Self::NoActiveRole => "Assign a role with `competency employee assign <employee> <role>`",

            Self::IncompleteSubmission => "Answer every question exactly once, then submit again",
            Self::AttemptNotAllowed => "Run `competency test list <employee>` to see when the test unlocks",
            Self::WorkflowLocked => "Finish the step that holds the lock, then retry",
            Self::InconsistentLearningState => "The learning path was only partly written. Inspect it with `competency learn show <employee>` before regenerating",

            Self::ConfigInvalid => "Check TOML syntax and values in the config file",
            Self::ConfigMissingRequired => "Set the required value in config.toml or the matching COMPETENCY_* variable",

            Self::DatabaseError => "Check the database path and permissions. Run `competency init` to create the schema",
            Self::SerializationError => "The data format may be corrupted. Check input data for validity",
            Self::PersistFailed => "The write was not applied. Check the store and retry",
            Self::TransactionFailed => "The operation was rolled back. Check error details and retry",

            Self::InvalidInput => "Check the argument values and try again",
            Self::ValidationFailed => "Review the reported rule and adjust the request",

            Self::NotFound => "The requested resource was not found. Check the identifier",
            Self::IoError => "File operation failed. Check path exists and permissions are correct",
        }
    }

    /// Check if this error is potentially recoverable by the user.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::EmployeeNotFound
            | Self::RoleNotFound
            | Self::SkillNotFound
            | Self::NoActiveRole
            | Self::IncompleteSubmission
            | Self::AttemptNotAllowed
            | Self::WorkflowLocked
            | Self::ConfigInvalid
            | Self::ConfigMissingRequired
            | Self::PersistFailed
            | Self::TransactionFailed
            | Self::InvalidInput
            | Self::ValidationFailed
            | Self::NotFound
            | Self::IoError => true,

            Self::InconsistentLearningState | Self::DatabaseError | Self::SerializationError => {
                false
            }
        }
    }

    /// Get the error category name.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self.numeric() / 100 {
            1 => "directory",
            2 => "workflow",
            3 => "config",
            6 => "storage",
            8 => "validation",
            9 => "internal",
            _ => "unknown",
        }
    }

    /// Iterate over all error codes.
    pub fn all() -> impl Iterator<Item = Self> {
        [
            Self::EmployeeNotFound,
            Self::RoleNotFound,
            Self::SkillNotFound,
            Self::NoActiveRole,
            Self::IncompleteSubmission,
            Self::AttemptNotAllowed,
            Self::WorkflowLocked,
            Self::InconsistentLearningState,
            Self::ConfigInvalid,
            Self::ConfigMissingRequired,
            Self::DatabaseError,
            Self::SerializationError,
            Self::PersistFailed,
            Self::TransactionFailed,
            Self::InvalidInput,
            Self::ValidationFailed,
            Self::NotFound,
            Self::IoError,
        ]
        .into_iter()
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code_string())
    }
}
