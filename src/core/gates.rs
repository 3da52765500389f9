//! Workflow gates that decide which flows are open to an employee.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::eligibility::AssessmentStatus;
use super::learning::PathStatus;
use crate::error::CmError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockReason {
    /// The self-assessment for the target role already passed.
    AssessmentPassed,
    /// A learning path is live and must be finished first.
    LearningActive,
    /// Tests stay closed until the self-assessment passes.
    AssessmentNeeded,
}

impl fmt::Display for LockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::AssessmentPassed => "assessment already passed",
            Self::LearningActive => "learning path is active",
            Self::AssessmentNeeded => "self-assessment for the target role not passed",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "gate", content = "reason", rename_all = "snake_case")]
pub enum Gate {
    Open,
    Locked(LockReason),
}

impl Gate {
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }

    /// `Ok` when open, otherwise the matching `Locked` error.
    pub fn ensure_open(&self) -> Result<(), CmError> {
        match self {
            Self::Open => Ok(()),
            Self::Locked(reason) => Err(CmError::Locked(reason.to_string())),
        }
    }
}

/// A passed assessment stays locked; a failed one stays locked while its
/// learning path is live.
#[must_use]
pub fn assessment_gate(status: AssessmentStatus, path: PathStatus) -> Gate {
    match (status, path) {
        (AssessmentStatus::Passed, _) => Gate::Locked(LockReason::AssessmentPassed),
        (AssessmentStatus::Failed, PathStatus::Active) => Gate::Locked(LockReason::LearningActive),
        _ => Gate::Open,
    }
}

/// Tests open only after the gating role's self-assessment passed and with
/// no learning path in progress.
#[must_use]
pub fn test_gate(gating_assessment: AssessmentStatus, path: PathStatus) -> Gate {
    if path == PathStatus::Active {
        Gate::Locked(LockReason::LearningActive)
    } else if gating_assessment != AssessmentStatus::Passed {
        Gate::Locked(LockReason::AssessmentNeeded)
    } else {
        Gate::Open
    }
}
