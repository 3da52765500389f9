//! Promotion gatekeeper: eligibility aggregation, request and review plans.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::eligibility::{TestEvaluation, evaluate_tests};
use super::model::{PromotionRequest, PromotionStatus, Role, SkillRequirement, TestAttempt};
use super::progression::GatingTarget;
use crate::error::{CmError, Result};

/// Test-mode eligibility for the role an employee is gated on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromotionEligibility {
    pub target: GatingTarget,
    pub evaluation: TestEvaluation,
}

impl PromotionEligibility {
    /// `requirements` must be those of `target.role()`.
    #[must_use]
    pub fn assess(target: GatingTarget, requirements: &[SkillRequirement], attempts: &[TestAttempt]) -> Self {
        let evaluation = evaluate_tests(requirements, attempts);
        Self { target, evaluation }
    }

    #[must_use]
    pub const fn eligible(&self) -> bool {
        self.evaluation.eligible
    }
}

/// Most recent request by `requested_at`.
#[must_use]
pub fn latest_request(requests: &[PromotionRequest]) -> Option<&PromotionRequest> {
    requests.iter().max_by_key(|r| r.requested_at)
}

/// Build a new pending request, or explain why one cannot be filed.
pub fn plan_request(
    employee_id: &str,
    current: &Role,
    requested: &Role,
    history: &[PromotionRequest],
    eligibility: &PromotionEligibility,
    now: DateTime<Utc>,
) -> Result<PromotionRequest> {
    if requested.id == current.id {
        return Err(CmError::InvalidInput(format!(
            "'{}' is already the current role",
            requested.title
        )));
    }

    if let Some(pending) = history.iter().find(|r| r.status == PromotionStatus::Pending) {
        return Err(CmError::ValidationFailed(format!(
            "promotion request {} is still pending",
            pending.id
        )));
    }

    if !eligibility.eligible() {
        let eval = &eligibility.evaluation;
        return Err(CmError::ValidationFailed(format!(
            "not eligible: {} of {} testable skills passed for '{}'",
            eval.passed_count,
            eval.total_count,
            eligibility.target.role().title
        )));
    }

    Ok(PromotionRequest {
        id: Uuid::new_v4().to_string(),
        employee_id: employee_id.to_string(),
        current_role_id: current.id.clone(),
        requested_role_id: requested.id.clone(),
        status: PromotionStatus::Pending,
        requested_at: now,
        reviewed_at: None,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Approve,
    Reject,
}

impl ReviewDecision {
    #[must_use]
    pub const fn status(&self) -> PromotionStatus {
        match self {
            Self::Approve => PromotionStatus::Approved,
            Self::Reject => PromotionStatus::Rejected,
        }
    }
}

impl fmt::Display for ReviewDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
        })
    }
}

impl FromStr for ReviewDecision {
    type Err = CmError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "approve" | "approved" => Ok(Self::Approve),
            "reject" | "rejected" => Ok(Self::Reject),
            other => Err(CmError::InvalidInput(format!(
                "invalid review decision '{other}' (expected approve|reject)"
            ))),
        }
    }
}

/// Status change written for a reviewed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionReview {
    pub request_id: String,
    pub status: PromotionStatus,
    pub reviewed_at: DateTime<Utc>,
}

/// Replace an employee's active role with `role_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub employee_id: String,
    pub role_id: String,
    pub assigned_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewPlan {
    pub review: PromotionReview,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignment: Option<RoleAssignment>,
}

/// Only pending requests can be reviewed. Approval also moves the employee
/// to the requested role.
pub fn plan_review(request: &PromotionRequest, decision: ReviewDecision, now: DateTime<Utc>) -> Result<ReviewPlan> {
    if request.status != PromotionStatus::Pending {
        return Err(CmError::ValidationFailed(format!(
            "promotion request {} is already {}",
            request.id,
            request.status.as_str()
        )));
    }

    let assignment = (decision == ReviewDecision::Approve).then(|| RoleAssignment {
        employee_id: request.employee_id.clone(),
        role_id: request.requested_role_id.clone(),
        assigned_at: now,
    });

    Ok(ReviewPlan {
        review: PromotionReview {
            request_id: request.id.clone(),
            status: decision.status(),
            reviewed_at: now,
        },
        assignment,
    })
}
