//! Learning path generation and status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::eligibility::SkillGap;
use super::model::{LearningItem, LearningStatus};
use crate::error::{CmError, Result};

pub const DEFAULT_RESOURCE_BASE_URL: &str = "https://example.com/learn/";

/// Writes needed to install a new learning path.
///
/// `retire` must be applied before `insert`, in the same transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningPathPlan {
    /// Employee whose active items must be retired first.
    pub retire: Option<String>,
    pub insert: Vec<LearningItem>,
}

impl LearningPathPlan {
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            retire: None,
            insert: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.retire.is_none() && self.insert.is_empty()
    }

    /// Check that the store applied the whole plan.
    ///
    /// `expected_retired` is the number of active items in the snapshot the
    /// plan was built from. Any other outcome leaves the employee with no
    /// live path or with two generations of it.
    pub fn verify_applied(&self, expected_retired: usize, retired: usize, inserted: usize) -> Result<()> {
        let expected_retired = if self.retire.is_some() { expected_retired } else { 0 };
        let expected_inserted = self.insert.len();
        if retired != expected_retired || inserted != expected_inserted {
            return Err(CmError::InconsistentLearningState {
                expected_retired,
                retired,
                expected_inserted,
                inserted,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct LearningPathGenerator {
    resource_base_url: String,
}

impl Default for LearningPathGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_RESOURCE_BASE_URL)
    }
}

impl LearningPathGenerator {
    pub fn new(resource_base_url: impl Into<String>) -> Self {
        Self {
            resource_base_url: resource_base_url.into(),
        }
    }

    /// One active item per failed skill, replacing whatever path is live.
    #[must_use]
    pub fn generate(
        &self,
        employee_id: &str,
        role_id: &str,
        failed_skills: &[SkillGap],
        now: DateTime<Utc>,
    ) -> LearningPathPlan {
        if failed_skills.is_empty() {
            return LearningPathPlan::empty();
        }

        let insert = failed_skills
            .iter()
            .map(|gap| LearningItem {
                id: Uuid::new_v4().to_string(),
                employee_id: employee_id.to_string(),
                role_id: role_id.to_string(),
                skill_id: gap.skill_id.clone(),
                title: format!("Mastering {}", gap.skill_name),
                resource_url: format!("{}{}", self.resource_base_url, resource_slug(&gap.skill_name)),
                completed: false,
                status: LearningStatus::Active,
                created_at: now,
                completed_at: None,
            })
            .collect();

        LearningPathPlan {
            retire: Some(employee_id.to_string()),
            insert,
        }
    }
}

/// `"Distributed Systems"` becomes `"distributed-systems"`.
#[must_use]
pub fn resource_slug(skill_name: &str) -> String {
    skill_name.to_lowercase().replace(' ', "-")
}

/// Where an employee stands with respect to learning paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathStatus {
    None,
    Active,
    Completed,
}

/// Any active item means the path is live; otherwise the most recent item
/// decides whether a path was finished.
#[must_use]
pub fn path_status(active: &[LearningItem], latest: Option<&LearningItem>) -> PathStatus {
    if !active.is_empty() {
        return PathStatus::Active;
    }
    match latest {
        Some(item) if item.status == LearningStatus::Completed => PathStatus::Completed,
        Some(item) if item.status == LearningStatus::Active => PathStatus::Active,
        _ => PathStatus::None,
    }
}
