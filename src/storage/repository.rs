//! Repository port between the workflow service and a store.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::learning::LearningPathPlan;
use crate::core::model::{
    LearningItem, ProficiencyRecord, PromotionRequest, Question, Role, SkillRequirement,
    TestAttempt,
};
use crate::core::promotion::{PromotionReview, ReviewPlan, RoleAssignment};
use crate::error::Result;

/// Reads snapshots and applies write batches.
///
/// Implementations must apply a [`WriteBatch`] atomically: either every
/// field lands or none does.
pub trait CompetencyRepository {
    fn fetch_active_role(&self, employee_id: &str) -> Result<Option<Role>>;

    /// All roles, ordered by title then id.
    fn fetch_roles(&self) -> Result<Vec<Role>>;

    fn fetch_role_requirements(&self, role_id: &str) -> Result<Vec<SkillRequirement>>;

    /// Latest record per skill for the employee and role.
    fn fetch_latest_proficiencies(&self, employee_id: &str, role_id: &str) -> Result<Vec<ProficiencyRecord>>;

    /// Attempts for one triple, newest first.
    fn fetch_test_attempts(&self, employee_id: &str, skill_id: &str, role_id: &str) -> Result<Vec<TestAttempt>>;

    fn fetch_active_learning_items(&self, employee_id: &str) -> Result<Vec<LearningItem>>;

    /// Most recently created item regardless of status.
    fn fetch_latest_learning_item(&self, employee_id: &str) -> Result<Option<LearningItem>>;

    fn fetch_questions(&self, skill_id: &str) -> Result<Vec<Question>>;

    /// Requests filed by the employee, newest first.
    fn fetch_promotion_requests(&self, employee_id: &str) -> Result<Vec<PromotionRequest>>;

    fn fetch_promotion_request(&self, request_id: &str) -> Result<Option<PromotionRequest>>;

    fn persist(&self, batch: &WriteBatch) -> Result<PersistReport>;
}

impl<R: CompetencyRepository + ?Sized> CompetencyRepository for &R {
    fn fetch_active_role(&self, employee_id: &str) -> Result<Option<Role>> {
        (**self).fetch_active_role(employee_id)
    }

    fn fetch_roles(&self) -> Result<Vec<Role>> {
        (**self).fetch_roles()
    }

    fn fetch_role_requirements(&self, role_id: &str) -> Result<Vec<SkillRequirement>> {
        (**self).fetch_role_requirements(role_id)
    }

    fn fetch_latest_proficiencies(&self, employee_id: &str, role_id: &str) -> Result<Vec<ProficiencyRecord>> {
        (**self).fetch_latest_proficiencies(employee_id, role_id)
    }

    fn fetch_test_attempts(&self, employee_id: &str, skill_id: &str, role_id: &str) -> Result<Vec<TestAttempt>> {
        (**self).fetch_test_attempts(employee_id, skill_id, role_id)
    }

    fn fetch_active_learning_items(&self, employee_id: &str) -> Result<Vec<LearningItem>> {
        (**self).fetch_active_learning_items(employee_id)
    }

    fn fetch_latest_learning_item(&self, employee_id: &str) -> Result<Option<LearningItem>> {
        (**self).fetch_latest_learning_item(employee_id)
    }

    fn fetch_questions(&self, skill_id: &str) -> Result<Vec<Question>> {
        (**self).fetch_questions(skill_id)
    }

    fn fetch_promotion_requests(&self, employee_id: &str) -> Result<Vec<PromotionRequest>> {
        (**self).fetch_promotion_requests(employee_id)
    }

    fn fetch_promotion_request(&self, request_id: &str) -> Result<Option<PromotionRequest>> {
        (**self).fetch_promotion_request(request_id)
    }

    fn persist(&self, batch: &WriteBatch) -> Result<PersistReport> {
        (**self).persist(batch)
    }
}

/// Toggle the checkbox of one active learning item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemCompletion {
    pub employee_id: String,
    pub item_id: String,
    pub completed: bool,
}

/// Close every active item of an employee's path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathCompletion {
    pub employee_id: String,
    pub completed_at: DateTime<Utc>,
}

/// One atomic unit of writes.
///
/// Stores apply fields in declaration order: proficiencies, retire, insert
/// items, item toggle, path completion, attempt, promotion request, review,
/// role assignment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    pub insert_proficiencies: Vec<ProficiencyRecord>,
    /// Employee whose active learning items become `Completed`.
    pub retire_active_items: Option<String>,
    pub insert_items: Vec<LearningItem>,
    pub set_item_completed: Option<ItemCompletion>,
    pub complete_active_path: Option<PathCompletion>,
    pub insert_attempt: Option<TestAttempt>,
    pub insert_promotion_request: Option<PromotionRequest>,
    pub review_promotion: Option<PromotionReview>,
    pub assign_role: Option<RoleAssignment>,
}

impl WriteBatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Fold a learning path plan into the batch.
    #[must_use]
    pub fn with_learning_plan(mut self, plan: &LearningPathPlan) -> Self {
        self.retire_active_items.clone_from(&plan.retire);
        self.insert_items.clone_from(&plan.insert);
        self
    }

    #[must_use]
    pub fn with_review(mut self, plan: &ReviewPlan) -> Self {
        self.review_promotion = Some(plan.review.clone());
        self.assign_role.clone_from(&plan.assignment);
        self
    }
}

/// Row counts actually written by [`CompetencyRepository::persist`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PersistReport {
    pub proficiencies_inserted: usize,
    pub items_retired: usize,
    pub items_inserted: usize,
    pub items_updated: usize,
    pub items_completed: usize,
    pub attempts_inserted: usize,
    pub requests_inserted: usize,
    pub requests_reviewed: usize,
    pub roles_assigned: usize,
}
